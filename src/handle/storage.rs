//! Shared byte storage backing array handles.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::error::{ArrayError, Result};

/// Reference-counted byte buffer shared between array handles.
///
/// Cloning a `DataBuffer` shares the underlying bytes; two handles backed by
/// clones of the same buffer alias the same storage. The adapter never takes
/// exclusive ownership of a caller-supplied buffer.
#[derive(Debug, Clone)]
pub struct DataBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl DataBuffer {
    /// Wrap an existing byte vector.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Rc::new(RefCell::new(bytes)),
        }
    }

    /// Allocate `len` zero-initialized bytes.
    pub fn zeroed(len: usize) -> Self {
        Self::from_vec(vec![0u8; len])
    }

    /// Total length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.borrow().len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.borrow().is_empty()
    }

    /// Whether two buffers share the same storage.
    #[inline]
    pub fn shares_storage(&self, other: &DataBuffer) -> bool {
        Rc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// Read `out.len()` bytes starting at `offset`.
    pub fn read_into(&self, offset: usize, out: &mut [u8]) -> Result<()> {
        let bytes = self.bytes.borrow();
        let end = offset
            .checked_add(out.len())
            .ok_or_else(|| ArrayError::index_out_of_bounds(offset, bytes.len()))?;
        if end > bytes.len() {
            return Err(ArrayError::index_out_of_bounds(end, bytes.len()));
        }
        out.copy_from_slice(&bytes[offset..end]);
        Ok(())
    }

    /// Write `data` starting at `offset`.
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<()> {
        let mut bytes = self.bytes.borrow_mut();
        let end = offset
            .checked_add(data.len())
            .ok_or_else(|| ArrayError::index_out_of_bounds(offset, bytes.len()))?;
        if end > bytes.len() {
            return Err(ArrayError::index_out_of_bounds(end, bytes.len()));
        }
        bytes[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Copy the whole buffer out as a vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_contents() {
        let buf = DataBuffer::zeroed(16);
        assert_eq!(buf.len(), 16);
        assert!(buf.to_vec().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_write_roundtrip() {
        let buf = DataBuffer::zeroed(8);
        buf.write(2, &[1, 2, 3]).unwrap();
        let mut out = [0u8; 3];
        buf.read_into(2, &mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn test_out_of_range_access() {
        let buf = DataBuffer::zeroed(4);
        let mut out = [0u8; 4];
        assert!(buf.read_into(1, &mut out).is_err());
        assert!(buf.write(3, &[0, 0]).is_err());
    }

    #[test]
    fn test_shared_storage() {
        let a = DataBuffer::from_vec(vec![0u8; 4]);
        let b = a.clone();
        let c = DataBuffer::zeroed(4);
        assert!(a.shares_storage(&b));
        assert!(!a.shares_storage(&c));
        b.write(0, &[9]).unwrap();
        let mut out = [0u8; 1];
        a.read_into(0, &mut out).unwrap();
        assert_eq!(out[0], 9);
    }
}
