//! Low-level array constructors.

use crate::core::error::{ArrayError, Result};
use crate::core::types::{ByteOrder, ElemType};
use crate::handle::array::ArrayHandle;
use crate::handle::layout::Layout;
use crate::handle::storage::DataBuffer;

/// Build a handle over fresh storage or a caller-supplied linear buffer.
///
/// With `buffer = None`, allocates fresh zero-initialized contiguous storage.
/// With a buffer, the handle views the shared bytes starting at
/// `byte_offset`; the buffer must hold at least shape-product x element-size
/// bytes past the offset. A `byte_order` differing from the host marks the
/// handle byteswapped, and element access swaps transparently.
///
/// `ElemType::Any` resolves to `Float64`.
pub fn new_from_buffer(
    shape: &[usize],
    dtype: ElemType,
    buffer: Option<DataBuffer>,
    byte_offset: usize,
    byte_order: ByteOrder,
    aligned: bool,
    writable: bool,
) -> Result<ArrayHandle> {
    let dtype = dtype.resolve();
    let elem_size = dtype.size_bytes();
    let layout = Layout::contiguous(shape, elem_size)?;
    let count = layout.element_count();
    let nbytes = count * elem_size;
    let byteswapped = byte_order != ByteOrder::host();

    let (data, offset) = match buffer {
        None => (DataBuffer::zeroed(nbytes), 0),
        Some(data) => {
            let required = byte_offset
                .checked_add(nbytes)
                .ok_or_else(|| ArrayError::buffer_too_small(usize::MAX, data.len()))?;
            if required > data.len() {
                return Err(ArrayError::buffer_too_small(required, data.len()));
            }
            (data, byte_offset)
        }
    };

    let aligned = aligned && offset % elem_size == 0;
    Ok(ArrayHandle::from_parts(
        dtype, layout, data, offset, byteswapped, aligned, writable, None, false,
    ))
}

/// Build a handle over fresh storage, initialized from `init` or zero-filled.
///
/// `init`, when present, is copied byte-for-byte and must be exactly
/// shape-product x element-size bytes long.
pub fn new_all(
    shape: &[usize],
    dtype: ElemType,
    init: Option<&[u8]>,
    byte_order: ByteOrder,
    aligned: bool,
    writable: bool,
) -> Result<ArrayHandle> {
    let handle = new_from_buffer(shape, dtype, None, 0, byte_order, aligned, writable)?;
    if let Some(init) = init {
        handle.copy_bytes_from(init)?;
    }
    Ok(handle)
}

/// Build a canonical handle: host byte order, aligned, writable, fresh
/// allocation. Contents come from `init` byte-for-byte, or are zero-filled.
pub fn new_array(init: Option<&[u8]>, dtype: ElemType, shape: &[usize]) -> Result<ArrayHandle> {
    new_all(shape, dtype, init, ByteOrder::host(), true, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_allocation_is_zeroed() {
        let handle = new_array(None, ElemType::Int32, &[2, 2]).unwrap();
        assert!(handle.is_carray());
        assert_eq!(handle.to_vec::<i32>().unwrap(), vec![0; 4]);
    }

    #[test]
    fn test_any_resolves_to_float64() {
        let handle = new_array(None, ElemType::Any, &[3]).unwrap();
        assert_eq!(handle.dtype(), ElemType::Float64);
    }

    #[test]
    fn test_buffer_too_small() {
        let buffer = DataBuffer::zeroed(8);
        let err = new_from_buffer(
            &[4],
            ElemType::Float64,
            Some(buffer),
            0,
            ByteOrder::host(),
            true,
            true,
        );
        assert!(matches!(err, Err(ArrayError::BufferTooSmall { .. })));
    }

    #[test]
    fn test_offset_view_shares_buffer() {
        let buffer = DataBuffer::from_vec((0u8..12).collect());
        let handle = new_from_buffer(
            &[4],
            ElemType::UInt8,
            Some(buffer.clone()),
            8,
            ByteOrder::host(),
            true,
            true,
        )
        .unwrap();
        assert_eq!(handle.to_vec::<u8>().unwrap(), vec![8, 9, 10, 11]);
        buffer.write(8, &[99]).unwrap();
        assert_eq!(handle.to_vec::<u8>().unwrap(), vec![99, 9, 10, 11]);
    }

    #[test]
    fn test_misaligned_offset_clears_flag() {
        let buffer = DataBuffer::zeroed(64);
        let handle = new_from_buffer(
            &[2],
            ElemType::Float64,
            Some(buffer),
            4,
            ByteOrder::host(),
            true,
            true,
        )
        .unwrap();
        assert!(!handle.is_aligned());
    }

    #[test]
    fn test_init_length_must_match() {
        let err = new_all(
            &[2],
            ElemType::Int16,
            Some(&[0u8; 3]),
            ByteOrder::host(),
            true,
            true,
        );
        assert!(matches!(err, Err(ArrayError::ShapeMismatch { .. })));
    }
}
