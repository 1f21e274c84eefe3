//! Shared-ownership array handles with copy-back release semantics.

use std::cell::Cell;
use std::rc::Rc;

use crate::core::error::{ArrayError, Result};
use crate::core::types::{ByteOrder, ElemType};
use crate::handle::layout::Layout;
use crate::handle::scalar::{self, Element, ScalarValue};
use crate::handle::storage::DataBuffer;

/// A reference to an N-dimensional typed array plus its layout metadata.
///
/// Cloning a handle shares identity: both clones see the same storage and the
/// same flags. Writability is interior-mutable so that marking a source array
/// read-only during an output request is observable through every holder of
/// the handle.
///
/// A handle created as a copy-back temporary records its originating handle
/// as `base`. When the temporary's last reference is released, its contents
/// are copied back into the base exactly once and the base becomes writable
/// again. Convertibility from the temporary's type to the base's type is
/// checked at creation, so the release path cannot fail.
#[derive(Debug, Clone)]
pub struct ArrayHandle {
    inner: Rc<ArrayInner>,
}

#[derive(Debug)]
struct ArrayInner {
    dtype: ElemType,
    layout: Layout,
    data: DataBuffer,
    /// Byte offset of the first element within `data`.
    offset: usize,
    /// Stored byte order differs from the host.
    byteswapped: bool,
    aligned: bool,
    writable: Cell<bool>,
    /// Provenance: the handle this one was derived from (views, copy-back
    /// temporaries). Not ownership; storage lifetime is `data`'s concern.
    base: Option<ArrayHandle>,
    /// Pending copy-back into `base` on release.
    copy_back: Cell<bool>,
}

impl ArrayInner {
    fn elem_size(&self) -> usize {
        self.dtype.size_bytes()
    }

    fn byte_offset(&self, index: &[usize]) -> Result<usize> {
        let rel = self.layout.byte_offset(index)?;
        Ok((self.offset as isize + rel) as usize)
    }

    fn read_scalar(&self, index: &[usize]) -> Result<ScalarValue> {
        let offset = self.byte_offset(index)?;
        let mut bytes = [0u8; 16];
        let slot = &mut bytes[..self.elem_size()];
        self.data.read_into(offset, slot)?;
        Ok(scalar::decode(self.dtype, slot, self.byteswapped))
    }

    fn write_scalar(&self, index: &[usize], value: ScalarValue) -> Result<()> {
        if !self.writable.get() {
            return Err(ArrayError::type_conversion("array is not writable"));
        }
        let offset = self.byte_offset(index)?;
        let mut bytes = [0u8; 16];
        let slot = &mut bytes[..self.elem_size()];
        scalar::encode(self.dtype, value, self.byteswapped, slot)?;
        self.data.write(offset, slot)
    }

    fn read_linear(&self, linear: usize) -> Result<ScalarValue> {
        let index = self.layout.index_from_linear(linear)?;
        self.read_scalar(&index)
    }

    fn write_linear(&self, linear: usize, value: ScalarValue) -> Result<()> {
        let index = self.layout.index_from_linear(linear)?;
        self.write_scalar(&index, value)
    }
}

impl Drop for ArrayInner {
    fn drop(&mut self) {
        if !self.copy_back.replace(false) {
            return;
        }
        let Some(base) = self.base.as_ref() else {
            return;
        };
        base.inner.writable.set(true);
        // Shape and convertibility were validated when the temporary was
        // created, so element copies cannot fail here.
        let count = self.layout.element_count();
        for linear in 0..count {
            let synced = self
                .read_linear(linear)
                .and_then(|value| base.inner.write_linear(linear, value));
            debug_assert!(synced.is_ok());
        }
    }
}

impl ArrayHandle {
    /// Internal constructor used by the adapter.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        dtype: ElemType,
        layout: Layout,
        data: DataBuffer,
        offset: usize,
        byteswapped: bool,
        aligned: bool,
        writable: bool,
        base: Option<ArrayHandle>,
        copy_back: bool,
    ) -> Self {
        debug_assert!(!dtype.is_any());
        Self {
            inner: Rc::new(ArrayInner {
                dtype,
                layout,
                data,
                offset,
                byteswapped,
                aligned,
                writable: Cell::new(writable),
                base,
                copy_back: Cell::new(copy_back),
            }),
        }
    }

    /// Build a fresh contiguous host-order handle from typed values.
    ///
    /// Fails if the shape's element count does not match `values.len()`.
    pub fn from_slice<T: Element>(values: &[T], shape: &[usize]) -> Result<Self> {
        let dtype = T::DTYPE;
        let elem_size = dtype.size_bytes();
        let layout = Layout::contiguous(shape, elem_size)?;
        let count = layout.element_count();
        if count != values.len() {
            return Err(ArrayError::shape_mismatch(count, values.len()));
        }
        let mut bytes = vec![0u8; count * elem_size];
        for (value, slot) in values.iter().zip(bytes.chunks_exact_mut(elem_size)) {
            scalar::encode(dtype, value.to_scalar(), false, slot)?;
        }
        Ok(Self::from_parts(
            dtype,
            layout,
            DataBuffer::from_vec(bytes),
            0,
            false,
            true,
            true,
            None,
            false,
        ))
    }

    /// Read every element in logical order, converted to `T`.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        let count = self.element_count();
        let mut out = Vec::with_capacity(count);
        for linear in 0..count {
            let value = self.inner.read_linear(linear)?.cast_to(T::DTYPE)?;
            let typed = T::from_scalar(value).ok_or_else(|| {
                ArrayError::type_conversion("element value does not fit the requested type")
            })?;
            out.push(typed);
        }
        Ok(out)
    }

    /// Element type tag.
    #[inline]
    pub fn dtype(&self) -> ElemType {
        self.inner.dtype
    }

    /// Dimension sizes.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.inner.layout.shape()
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.inner.layout.rank()
    }

    /// Total number of elements: product of all dimensions, 1 for rank 0.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.inner.layout.element_count()
    }

    /// Total bytes spanned by the elements.
    #[inline]
    pub fn nbytes(&self) -> usize {
        self.element_count() * self.inner.elem_size()
    }

    /// Stored byte order of multi-byte elements.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        if self.inner.byteswapped {
            ByteOrder::host().swapped()
        } else {
            ByteOrder::host()
        }
    }

    /// Whether elements are densely packed in C order.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.inner.layout.is_contiguous(self.inner.elem_size())
    }

    /// Whether data starts on an element-size boundary.
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.inner.aligned
    }

    /// Whether the handle may be written through.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.inner.writable.get()
    }

    /// Whether the stored byte order differs from the host.
    #[inline]
    pub fn is_byteswapped(&self) -> bool {
        self.inner.byteswapped
    }

    /// Whether this is the canonical packed form: contiguous, aligned,
    /// host-order, and writable.
    #[inline]
    pub fn is_carray(&self) -> bool {
        self.is_contiguous() && self.is_aligned() && !self.is_byteswapped() && self.is_writable()
    }

    /// Whether two handles are the same handle (shared identity), as opposed
    /// to equal contents.
    #[inline]
    pub fn same_handle(&self, other: &ArrayHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The handle this one was derived from, if any.
    #[inline]
    pub fn base(&self) -> Option<&ArrayHandle> {
        self.inner.base.as_ref()
    }

    /// Whether a copy-back into the base is still pending.
    #[inline]
    pub fn is_copy_back(&self) -> bool {
        self.inner.copy_back.get()
    }

    pub(crate) fn set_writable(&self, writable: bool) {
        self.inner.writable.set(writable);
    }

    /// Read the element at `index`.
    pub fn read_scalar(&self, index: &[usize]) -> Result<ScalarValue> {
        self.inner.read_scalar(index)
    }

    /// Write the element at `index`, casting `value` to the handle's type.
    pub fn write_scalar(&self, index: &[usize], value: ScalarValue) -> Result<()> {
        self.inner.write_scalar(index, value)
    }

    /// Read the `linear`-th element in logical C order.
    pub fn read_linear(&self, linear: usize) -> Result<ScalarValue> {
        self.inner.read_linear(linear)
    }

    /// Write the `linear`-th element in logical C order.
    pub fn write_linear(&self, linear: usize, value: ScalarValue) -> Result<()> {
        self.inner.write_linear(linear, value)
    }

    /// A strided view taking every `step`-th element along `axis`.
    ///
    /// Shares storage with `self` and records it as `base`. The view is not
    /// contiguous unless the step is 1.
    pub fn step_by(&self, axis: usize, step: usize) -> Result<ArrayHandle> {
        if step == 0 {
            return Err(ArrayError::invalid_parameter("step must be at least 1"));
        }
        if axis >= self.rank() {
            return Err(ArrayError::index_out_of_bounds(axis, self.rank()));
        }
        let mut shape = self.shape().to_vec();
        let mut strides = self.inner.layout.strides().to_vec();
        shape[axis] = shape[axis].div_ceil(step);
        strides[axis] *= step as isize;
        let layout = Layout::from_parts(shape, strides)?;
        Ok(Self::from_parts(
            self.dtype(),
            layout,
            self.inner.data.clone(),
            self.inner.offset,
            self.inner.byteswapped,
            self.inner.aligned,
            self.is_writable(),
            Some(self.clone()),
            false,
        ))
    }

    /// Copy every element of `self` into `dst` in logical order, casting to
    /// `dst`'s element type. Shapes must have equal element counts.
    pub(crate) fn copy_into(&self, dst: &ArrayHandle) -> Result<()> {
        let count = self.element_count();
        if count != dst.element_count() {
            return Err(ArrayError::shape_mismatch(count, dst.element_count()));
        }
        for linear in 0..count {
            let value = self.inner.read_linear(linear)?;
            dst.inner.write_linear(linear, value)?;
        }
        Ok(())
    }

    /// Overwrite the handle's storage byte-for-byte from `init`.
    ///
    /// Only valid on contiguous handles; `init` must be exactly `nbytes`
    /// long.
    pub(crate) fn copy_bytes_from(&self, init: &[u8]) -> Result<()> {
        let nbytes = self.nbytes();
        if init.len() != nbytes {
            return Err(ArrayError::shape_mismatch(nbytes, init.len()));
        }
        self.inner.data.write(self.inner.offset, init)
    }

    /// Suppress a pending copy-back and restore the base's writability.
    ///
    /// Error-path cleanup: after this, releasing the handle frees it without
    /// synchronizing into the base. No-op on plain handles.
    pub fn discard(&self) {
        if self.inner.copy_back.replace(false) {
            if let Some(base) = self.inner.base.as_ref() {
                base.inner.writable.set(true);
            }
        }
    }

    /// Release this reference to the handle.
    ///
    /// When the last reference to a copy-back temporary is released, its
    /// contents are synchronized into the base exactly once before the
    /// storage reference is dropped. Equivalent to `drop`, spelled out for
    /// call sites where the release is the point.
    pub fn release(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MAX_DIMS;

    #[test]
    fn test_from_slice_shape_mismatch() {
        let err = ArrayHandle::from_slice(&[1.0f64, 2.0], &[3]);
        assert!(matches!(err, Err(ArrayError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_from_slice_roundtrip() {
        let handle = ArrayHandle::from_slice(&[1i32, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        assert_eq!(handle.dtype(), ElemType::Int32);
        assert_eq!(handle.shape(), &[2, 3]);
        assert!(handle.is_carray());
        assert_eq!(handle.to_vec::<i32>().unwrap(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(handle.read_scalar(&[1, 2]).unwrap(), ScalarValue::Int(6));
    }

    #[test]
    fn test_rank_limit() {
        let shape = vec![1usize; MAX_DIMS + 1];
        let values = [1.0f64];
        assert!(matches!(
            ArrayHandle::from_slice(&values, &shape),
            Err(ArrayError::RankOverflow { .. })
        ));
    }

    #[test]
    fn test_write_requires_writable() {
        let handle = ArrayHandle::from_slice(&[0i64; 4], &[4]).unwrap();
        handle.set_writable(false);
        let err = handle.write_linear(0, ScalarValue::Int(1));
        assert!(matches!(err, Err(ArrayError::TypeConversion { .. })));
        handle.set_writable(true);
        handle.write_linear(0, ScalarValue::Int(1)).unwrap();
        assert_eq!(handle.to_vec::<i64>().unwrap(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_step_by_view() {
        let handle = ArrayHandle::from_slice(&[0i32, 1, 2, 3, 4, 5], &[6]).unwrap();
        let view = handle.step_by(0, 2).unwrap();
        assert_eq!(view.shape(), &[3]);
        assert!(!view.is_contiguous());
        assert!(view.base().unwrap().same_handle(&handle));
        assert_eq!(view.to_vec::<i32>().unwrap(), vec![0, 2, 4]);

        // Writes through the view land in the shared storage.
        view.write_scalar(&[1], ScalarValue::Int(9)).unwrap();
        assert_eq!(handle.to_vec::<i32>().unwrap(), vec![0, 1, 9, 3, 4, 5]);
    }

    #[test]
    fn test_step_by_invalid_parameters() {
        let handle = ArrayHandle::from_slice(&[0i32; 4], &[4]).unwrap();
        assert!(handle.step_by(0, 0).is_err());
        assert!(handle.step_by(1, 2).is_err());
    }

    #[test]
    fn test_clone_shares_identity_and_flags() {
        let handle = ArrayHandle::from_slice(&[1.0f64; 2], &[2]).unwrap();
        let other = handle.clone();
        assert!(handle.same_handle(&other));
        other.set_writable(false);
        assert!(!handle.is_writable());
    }

    #[test]
    fn test_write_casts_to_handle_dtype() {
        let handle = ArrayHandle::from_slice(&[0u8; 2], &[2]).unwrap();
        handle.write_linear(0, ScalarValue::Float(3.7)).unwrap();
        assert_eq!(handle.to_vec::<u8>().unwrap(), vec![3, 0]);
    }
}
