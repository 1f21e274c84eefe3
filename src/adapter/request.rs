//! Input, output, and in-out array requests.
//!
//! The marshaling surface of the crate: each request validates that a caller
//! handle meets a type and requirement mask, returning the handle itself when
//! it already complies and a normalized substitute otherwise. Substitutes for
//! output and in-out requests are copy-back temporaries: releasing them
//! synchronizes their contents into the original.

use crate::core::error::{ArrayError, Result};
use crate::core::requirements::Requirements;
use crate::core::types::{ByteOrder, ElemType};
use crate::handle::array::ArrayHandle;
use crate::handle::layout::Layout;
use crate::handle::storage::DataBuffer;

/// Whether `handle` meets `requirements` at the requested element type.
///
/// `ENSURE_COPY` always fails satisfaction, forcing a fresh allocation. A
/// handle already in canonical packed form satisfies any other mask once the
/// type matches.
pub fn satisfies(handle: &ArrayHandle, requirements: Requirements, dtype: ElemType) -> bool {
    let type_ok = dtype.is_any() || handle.dtype() == dtype;
    if requirements.contains(Requirements::ENSURE_COPY) {
        return false;
    }
    if handle.is_carray() {
        return type_ok;
    }
    if requirements.contains(Requirements::NOT_SWAPPED) && handle.is_byteswapped() {
        return false;
    }
    if requirements.contains(Requirements::ALIGNED) && !handle.is_aligned() {
        return false;
    }
    if requirements.contains(Requirements::CONTIGUOUS) && !handle.is_contiguous() {
        return false;
    }
    if requirements.contains(Requirements::WRITABLE) && !handle.is_writable() {
        return false;
    }
    type_ok
}

/// Allocate a fresh canonical handle shaped like `source`, optionally as a
/// copy-back temporary over it.
fn fresh_like(source: &ArrayHandle, dtype: ElemType, copy_back: bool) -> Result<ArrayHandle> {
    let elem_size = dtype.size_bytes();
    let layout = Layout::contiguous(source.shape(), elem_size)?;
    let data = DataBuffer::zeroed(layout.element_count() * elem_size);
    let base = copy_back.then(|| source.clone());
    Ok(ArrayHandle::from_parts(
        dtype, layout, data, 0, false, true, true, base, copy_back,
    ))
}

/// Request a read-only input view of `source`.
///
/// Returns `source` itself (shared identity) when it satisfies the mask.
/// Otherwise allocates a contiguous, aligned, host-order copy of the
/// requested type; with `UPDATE_IF_COPY` the copy is a copy-back temporary
/// and the source is marked non-writable while it is live.
pub fn input_array(
    source: &ArrayHandle,
    dtype: ElemType,
    requirements: Requirements,
) -> Result<ArrayHandle> {
    if satisfies(source, requirements, dtype) {
        return Ok(source.clone());
    }

    let target = dtype.resolve_with(source.dtype());
    if !source.dtype().castable_to(target) {
        return Err(ArrayError::type_conversion(format!(
            "cannot convert {:?} array to {:?}",
            source.dtype(),
            target
        )));
    }

    let copy_back = requirements.contains(Requirements::UPDATE_IF_COPY);
    if copy_back {
        if !source.is_writable() {
            return Err(ArrayError::type_conversion(
                "copy-back requires a writable source array",
            ));
        }
        if !target.castable_to(source.dtype()) {
            return Err(ArrayError::type_conversion(format!(
                "cannot copy {:?} values back into {:?} array",
                target,
                source.dtype()
            )));
        }
    }

    let copy = fresh_like(source, target, copy_back)?;
    if let Err(err) = source.copy_into(&copy) {
        // Never let a half-filled temporary synchronize back.
        copy.discard();
        return Err(err);
    }
    if copy_back {
        source.set_writable(false);
    }
    Ok(copy)
}

/// Request a writable output handle over `source`.
///
/// The source must already be a writable array. Returns `source` itself when
/// it satisfies the mask. Otherwise allocates a fresh zeroed handle of the
/// same shape at the requested type, registered as a copy-back temporary;
/// the source is marked non-writable until the temporary is released.
pub fn output_array(
    source: &ArrayHandle,
    dtype: ElemType,
    requirements: Requirements,
) -> Result<ArrayHandle> {
    if !source.is_writable() {
        return Err(ArrayError::type_conversion(
            "only writable arrays work for output",
        ));
    }
    if satisfies(source, requirements, dtype) {
        return Ok(source.clone());
    }

    let target = dtype.resolve_with(source.dtype());
    if !target.castable_to(source.dtype()) {
        return Err(ArrayError::type_conversion(format!(
            "cannot copy {:?} values back into {:?} array",
            target,
            source.dtype()
        )));
    }

    let temp = fresh_like(source, target, true)?;
    source.set_writable(false);
    Ok(temp)
}

/// Request an in-out handle over `source`.
///
/// Composes [`input_array`] with the copy-back requirement forced on: a
/// temporary, when needed, is initialized to a copy of the source and
/// synchronizes back on release. Fails if the resulting handle is not
/// writable, discarding any pending copy-back first.
pub fn io_array(
    source: &ArrayHandle,
    dtype: ElemType,
    requirements: Requirements,
) -> Result<ArrayHandle> {
    let shadow = input_array(source, dtype, requirements | Requirements::UPDATE_IF_COPY)?;

    // A non-writable source that satisfies the mask comes back as itself;
    // it cannot serve as an in-out array.
    if !shadow.is_writable() {
        shadow.discard();
        return Err(ArrayError::type_conversion("I/O array must be writable"));
    }

    Ok(shadow)
}

/// Total number of elements in `handle`: product of all dimensions, 1 for a
/// zero-rank scalar.
#[inline]
pub fn element_count(handle: &ArrayHandle) -> usize {
    handle.element_count()
}

/// The host's native byte order.
#[inline]
pub fn host_byte_order() -> ByteOrder {
    ByteOrder::host()
}
