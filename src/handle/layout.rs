//! Shape and stride bookkeeping for array handles.

use crate::core::error::{ArrayError, Result};
use crate::core::types::MAX_DIMS;

/// Shape plus byte strides of an N-dimensional array.
///
/// A zero-rank layout describes a scalar: one element, no dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Vec<usize>,
    /// Byte distance between consecutive elements along each dimension.
    strides: Vec<isize>,
}

impl Layout {
    /// Build a C-order contiguous layout for `shape` with the given element
    /// size in bytes.
    pub fn contiguous(shape: &[usize], elem_size: usize) -> Result<Self> {
        if shape.len() > MAX_DIMS {
            return Err(ArrayError::rank_overflow(shape.len(), MAX_DIMS));
        }
        let mut strides = vec![0isize; shape.len()];
        let mut step = elem_size as isize;
        for (stride, &dim) in strides.iter_mut().zip(shape.iter()).rev() {
            *stride = step;
            step *= dim as isize;
        }
        Ok(Self {
            shape: shape.to_vec(),
            strides,
        })
    }

    /// Build a layout from explicit shape and byte strides.
    pub fn from_parts(shape: Vec<usize>, strides: Vec<isize>) -> Result<Self> {
        if shape.len() > MAX_DIMS {
            return Err(ArrayError::rank_overflow(shape.len(), MAX_DIMS));
        }
        if shape.len() != strides.len() {
            return Err(ArrayError::shape_mismatch(shape.len(), strides.len()));
        }
        Ok(Self { shape, strides })
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Dimension sizes.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Byte strides.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Total number of elements: product of all dimensions, 1 for rank 0.
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether elements are densely packed in C order for `elem_size`.
    ///
    /// Dimensions of size 0 or 1 place no constraint on their stride.
    pub fn is_contiguous(&self, elem_size: usize) -> bool {
        if self.element_count() == 0 {
            return true;
        }
        let mut expected = elem_size as isize;
        for (&stride, &dim) in self.strides.iter().zip(self.shape.iter()).rev() {
            if dim > 1 {
                if stride != expected {
                    return false;
                }
                expected *= dim as isize;
            }
        }
        true
    }

    /// Byte offset of the element at `index`, relative to the layout origin.
    pub fn byte_offset(&self, index: &[usize]) -> Result<isize> {
        if index.len() != self.rank() {
            return Err(ArrayError::shape_mismatch(self.rank(), index.len()));
        }
        let mut offset = 0isize;
        for ((&i, &dim), &stride) in index.iter().zip(self.shape.iter()).zip(self.strides.iter()) {
            if i >= dim {
                return Err(ArrayError::index_out_of_bounds(i, dim));
            }
            offset += i as isize * stride;
        }
        Ok(offset)
    }

    /// Multi-dimensional index of the `linear`-th element in logical C order.
    pub fn index_from_linear(&self, linear: usize) -> Result<Vec<usize>> {
        let count = self.element_count();
        if linear >= count {
            return Err(ArrayError::index_out_of_bounds(linear, count));
        }
        let mut index = vec![0usize; self.rank()];
        let mut rem = linear;
        for (slot, &dim) in index.iter_mut().zip(self.shape.iter()).rev() {
            *slot = rem % dim;
            rem /= dim;
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_strides() {
        let layout = Layout::contiguous(&[2, 3], 8).unwrap();
        assert_eq!(layout.strides(), &[24, 8]);
        assert!(layout.is_contiguous(8));
        assert_eq!(layout.element_count(), 6);
    }

    #[test]
    fn test_zero_rank_is_scalar() {
        let layout = Layout::contiguous(&[], 4).unwrap();
        assert_eq!(layout.element_count(), 1);
        assert!(layout.is_contiguous(4));
        assert_eq!(layout.byte_offset(&[]).unwrap(), 0);
    }

    #[test]
    fn test_strided_is_not_contiguous() {
        let layout = Layout::from_parts(vec![3], vec![16]).unwrap();
        assert!(!layout.is_contiguous(8));
    }

    #[test]
    fn test_byte_offset() {
        let layout = Layout::contiguous(&[2, 3], 8).unwrap();
        assert_eq!(layout.byte_offset(&[0, 0]).unwrap(), 0);
        assert_eq!(layout.byte_offset(&[1, 2]).unwrap(), 40);
        assert!(layout.byte_offset(&[2, 0]).is_err());
        assert!(layout.byte_offset(&[0]).is_err());
    }

    #[test]
    fn test_index_from_linear_odometer() {
        let layout = Layout::contiguous(&[2, 3], 8).unwrap();
        assert_eq!(layout.index_from_linear(0).unwrap(), vec![0, 0]);
        assert_eq!(layout.index_from_linear(4).unwrap(), vec![1, 1]);
        assert_eq!(layout.index_from_linear(5).unwrap(), vec![1, 2]);
        assert!(layout.index_from_linear(6).is_err());
    }

    #[test]
    fn test_rank_overflow() {
        let shape = vec![1usize; MAX_DIMS + 1];
        assert!(Layout::contiguous(&shape, 8).is_err());
    }
}
