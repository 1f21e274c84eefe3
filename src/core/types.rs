//! Core data types for NumBridge.

use serde::{Deserialize, Serialize};

/// Maximum number of dimensions an array handle may have.
pub const MAX_DIMS: usize = 32;

/// Element type tag for array handles.
///
/// A closed enumeration with a fixed byte-width table, decoupled from any
/// host runtime's internal type numbering. `Any` is a wildcard used in
/// adapter requests: it matches every concrete type, and resolves to
/// `Float64` where a concrete type is needed for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElemType {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    /// Complex of two 32-bit floats.
    Complex64,
    /// Complex of two 64-bit floats.
    Complex128,
    /// Wildcard: matches any concrete type in requests.
    Any,
}

impl ElemType {
    /// Size of a single element in bytes.
    ///
    /// `Any` reports the width of its `Float64` resolution.
    #[inline]
    pub fn size_bytes(self) -> usize {
        match self {
            ElemType::Bool | ElemType::Int8 | ElemType::UInt8 => 1,
            ElemType::Int16 | ElemType::UInt16 => 2,
            ElemType::Int32 | ElemType::UInt32 | ElemType::Float32 => 4,
            ElemType::Int64 | ElemType::UInt64 | ElemType::Float64 => 8,
            ElemType::Complex64 => 8,
            ElemType::Complex128 => 16,
            ElemType::Any => 8,
        }
    }

    /// Whether this is the `Any` wildcard.
    #[inline]
    pub fn is_any(self) -> bool {
        matches!(self, ElemType::Any)
    }

    /// Whether this is a complex type.
    #[inline]
    pub fn is_complex(self) -> bool {
        matches!(self, ElemType::Complex64 | ElemType::Complex128)
    }

    /// Resolve the `Any` wildcard to the default concrete type (`Float64`).
    #[inline]
    pub fn resolve(self) -> ElemType {
        if self.is_any() {
            ElemType::Float64
        } else {
            self
        }
    }

    /// Resolve the `Any` wildcard to a caller-provided concrete type.
    #[inline]
    pub fn resolve_with(self, fallback: ElemType) -> ElemType {
        if self.is_any() {
            fallback.resolve()
        } else {
            self
        }
    }

    /// Whether a value of this type can be converted to `target`.
    ///
    /// All numeric conversions are allowed except complex to non-complex,
    /// which would silently discard the imaginary component.
    pub fn castable_to(self, target: ElemType) -> bool {
        if target.is_any() {
            return true;
        }
        !(self.is_complex() && !target.is_complex())
    }
}

impl Default for ElemType {
    fn default() -> Self {
        ElemType::Float64
    }
}

/// Byte order of multi-byte element storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Detect the host's native byte order.
    ///
    /// Deterministic: probes the byte layout of a known multi-byte value.
    #[inline]
    pub fn host() -> ByteOrder {
        if 1u32.to_ne_bytes()[0] == 1 {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    /// The opposite byte order.
    #[inline]
    pub fn swapped(self) -> ByteOrder {
        match self {
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
            ByteOrder::BigEndian => ByteOrder::LittleEndian,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes() {
        assert_eq!(ElemType::Bool.size_bytes(), 1);
        assert_eq!(ElemType::Int16.size_bytes(), 2);
        assert_eq!(ElemType::UInt32.size_bytes(), 4);
        assert_eq!(ElemType::Float64.size_bytes(), 8);
        assert_eq!(ElemType::Complex64.size_bytes(), 8);
        assert_eq!(ElemType::Complex128.size_bytes(), 16);
    }

    #[test]
    fn test_any_resolution() {
        assert_eq!(ElemType::Any.resolve(), ElemType::Float64);
        assert_eq!(ElemType::Int8.resolve(), ElemType::Int8);
        assert_eq!(ElemType::Any.resolve_with(ElemType::Int32), ElemType::Int32);
        assert_eq!(ElemType::Any.resolve_with(ElemType::Any), ElemType::Float64);
    }

    #[test]
    fn test_castability() {
        assert!(ElemType::Int32.castable_to(ElemType::Float64));
        assert!(ElemType::Float64.castable_to(ElemType::Complex128));
        assert!(ElemType::Complex64.castable_to(ElemType::Complex128));
        assert!(!ElemType::Complex128.castable_to(ElemType::Float64));
        assert!(!ElemType::Complex64.castable_to(ElemType::Bool));
    }

    #[test]
    fn test_host_byte_order_matches_ne_bytes() {
        let probe = 0x0102u16.to_ne_bytes();
        match ByteOrder::host() {
            ByteOrder::LittleEndian => assert_eq!(probe, [0x02, 0x01]),
            ByteOrder::BigEndian => assert_eq!(probe, [0x01, 0x02]),
        }
    }

    #[test]
    fn test_swapped() {
        assert_eq!(ByteOrder::LittleEndian.swapped(), ByteOrder::BigEndian);
        assert_eq!(ByteOrder::BigEndian.swapped(), ByteOrder::LittleEndian);
    }
}
