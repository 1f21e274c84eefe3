//! Element values, byte codecs, and typed access.
//!
//! All element traffic between buffers and callers goes through
//! [`ScalarValue`]: a value is decoded from its stored bytes (swapping if the
//! handle's byte order differs from the host), optionally cast to another
//! element type, and encoded back. This is where byte-swap transparency and
//! cast policy live.

use num_complex::{Complex, Complex32, Complex64};

use crate::core::error::{ArrayError, Result};
use crate::core::types::ElemType;

/// A single element value, held in one of five canonical lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(Complex<f64>),
}

impl ScalarValue {
    fn as_f64(self) -> Result<f64> {
        match self {
            ScalarValue::Bool(b) => Ok(b as u8 as f64),
            ScalarValue::Int(v) => Ok(v as f64),
            ScalarValue::UInt(v) => Ok(v as f64),
            ScalarValue::Float(v) => Ok(v),
            ScalarValue::Complex(_) => Err(ArrayError::type_conversion(
                "cannot convert complex value to a real type",
            )),
        }
    }

    fn as_i64(self) -> Result<i64> {
        match self {
            ScalarValue::Bool(b) => Ok(b as i64),
            ScalarValue::Int(v) => Ok(v),
            ScalarValue::UInt(v) => Ok(v as i64),
            ScalarValue::Float(v) => Ok(v as i64),
            ScalarValue::Complex(_) => Err(ArrayError::type_conversion(
                "cannot convert complex value to an integer type",
            )),
        }
    }

    fn as_u64(self) -> Result<u64> {
        match self {
            ScalarValue::Bool(b) => Ok(b as u64),
            ScalarValue::Int(v) => Ok(v as u64),
            ScalarValue::UInt(v) => Ok(v),
            ScalarValue::Float(v) => Ok(v as u64),
            ScalarValue::Complex(_) => Err(ArrayError::type_conversion(
                "cannot convert complex value to an integer type",
            )),
        }
    }

    fn as_complex(self) -> Complex<f64> {
        match self {
            ScalarValue::Bool(b) => Complex::new(b as u8 as f64, 0.0),
            ScalarValue::Int(v) => Complex::new(v as f64, 0.0),
            ScalarValue::UInt(v) => Complex::new(v as f64, 0.0),
            ScalarValue::Float(v) => Complex::new(v, 0.0),
            ScalarValue::Complex(c) => c,
        }
    }

    fn is_truthy(self) -> Result<bool> {
        match self {
            ScalarValue::Bool(b) => Ok(b),
            ScalarValue::Int(v) => Ok(v != 0),
            ScalarValue::UInt(v) => Ok(v != 0),
            ScalarValue::Float(v) => Ok(v != 0.0),
            ScalarValue::Complex(_) => Err(ArrayError::type_conversion(
                "cannot convert complex value to bool",
            )),
        }
    }

    /// Convert this value to the lane and width of `target`.
    ///
    /// Narrowing follows C cast semantics; complex to non-complex fails.
    pub fn cast_to(self, target: ElemType) -> Result<ScalarValue> {
        let value = match target.resolve() {
            ElemType::Bool => ScalarValue::Bool(self.is_truthy()?),
            ElemType::Int8 => ScalarValue::Int(self.as_i64()? as i8 as i64),
            ElemType::Int16 => ScalarValue::Int(self.as_i64()? as i16 as i64),
            ElemType::Int32 => ScalarValue::Int(self.as_i64()? as i32 as i64),
            ElemType::Int64 => ScalarValue::Int(self.as_i64()?),
            ElemType::UInt8 => ScalarValue::UInt(self.as_u64()? as u8 as u64),
            ElemType::UInt16 => ScalarValue::UInt(self.as_u64()? as u16 as u64),
            ElemType::UInt32 => ScalarValue::UInt(self.as_u64()? as u32 as u64),
            ElemType::UInt64 => ScalarValue::UInt(self.as_u64()?),
            ElemType::Float32 => ScalarValue::Float(self.as_f64()? as f32 as f64),
            ElemType::Float64 => ScalarValue::Float(self.as_f64()?),
            ElemType::Complex64 | ElemType::Complex128 => ScalarValue::Complex(self.as_complex()),
            ElemType::Any => unreachable!("resolve() never yields Any"),
        };
        Ok(value)
    }
}

fn fixed<const N: usize>(bytes: &[u8], swap: bool) -> [u8; N] {
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes[..N]);
    if swap {
        arr.reverse();
    }
    arr
}

/// Decode one element of `dtype` from its stored bytes.
///
/// `swap` indicates the stored byte order differs from the host. Complex
/// types store two components, each in the given order.
pub(crate) fn decode(dtype: ElemType, bytes: &[u8], swap: bool) -> ScalarValue {
    match dtype.resolve() {
        ElemType::Bool => ScalarValue::Bool(bytes[0] != 0),
        ElemType::Int8 => ScalarValue::Int(bytes[0] as i8 as i64),
        ElemType::Int16 => ScalarValue::Int(i16::from_ne_bytes(fixed(bytes, swap)) as i64),
        ElemType::Int32 => ScalarValue::Int(i32::from_ne_bytes(fixed(bytes, swap)) as i64),
        ElemType::Int64 => ScalarValue::Int(i64::from_ne_bytes(fixed(bytes, swap))),
        ElemType::UInt8 => ScalarValue::UInt(bytes[0] as u64),
        ElemType::UInt16 => ScalarValue::UInt(u16::from_ne_bytes(fixed(bytes, swap)) as u64),
        ElemType::UInt32 => ScalarValue::UInt(u32::from_ne_bytes(fixed(bytes, swap)) as u64),
        ElemType::UInt64 => ScalarValue::UInt(u64::from_ne_bytes(fixed(bytes, swap))),
        ElemType::Float32 => ScalarValue::Float(f32::from_ne_bytes(fixed(bytes, swap)) as f64),
        ElemType::Float64 => ScalarValue::Float(f64::from_ne_bytes(fixed(bytes, swap))),
        ElemType::Complex64 => {
            let re = f32::from_ne_bytes(fixed(&bytes[..4], swap)) as f64;
            let im = f32::from_ne_bytes(fixed(&bytes[4..8], swap)) as f64;
            ScalarValue::Complex(Complex::new(re, im))
        }
        ElemType::Complex128 => {
            let re = f64::from_ne_bytes(fixed(&bytes[..8], swap));
            let im = f64::from_ne_bytes(fixed(&bytes[8..16], swap));
            ScalarValue::Complex(Complex::new(re, im))
        }
        ElemType::Any => unreachable!("resolve() never yields Any"),
    }
}

fn put<const N: usize>(out: &mut [u8], mut bytes: [u8; N], swap: bool) {
    if swap {
        bytes.reverse();
    }
    out[..N].copy_from_slice(&bytes);
}

/// Cast `value` to `dtype` and encode it into `out`.
pub(crate) fn encode(dtype: ElemType, value: ScalarValue, swap: bool, out: &mut [u8]) -> Result<()> {
    match value.cast_to(dtype)? {
        ScalarValue::Bool(b) => out[0] = b as u8,
        ScalarValue::Int(v) => match dtype.resolve() {
            ElemType::Int8 => out[0] = v as i8 as u8,
            ElemType::Int16 => put(out, (v as i16).to_ne_bytes(), swap),
            ElemType::Int32 => put(out, (v as i32).to_ne_bytes(), swap),
            _ => put(out, v.to_ne_bytes(), swap),
        },
        ScalarValue::UInt(v) => match dtype.resolve() {
            ElemType::UInt8 => out[0] = v as u8,
            ElemType::UInt16 => put(out, (v as u16).to_ne_bytes(), swap),
            ElemType::UInt32 => put(out, (v as u32).to_ne_bytes(), swap),
            _ => put(out, v.to_ne_bytes(), swap),
        },
        ScalarValue::Float(v) => match dtype.resolve() {
            ElemType::Float32 => put(out, (v as f32).to_ne_bytes(), swap),
            _ => put(out, v.to_ne_bytes(), swap),
        },
        ScalarValue::Complex(c) => match dtype.resolve() {
            ElemType::Complex64 => {
                put(&mut out[..4], (c.re as f32).to_ne_bytes(), swap);
                put(&mut out[4..8], (c.im as f32).to_ne_bytes(), swap);
            }
            _ => {
                put(&mut out[..8], c.re.to_ne_bytes(), swap);
                put(&mut out[8..16], c.im.to_ne_bytes(), swap);
            }
        },
    }
    Ok(())
}

/// Rust scalar types that map onto an [`ElemType`].
///
/// The coercion seam between typed caller data (slices, vectors) and the
/// untyped byte storage behind a handle.
pub trait Element: Copy {
    /// The element type tag for this Rust type.
    const DTYPE: ElemType;

    /// Lift a typed value into a [`ScalarValue`] lane.
    fn to_scalar(self) -> ScalarValue;

    /// Lower a [`ScalarValue`] back to this type.
    ///
    /// Expects a value already cast to [`Self::DTYPE`]; returns `None` on a
    /// lane mismatch.
    fn from_scalar(value: ScalarValue) -> Option<Self>;
}

impl Element for bool {
    const DTYPE: ElemType = ElemType::Bool;

    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Bool(self)
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

macro_rules! impl_int_element {
    ($($ty:ty => $tag:ident / $lane:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: ElemType = ElemType::$tag;

                fn to_scalar(self) -> ScalarValue {
                    ScalarValue::$lane(self as _)
                }

                fn from_scalar(value: ScalarValue) -> Option<Self> {
                    match value {
                        ScalarValue::$lane(v) => Some(v as $ty),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_int_element! {
    i8 => Int8 / Int,
    i16 => Int16 / Int,
    i32 => Int32 / Int,
    i64 => Int64 / Int,
    u8 => UInt8 / UInt,
    u16 => UInt16 / UInt,
    u32 => UInt32 / UInt,
    u64 => UInt64 / UInt,
}

impl Element for f32 {
    const DTYPE: ElemType = ElemType::Float32;

    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Float(self as f64)
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl Element for f64 {
    const DTYPE: ElemType = ElemType::Float64;

    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Float(self)
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for Complex32 {
    const DTYPE: ElemType = ElemType::Complex64;

    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Complex(Complex::new(self.re as f64, self.im as f64))
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Complex(c) => Some(Complex::new(c.re as f32, c.im as f32)),
            _ => None,
        }
    }
}

impl Element for Complex64 {
    const DTYPE: ElemType = ElemType::Complex128;

    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Complex(self)
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Complex(c) => Some(c),
            _ => None,
        }
    }
}
