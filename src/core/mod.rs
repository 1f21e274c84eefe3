//! Core types and utilities for NumBridge.

pub mod error;
pub mod requirements;
pub mod types;

pub use error::{ArrayError, Result};
pub use requirements::Requirements;
pub use types::{ByteOrder, ElemType, MAX_DIMS};
