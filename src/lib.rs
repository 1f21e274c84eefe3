//! NumBridge - array marshaling adapter.
//!
//! This crate sits between caller code and numeric kernel code, normalizing
//! arbitrary array handles into handles that meet explicit type and layout
//! requirements:
//! - Input, output, and in-out request operations with copy-back temporaries
//! - Low-level constructors (fresh allocation, buffer-backed views)
//! - A closed element-type enumeration with byte-swap transparent access
//! - Shared-ownership handles with a guaranteed-release copy-back contract
//!
//! No array computation lives here; the adapter only marshals.

pub mod adapter;
pub mod core;
pub mod handle;

pub use crate::adapter::{
    element_count, host_byte_order, input_array, io_array, new_all, new_array, new_from_buffer,
    output_array, satisfies,
};
pub use crate::core::{ArrayError, ByteOrder, ElemType, Requirements, Result, MAX_DIMS};
pub use crate::handle::{ArrayHandle, DataBuffer, Element, ScalarValue};
