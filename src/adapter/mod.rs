//! The array adapter: request operations and low-level constructors.

pub mod construct;
pub mod request;

pub use construct::{new_all, new_array, new_from_buffer};
pub use request::{element_count, host_byte_order, input_array, io_array, output_array, satisfies};
