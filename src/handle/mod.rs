//! Array handles and their supporting machinery.

pub mod array;
pub mod layout;
pub mod scalar;
pub mod storage;

pub use array::ArrayHandle;
pub use layout::Layout;
pub use scalar::{Element, ScalarValue};
pub use storage::DataBuffer;
