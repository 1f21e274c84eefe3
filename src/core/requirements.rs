//! Layout requirement masks for adapter requests.

use bitflags::bitflags;

bitflags! {
    /// Bitmask of independent constraints a handle must satisfy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Requirements: u32 {
        /// Elements must occupy a single densely packed region in C order.
        const CONTIGUOUS = 1 << 0;
        /// Data must start on an element-size boundary.
        const ALIGNED = 1 << 1;
        /// The handle must be writable.
        const WRITABLE = 1 << 2;
        /// Stored byte order must match the host.
        const NOT_SWAPPED = 1 << 3;
        /// Always allocate a fresh copy, even when the source already
        /// satisfies every other constraint. Escape hatch for callers that
        /// cannot tolerate aliasing the source.
        const ENSURE_COPY = 1 << 4;
        /// When a copy is made, register it as a copy-back temporary that
        /// synchronizes into the source on release.
        const UPDATE_IF_COPY = 1 << 5;
    }
}
