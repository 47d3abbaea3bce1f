//! Core components and types used throughout this library.

/// Counter type defining operations required by the histogram and impls for primitives.
pub mod counter;

/// Bucket geometry shared by all histogram variants.
pub(crate) mod layout;
