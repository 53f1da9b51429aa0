//! germanprep-core — Question model and schema normalizer.
//!
//! This crate defines the canonical question types consumed by the rest of
//! the system, the as-received upstream shapes, and the total normalization
//! functions that map one onto the other.

pub mod model;
pub mod normalize;
pub mod upstream;
