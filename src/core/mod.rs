//! The core of the crate: geometric classes, the **Primitive**
//! interface the accelerators work with, error types and the
//! parameter set used for configuration.

pub mod error;
pub mod geometry;
pub mod interaction;
pub mod paramset;
pub mod pbrt;
pub mod primitive;
pub mod rng;
