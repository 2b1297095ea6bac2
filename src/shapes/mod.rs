//! Shapes are the geometry the acceleration trees are built over.
//! All of them implement the **Primitive** trait, so the trees never
//! need any details about the underlying shape.
//!
//! - Cuboid
//! - Sphere
//! - Triangle
//!
//! ## Cuboids
//!
//! Axis aligned boxes, useful for tests because their bounds are
//! exact.
//!
//! ## Spheres
//!
//! Spheres are a special case of a general type of surfaces called
//! quadrics. Intersection solves a quadratic equation for the ray
//! parameter.
//!
//! ## Triangles
//!
//! Triangles share their vertices through a **TriangleMesh** and are
//! intersected with a watertight algorithm.

pub mod cuboid;
pub mod sphere;
pub mod triangle;
