//! # rs_accel
//!
//! Spatial acceleration trees for ray casting. A tree is built once
//! from a static set of primitives and then answers nearest hit and
//! occlusion queries in sub-linear time, from any number of threads.
//!
//! There are four trees, all sharing one breadth-first builder and one
//! traversal routine:
//!
//! 1. [KdTreeAccel][kd]: binary splits, surface area heuristic or
//!    spatial median
//! 2. [OctreeAccel][oct]: octants split at the center, compact nodes
//! 3. [Octree64Accel][oct64]: same, with room for larger leaves
//! 4. [SahOctreeAccel][sah]: octants split where the surface area
//!    heuristic says so
//!
//! Nodes are stored in fixed size binary encodings, see
//! [node][node].
//!
//! ```rust
//! use rs_accel::accelerators::kdtreeaccel::KdTreeAccel;
//! use rs_accel::accelerators::split::AccelConfig;
//! use rs_accel::core::geometry::{Point3f, Ray, Vector3f};
//! use rs_accel::shapes::cuboid::cube_grid;
//!
//!     let cubes = cube_grid(10, 2.0);
//!     let tree = KdTreeAccel::new(&cubes, AccelConfig::default()).unwrap();
//!     let ray = Ray::new(Point3f::new(10.5, 0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
//!     let hit = tree.intersect(&ray).unwrap();
//!     assert_eq!(hit.prim_num, Some(500));
//! ```
//!
//! [kd]: accelerators/kdtreeaccel/type.KdTreeAccel.html
//! [oct]: accelerators/octree/type.OctreeAccel.html
//! [oct64]: accelerators/octree/type.Octree64Accel.html
//! [sah]: accelerators/octree/type.SahOctreeAccel.html
//! [node]: accelerators/node/index.html

#[macro_use]
extern crate impl_ops;

pub mod accelerators;
pub mod blockqueue;
pub mod core;
pub mod shapes;
