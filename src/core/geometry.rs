//! Almost all nontrivial graphics programs are built on a foundation
//! of geometric classes. These classes represent mathematical
//! constructs like points, vectors, and rays.
//!
//! # Points and Vectors
//!
//! A **point** is a zero-dimensional location in 3D space, a
//! **vector** represents a direction. Both use x, y, z coordinates
//! with respect to a coordinate system, but they are kept apart
//! because they behave differently (the difference of two points is
//! a vector, a point plus a vector is a point).
//!
//! ```rust
//! use rs_accel::core::geometry::{Point3f, Vector3f};
//!
//!     let origin = Point3f::default();
//!     let up = Vector3f {
//!         x: 0.0,
//!         y: 1.0,
//!         z: 0.0,
//!     };
//!     let p: Point3f = origin + up * 2.0;
//!     assert_eq!(p.y, 2.0);
//! ```
//!
//! # Rays
//!
//! A **ray** is a semi-infinite line specified by its origin and
//! direction. The parametric range is limited by **t_max**, a query
//! only reports intersections in `(0, t_max]`.
//!
//! # Bounding Boxes
//!
//! The acceleration trees partition space with axis-aligned boxes
//! (**Bounds3f**). The default box is *empty*: its minimum is
//! `+inf` and its maximum `-inf` on every axis, which makes it the
//! neutral element for `bnd3_union_bnd3f()`.
//!
//! ```rust
//! use rs_accel::core::geometry::{bnd3_union_bnd3f, Bounds3f, Point3f};
//!
//!     let unit_cube = Bounds3f::new(
//!         Point3f { x: 0.0, y: 0.0, z: 0.0 },
//!         Point3f { x: 1.0, y: 1.0, z: 1.0 },
//!     );
//!     let b = bnd3_union_bnd3f(&Bounds3f::default(), &unit_cube);
//!     assert_eq!(b, unit_cube);
//! ```

// std
use std::ops;
use std::ops::{Index, IndexMut};
// others
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
// rs_accel
use crate::core::pbrt::extent;
use crate::core::pbrt::Float;

#[derive(EnumIter, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum XYZEnum {
    X = 0,
    Y = 1,
    Z = 2,
}

impl XYZEnum {
    /// Map an axis number (0, 1, 2) to the enum, anything above two
    /// maps to **Z**.
    pub fn from_axis(axis: u8) -> XYZEnum {
        match axis {
            0 => XYZEnum::X,
            1 => XYZEnum::Y,
            _ => XYZEnum::Z,
        }
    }
    /// Round-robin successor (X -> Y -> Z -> X).
    pub fn next(self) -> XYZEnum {
        XYZEnum::from_axis((self as u8 + 1) % 3)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Vector3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Vector3f { x, y, z }
    }
    pub fn abs(&self) -> Vector3f {
        Vector3f {
            x: self.x.abs(),
            y: self.y.abs(),
            z: self.z.abs(),
        }
    }
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    /// Compute a new vector pointing in the same direction but with unit
    /// length.
    pub fn normalize(&self) -> Vector3f {
        *self / self.length()
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Point3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Point3f { x, y, z }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Normal3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Normal3f {
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    /// Compute a new normal pointing in the same direction but with unit
    /// length.
    pub fn normalize(&self) -> Normal3f {
        let inv: Float = 1.0 as Float / self.length();
        Normal3f {
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv,
        }
    }
}

impl From<Vector3f> for Normal3f {
    fn from(v: Vector3f) -> Self {
        Normal3f {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Point3f> for Vector3f {
    fn from(p: Point3f) -> Self {
        Vector3f {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl_op!(-|a: Vector3f| -> Vector3f {
    Vector3f {
        x: -a.x,
        y: -a.y,
        z: -a.z,
    }
});

impl_op_ex!(+|a: &Point3f, b: &Point3f| -> Point3f {
    Point3f {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
});

impl_op_ex!(+|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
});

impl_op_ex!(-|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op_ex!(+|a: &Point3f, b: &Vector3f| -> Point3f {
    Point3f {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
});

impl_op_ex!(-|a: &Point3f, b: &Point3f| -> Vector3f {
    Vector3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op_ex!(-|a: &Point3f, b: &Vector3f| -> Point3f {
    Point3f {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
});

impl_op_ex!(*|a: &Point3f, b: Float| -> Point3f {
    Point3f {
        x: a.x * b,
        y: a.y * b,
        z: a.z * b,
    }
});

impl_op_ex!(*|a: &Vector3f, b: Float| -> Vector3f {
    Vector3f {
        x: a.x * b,
        y: a.y * b,
        z: a.z * b,
    }
});

impl_op_ex!(/|a: &Vector3f, b: Float| -> Vector3f {
    assert_ne!(b, 0.0 as Float);
    let inv: Float = 1.0 as Float / b;
    Vector3f {
        x: a.x * inv,
        y: a.y * inv,
        z: a.z * inv,
    }
});

impl Index<XYZEnum> for Vector3f {
    type Output = Float;
    fn index(&self, index: XYZEnum) -> &Float {
        match index {
            XYZEnum::X => &self.x,
            XYZEnum::Y => &self.y,
            _ => &self.z,
        }
    }
}

impl Index<XYZEnum> for Point3f {
    type Output = Float;
    fn index(&self, index: XYZEnum) -> &Float {
        match index {
            XYZEnum::X => &self.x,
            XYZEnum::Y => &self.y,
            _ => &self.z,
        }
    }
}

impl IndexMut<XYZEnum> for Point3f {
    fn index_mut(&mut self, index: XYZEnum) -> &mut Float {
        match index {
            XYZEnum::X => &mut self.x,
            XYZEnum::Y => &mut self.y,
            _ => &mut self.z,
        }
    }
}

/// Product of the Euclidean magnitudes of the two vectors and the
/// cosine of the angle between them.
pub fn vec3_dot_vec3f(v1: &Vector3f, v2: &Vector3f) -> Float {
    v1.x * v2.x + v1.y * v2.y + v1.z * v2.z
}

/// Given two vectors in 3D, the cross product is a vector that is
/// perpendicular to both of them.
pub fn vec3_cross_vec3(v1: &Vector3f, v2: &Vector3f) -> Vector3f {
    let v1x: f64 = v1.x as f64;
    let v1y: f64 = v1.y as f64;
    let v1z: f64 = v1.z as f64;
    let v2x: f64 = v2.x as f64;
    let v2y: f64 = v2.y as f64;
    let v2z: f64 = v2.z as f64;
    Vector3f {
        x: ((v1y * v2z) - (v1z * v2y)) as Float,
        y: ((v1z * v2x) - (v1x * v2z)) as Float,
        z: ((v1x * v2y) - (v1y * v2x)) as Float,
    }
}

/// Return the largest coordinate value.
pub fn vec3_max_componentf(v: &Vector3f) -> Float {
    v.x.max(v.y.max(v.z))
}

/// Return the index of the component with the largest value.
pub fn vec3_max_dimensionf(v: &Vector3f) -> usize {
    if v.x > v.y {
        if v.x > v.z {
            0_usize
        } else {
            2_usize
        }
    } else if v.y > v.z {
        1_usize
    } else {
        2_usize
    }
}

/// Permute the coordinate values according to the povided
/// permutation.
pub fn vec3_permutef(v: &Vector3f, x: usize, y: usize, z: usize) -> Vector3f {
    let v3: [Float; 3] = [v.x, v.y, v.z];
    Vector3f {
        x: v3[x],
        y: v3[y],
        z: v3[z],
    }
}

/// Permute the coordinate values according to the povided
/// permutation.
pub fn pnt3_permutef(v: &Point3f, x: usize, y: usize, z: usize) -> Point3f {
    let v3: [Float; 3] = [v.x, v.y, v.z];
    Point3f {
        x: v3[x],
        y: v3[y],
        z: v3[z],
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3f {
    pub p_min: Point3f,
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    fn default() -> Bounds3f {
        let min_num: Float = std::f32::NEG_INFINITY;
        let max_num: Float = std::f32::INFINITY;
        // empty box, safe seed for a fold over unions
        Bounds3f {
            p_min: Point3f {
                x: max_num,
                y: max_num,
                z: max_num,
            },
            p_max: Point3f {
                x: min_num,
                y: min_num,
                z: min_num,
            },
        }
    }
}

impl Bounds3f {
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        let p_min: Point3f = Point3f {
            x: p1.x.min(p2.x),
            y: p1.y.min(p2.y),
            z: p1.z.min(p2.z),
        };
        let p_max: Point3f = Point3f {
            x: p1.x.max(p2.x),
            y: p1.y.max(p2.y),
            z: p1.z.max(p2.z),
        };
        Bounds3f { p_min, p_max }
    }
    /// True for boxes with `p_min > p_max` on any axis (including the
    /// default sentinel).
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }
    pub fn corner(&self, corner: u8) -> Point3f {
        assert!(corner < 8_u8);
        let x: Float = if corner & 1 == 0 {
            self.p_min.x
        } else {
            self.p_max.x
        };
        let y: Float = if corner & 2 == 0 {
            self.p_min.y
        } else {
            self.p_max.y
        };
        let z: Float = if corner & 4 == 0 {
            self.p_min.z
        } else {
            self.p_max.z
        };
        Point3f { x, y, z }
    }
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }
    pub fn center(&self) -> Point3f {
        (self.p_min + self.p_max) * 0.5 as Float
    }
    /// Surface area, zero for empty and flat boxes.
    pub fn surface_area(&self) -> Float {
        let dx: Float = extent(self.p_min.x, self.p_max.x);
        let dy: Float = extent(self.p_min.y, self.p_max.y);
        let dz: Float = extent(self.p_min.z, self.p_max.z);
        // 2 * (d.x * d.y + d.x * d.z + d.y * d.z)
        let r: Float = dx * dy + dx * dz + dy * dz;
        r + r // avoid '2 *'
    }
    /// Cut the box with the plane `axis = value`; returns the part
    /// below and the part above. The value is clamped to the box.
    pub fn split(&self, axis: XYZEnum, value: Float) -> (Bounds3f, Bounds3f) {
        let v: Float = value.max(self.p_min[axis]).min(self.p_max[axis]);
        let mut below: Bounds3f = *self;
        let mut above: Bounds3f = *self;
        below.p_max[axis] = v;
        above.p_min[axis] = v;
        (below, above)
    }
    /// One of the eight boxes created by splitting at `split`. Bit
    /// *i* of `octant` selects the upper half along axis *i*.
    pub fn octant(&self, split: &Point3f, octant: u8) -> Bounds3f {
        let mut b: Bounds3f = *self;
        if octant & 1 == 0 {
            b.p_max.x = split.x;
        } else {
            b.p_min.x = split.x;
        }
        if octant & 2 == 0 {
            b.p_max.y = split.y;
        } else {
            b.p_min.y = split.y;
        }
        if octant & 4 == 0 {
            b.p_max.z = split.z;
        } else {
            b.p_min.z = split.z;
        }
        b
    }
    /// Slab test. Returns the parametric interval `[t0, t1]` in which
    /// the ray is inside the box, restricted to `[0, ray.t_max]`.
    ///
    /// Axis-parallel rays rely on IEEE division by zero: the reciprocal
    /// direction becomes a correctly signed infinity and the slab
    /// interval is `(-inf, inf)` or empty. A NaN (ray origin exactly on
    /// a slab plane) fails every comparison and leaves the interval
    /// unchanged. The empty box is never hit, its inverted slabs would
    /// otherwise swap into `(-inf, inf)`.
    pub fn intersect_b(&self, ray: &Ray) -> Option<(Float, Float)> {
        if self.is_empty() {
            return None;
        }
        let mut t0: Float = 0.0;
        let mut t1: Float = ray.t_max;
        for i in XYZEnum::iter() {
            // update interval for _i_th bounding box slab
            let inv_ray_dir: Float = 1.0 as Float / ray.d[i];
            let mut t_near: Float = (self.p_min[i] - ray.o[i]) * inv_ray_dir;
            let mut t_far: Float = (self.p_max[i] - ray.o[i]) * inv_ray_dir;
            // update parametric interval from slab intersection $t$ values
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            if t_near > t0 {
                t0 = t_near;
            }
            if t_far < t1 {
                t1 = t_far;
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

/// Given a bounding box and a point, the **bnd3_union_pnt3f()**
/// function returns a new bounding box that encompasses that point as
/// well as the original box.
pub fn bnd3_union_pnt3f(b: &Bounds3f, p: &Point3f) -> Bounds3f {
    let p_min: Point3f = Point3f {
        x: b.p_min.x.min(p.x),
        y: b.p_min.y.min(p.y),
        z: b.p_min.z.min(p.z),
    };
    let p_max: Point3f = Point3f {
        x: b.p_max.x.max(p.x),
        y: b.p_max.y.max(p.y),
        z: b.p_max.z.max(p.z),
    };
    Bounds3f { p_min, p_max }
}

/// Construct a new box that bounds the space encompassed by two other
/// bounding boxes.
pub fn bnd3_union_bnd3f(b1: &Bounds3f, b2: &Bounds3f) -> Bounds3f {
    let p_min: Point3f = Point3f {
        x: b1.p_min.x.min(b2.p_min.x),
        y: b1.p_min.y.min(b2.p_min.y),
        z: b1.p_min.z.min(b2.p_min.z),
    };
    let p_max: Point3f = Point3f {
        x: b1.p_max.x.max(b2.p_max.x),
        y: b1.p_max.y.max(b2.p_max.y),
        z: b1.p_max.z.max(b2.p_max.z),
    };
    Bounds3f { p_min, p_max }
}

/// Determine if two boxes overlap. Touching faces count as overlap.
pub fn bnd3_overlaps_bnd3(b1: &Bounds3f, b2: &Bounds3f) -> bool {
    let x: bool = (b1.p_min.x <= b2.p_max.x) && (b2.p_min.x <= b1.p_max.x);
    let y: bool = (b1.p_min.y <= b2.p_max.y) && (b2.p_min.y <= b1.p_max.y);
    let z: bool = (b1.p_min.z <= b2.p_max.z) && (b2.p_min.z <= b1.p_max.z);
    x && y && z
}

/// Determine if a given point is inside the bounding box.
pub fn pnt3_inside_bnd3(p: &Point3f, b: &Bounds3f) -> bool {
    p.x >= b.p_min.x
        && p.x <= b.p_max.x
        && p.y >= b.p_min.y
        && p.y <= b.p_max.y
        && p.z >= b.p_min.z
        && p.z <= b.p_max.z
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    /// origin
    pub o: Point3f,
    /// direction
    pub d: Vector3f,
    /// limits the ray to a segment along its infinite extent
    pub t_max: Float,
}

impl Default for Ray {
    fn default() -> Self {
        Ray {
            o: Point3f::default(),
            d: Vector3f::default(),
            t_max: std::f32::INFINITY,
        }
    }
}

impl Ray {
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        Ray {
            o,
            d,
            t_max: std::f32::INFINITY,
        }
    }
    pub fn position(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}
