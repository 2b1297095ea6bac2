//! The geometry of a particular point on a surface is represented by
//! a **Hit**. Shapes fill in the parametric distance, the hit point
//! and the geometric normal, accelerators add the index of the
//! primitive which was hit.

// std
use std::cmp::Ordering;
// rs_accel
use crate::core::geometry::{Normal3f, Point3f};
use crate::core::pbrt::Float;

#[derive(Debug, Default, Copy, Clone)]
pub struct Hit {
    /// parametric distance along the ray
    pub t_hit: Float,
    pub p: Point3f,
    pub n: Normal3f,
    /// index into the primitive slice an accelerator was built from
    pub prim_num: Option<usize>,
}

impl Hit {
    pub fn new(t_hit: Float, p: Point3f, n: Normal3f) -> Self {
        Hit {
            t_hit,
            p,
            n,
            prim_num: None,
        }
    }
    /// Keep whichever of `self` and `other` is closer, the current
    /// one wins ties.
    pub fn closest(self, other: Hit) -> Hit {
        if other.t_hit < self.t_hit {
            other
        } else {
            self
        }
    }
}

// hits are compared by distance only
impl PartialEq for Hit {
    fn eq(&self, other: &Hit) -> bool {
        self.t_hit == other.t_hit
    }
}

impl PartialOrd for Hit {
    fn partial_cmp(&self, other: &Hit) -> Option<Ordering> {
        self.t_hit.partial_cmp(&other.t_hit)
    }
}
