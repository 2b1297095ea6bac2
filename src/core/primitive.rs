//! The **Primitive** trait is the bridge between the geometry
//! (shapes) and the acceleration structures. Anything that can report
//! its bounds and intersect a ray can be stored in a tree, including
//! another tree.

// rs_accel
use crate::core::geometry::{Bounds3f, Ray};
use crate::core::interaction::Hit;

pub trait Primitive {
    fn world_bound(&self) -> Bounds3f;
    /// Closest intersection in `(0, ray.t_max]`, if any.
    fn intersect(&self, ray: &Ray) -> Option<Hit>;
    /// Shadow ray test, cheaper than **intersect** for primitives
    /// that can skip computing the hit record.
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }
}

impl<'a, P: Primitive + ?Sized> Primitive for &'a P {
    fn world_bound(&self) -> Bounds3f {
        (**self).world_bound()
    }
    fn intersect(&self, ray: &Ray) -> Option<Hit> {
        (**self).intersect(ray)
    }
    fn intersect_p(&self, ray: &Ray) -> bool {
        (**self).intersect_p(ray)
    }
}

impl Primitive for Box<dyn Primitive + Send + Sync> {
    fn world_bound(&self) -> Bounds3f {
        (**self).world_bound()
    }
    fn intersect(&self, ray: &Ray) -> Option<Hit> {
        (**self).intersect(ray)
    }
    fn intersect_p(&self, ray: &Ray) -> bool {
        (**self).intersect_p(ray)
    }
}
