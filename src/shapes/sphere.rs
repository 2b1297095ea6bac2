//! Spheres in world space, given by center and radius.

// rs_accel
use crate::core::geometry::{vec3_dot_vec3f, Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::interaction::Hit;
use crate::core::pbrt::{quadratic, Float};
use crate::core::primitive::Primitive;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub center: Point3f,
    pub radius: Float,
}

impl Sphere {
    pub fn new(center: Point3f, radius: Float) -> Self {
        Sphere { center, radius }
    }
}

impl Primitive for Sphere {
    fn world_bound(&self) -> Bounds3f {
        let r: Vector3f = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }
    fn intersect(&self, ray: &Ray) -> Option<Hit> {
        // compute quadratic sphere coefficients
        let oc: Vector3f = ray.o - self.center;
        let a: Float = vec3_dot_vec3f(&ray.d, &ray.d);
        let b: Float = 2.0 as Float * vec3_dot_vec3f(&ray.d, &oc);
        let c: Float = vec3_dot_vec3f(&oc, &oc) - self.radius * self.radius;
        // solve quadratic equation for _t_ values
        let (t0, t1) = quadratic(a, b, c)?;
        // check quadric shape _t0_ and _t1_ for nearest intersection
        if t0 > ray.t_max || t1 <= 0.0 {
            return None;
        }
        let mut t_shape_hit: Float = t0;
        if t_shape_hit <= 0.0 {
            t_shape_hit = t1;
            if t_shape_hit > ray.t_max {
                return None;
            }
        }
        let p: Point3f = ray.position(t_shape_hit);
        let n: Normal3f = Normal3f::from((p - self.center) / self.radius);
        Some(Hit::new(t_shape_hit, p, n))
    }
}
