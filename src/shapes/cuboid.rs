//! Axis aligned boxes. The simplest primitive there is: its bounds
//! are the shape itself, so intersection is a slab test.

// rs_accel
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray, XYZEnum};
use crate::core::interaction::Hit;
use crate::core::pbrt::Float;
use crate::core::primitive::Primitive;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cuboid {
    pub bounds: Bounds3f,
}

impl Cuboid {
    pub fn new(bounds: Bounds3f) -> Self {
        Cuboid { bounds }
    }
    /// Outward normal of the face closest to `p`.
    fn face_normal(&self, p: &Point3f) -> Normal3f {
        let mut best_axis: XYZEnum = XYZEnum::X;
        let mut best_dist: Float = std::f32::INFINITY;
        let mut sign: Float = 1.0;
        for axis in [XYZEnum::X, XYZEnum::Y, XYZEnum::Z].iter() {
            let to_min: Float = (p[*axis] - self.bounds.p_min[*axis]).abs();
            let to_max: Float = (self.bounds.p_max[*axis] - p[*axis]).abs();
            if to_min < best_dist {
                best_dist = to_min;
                best_axis = *axis;
                sign = -1.0;
            }
            if to_max < best_dist {
                best_dist = to_max;
                best_axis = *axis;
                sign = 1.0;
            }
        }
        let mut n: Normal3f = Normal3f::default();
        match best_axis {
            XYZEnum::X => n.x = sign,
            XYZEnum::Y => n.y = sign,
            XYZEnum::Z => n.z = sign,
        }
        n
    }
}

impl Primitive for Cuboid {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }
    fn intersect(&self, ray: &Ray) -> Option<Hit> {
        // the hit distance must not depend on the segment length
        let mut unbounded: Ray = *ray;
        unbounded.t_max = std::f32::INFINITY;
        let (t0, t1) = self.bounds.intersect_b(&unbounded)?;
        // leave the box if the ray starts inside
        let t_hit: Float = if t0 > 0.0 { t0 } else { t1 };
        if !(t_hit > 0.0) || t_hit > ray.t_max {
            return None;
        }
        let p: Point3f = ray.position(t_hit);
        Some(Hit::new(t_hit, p, self.face_normal(&p)))
    }
}

/// `n`³ unit cubes on a regular grid, `spacing` apart along each
/// axis, starting at the origin. Cube `(i, j, k)` has index
/// `(i * n + j) * n + k` where `i` counts along x.
pub fn cube_grid(n: usize, spacing: Float) -> Vec<Cuboid> {
    let mut cubes: Vec<Cuboid> = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let p_min: Point3f = Point3f::new(
                    i as Float * spacing,
                    j as Float * spacing,
                    k as Float * spacing,
                );
                let p_max: Point3f = Point3f::new(p_min.x + 1.0, p_min.y + 1.0, p_min.z + 1.0);
                cubes.push(Cuboid::new(Bounds3f::new(p_min, p_max)));
            }
        }
    }
    cubes
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::geometry::Vector3f;

    fn unit_cube() -> Cuboid {
        Cuboid::new(Bounds3f::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 1.0),
        ))
    }

    #[test]
    fn hit_from_outside_reports_entry() {
        let ray = Ray::new(Point3f::new(0.5, 0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        let hit = unit_cube().intersect(&ray).unwrap();
        assert_eq!(hit.t_hit, 5.0);
        assert_eq!(hit.p, Point3f::new(0.5, 0.5, 0.0));
        assert_eq!(hit.n, Normal3f { x: 0.0, y: 0.0, z: -1.0 });
        assert_eq!(hit.prim_num, None);
    }

    #[test]
    fn hit_from_inside_reports_exit() {
        let ray = Ray::new(Point3f::new(0.5, 0.5, 0.25), Vector3f::new(1.0, 0.0, 0.0));
        let hit = unit_cube().intersect(&ray).unwrap();
        assert_eq!(hit.t_hit, 0.5);
        assert_eq!(hit.n.x, 1.0);
    }

    #[test]
    fn segment_too_short() {
        let mut ray = Ray::new(Point3f::new(0.5, 0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        ray.t_max = 4.5;
        assert!(unit_cube().intersect(&ray).is_none());
        assert!(!unit_cube().intersect_p(&ray));
    }

    #[test]
    fn grid_indices() {
        let cubes = cube_grid(3, 2.0);
        assert_eq!(cubes.len(), 27);
        // (1, 0, 2)
        assert_eq!(cubes[11].bounds.p_min, Point3f::new(2.0, 0.0, 4.0));
        assert_eq!(cubes[26].bounds.p_max, Point3f::new(5.0, 5.0, 5.0));
    }
}
