//! Triangle meshes.
//!
//! A **TriangleMesh** stores the vertex positions once and three
//! vertex indices per triangle. Each **Triangle** is a primitive of
//! its own which refers to the shared mesh.
//!
//! The intersection test is watertight: the ray is transformed so
//! that it starts at the origin and points along +z, then the edge
//! functions are evaluated in 2D. Rays through a shared edge or
//! vertex hit at least one of the adjacent triangles.

// std
use std::mem;
use std::sync::Arc;
// rs_accel
use crate::core::geometry::{
    bnd3_union_pnt3f, pnt3_permutef, vec3_cross_vec3, vec3_max_componentf, vec3_max_dimensionf,
    vec3_permutef, Bounds3f, Normal3f, Point3f, Ray, Vector3f,
};
use crate::core::interaction::Hit;
use crate::core::pbrt::{gamma, Float};
use crate::core::primitive::Primitive;

#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub n_triangles: usize,
    pub vertex_indices: Vec<u32>,
    pub p: Vec<Point3f>,
}

impl TriangleMesh {
    pub fn new(vertex_indices: Vec<u32>, p: Vec<Point3f>) -> Self {
        TriangleMesh {
            n_triangles: vertex_indices.len() / 3,
            vertex_indices,
            p,
        }
    }
    /// The surface of a box, two triangles per face.
    pub fn from_bounds(bounds: &Bounds3f) -> Self {
        let p: Vec<Point3f> = (0..8_u8).map(|c| bounds.corner(c)).collect();
        // corners: bit 0 = x, bit 1 = y, bit 2 = z
        let vertex_indices: Vec<u32> = vec![
            0, 2, 6, 0, 6, 4, // x min
            1, 5, 7, 1, 7, 3, // x max
            0, 4, 5, 0, 5, 1, // y min
            2, 3, 7, 2, 7, 6, // y max
            0, 1, 3, 0, 3, 2, // z min
            4, 6, 7, 4, 7, 5, // z max
        ];
        TriangleMesh::new(vertex_indices, p)
    }
}

#[derive(Debug, Clone)]
pub struct Triangle {
    pub mesh: Arc<TriangleMesh>,
    pub id: usize,
}

impl Triangle {
    pub fn new(mesh: Arc<TriangleMesh>, id: usize) -> Self {
        Triangle { mesh, id }
    }
    fn vertices(&self) -> (Point3f, Point3f, Point3f) {
        let vi: &[u32] = &self.mesh.vertex_indices[self.id * 3..self.id * 3 + 3];
        (
            self.mesh.p[vi[0] as usize],
            self.mesh.p[vi[1] as usize],
            self.mesh.p[vi[2] as usize],
        )
    }
}

/// One **Triangle** per index triple of the mesh.
pub fn create_triangle_mesh(mesh: Arc<TriangleMesh>) -> Vec<Triangle> {
    (0..mesh.n_triangles)
        .map(|id| Triangle::new(mesh.clone(), id))
        .collect()
}

impl Primitive for Triangle {
    fn world_bound(&self) -> Bounds3f {
        let (p0, p1, p2) = self.vertices();
        bnd3_union_pnt3f(&Bounds3f::new(p0, p1), &p2)
    }
    fn intersect(&self, ray: &Ray) -> Option<Hit> {
        // get triangle vertices in _p0_, _p1_, and _p2_
        let (p0, p1, p2) = self.vertices();
        // translate vertices based on ray origin
        let o: Vector3f = Vector3f::from(ray.o);
        let mut p0t: Point3f = p0 - o;
        let mut p1t: Point3f = p1 - o;
        let mut p2t: Point3f = p2 - o;
        // permute components of triangle vertices and ray direction
        let kz: usize = vec3_max_dimensionf(&ray.d.abs());
        let kx: usize = (kz + 1) % 3;
        let ky: usize = (kx + 1) % 3;
        let d: Vector3f = vec3_permutef(&ray.d, kx, ky, kz);
        p0t = pnt3_permutef(&p0t, kx, ky, kz);
        p1t = pnt3_permutef(&p1t, kx, ky, kz);
        p2t = pnt3_permutef(&p2t, kx, ky, kz);
        // apply shear transformation to translated vertex positions
        let sx: Float = -d.x / d.z;
        let sy: Float = -d.y / d.z;
        let sz: Float = 1.0 / d.z;
        p0t.x += sx * p0t.z;
        p0t.y += sy * p0t.z;
        p1t.x += sx * p1t.z;
        p1t.y += sy * p1t.z;
        p2t.x += sx * p2t.z;
        p2t.y += sy * p2t.z;
        // compute edge function coefficients _e0_, _e1_, and _e2_
        let mut e0: Float = p1t.x * p2t.y - p1t.y * p2t.x;
        let mut e1: Float = p2t.x * p0t.y - p2t.y * p0t.x;
        let mut e2: Float = p0t.x * p1t.y - p0t.y * p1t.x;
        // fall back to double precision test at triangle edges
        if mem::size_of::<Float>() == mem::size_of::<f32>() && (e0 == 0.0 || e1 == 0.0 || e2 == 0.0)
        {
            e0 = (p1t.x as f64 * p2t.y as f64 - p1t.y as f64 * p2t.x as f64) as Float;
            e1 = (p2t.x as f64 * p0t.y as f64 - p2t.y as f64 * p0t.x as f64) as Float;
            e2 = (p0t.x as f64 * p1t.y as f64 - p0t.y as f64 * p1t.x as f64) as Float;
        }
        // perform triangle edge and determinant tests
        if (e0 < 0.0 || e1 < 0.0 || e2 < 0.0) && (e0 > 0.0 || e1 > 0.0 || e2 > 0.0) {
            return None;
        }
        let det: Float = e0 + e1 + e2;
        if det == 0.0 {
            return None;
        }
        // compute scaled hit distance to triangle and test against ray $t$ range
        p0t.z *= sz;
        p1t.z *= sz;
        p2t.z *= sz;
        let t_scaled: Float = e0 * p0t.z + e1 * p1t.z + e2 * p2t.z;
        if det < 0.0 && (t_scaled >= 0.0 || t_scaled < ray.t_max * det) {
            return None;
        } else if det > 0.0 && (t_scaled <= 0.0 || t_scaled > ray.t_max * det) {
            return None;
        }
        let inv_det: Float = 1.0 / det;
        let t: Float = t_scaled * inv_det;
        // ensure that computed triangle $t$ is conservatively greater than zero
        let max_zt: Float = vec3_max_componentf(&Vector3f::new(p0t.z, p1t.z, p2t.z).abs());
        let delta_z: Float = gamma(3) * max_zt;
        let max_xt: Float = vec3_max_componentf(&Vector3f::new(p0t.x, p1t.x, p2t.x).abs());
        let max_yt: Float = vec3_max_componentf(&Vector3f::new(p0t.y, p1t.y, p2t.y).abs());
        let delta_x: Float = gamma(5) * (max_xt + max_zt);
        let delta_y: Float = gamma(5) * (max_yt + max_zt);
        let delta_e: Float =
            2.0 * (gamma(2) * max_xt * max_yt + delta_y * max_xt + delta_x * max_yt);
        let max_e: Float = vec3_max_componentf(&Vector3f::new(e0, e1, e2).abs());
        let delta_t: Float =
            3.0 * (gamma(3) * max_e * max_zt + delta_e * max_zt + delta_z * max_e) * inv_det.abs();
        if t <= delta_t {
            return None;
        }
        // interpolate the hit point from the barycentric coordinates
        let b0: Float = e0 * inv_det;
        let b1: Float = e1 * inv_det;
        let b2: Float = e2 * inv_det;
        let p_hit: Point3f = p0 * b0 + p1 * b1 + p2 * b2;
        let n: Normal3f = Normal3f::from(vec3_cross_vec3(&(p0 - p2), &(p1 - p2)).normalize());
        Some(Hit::new(t, p_hit, n))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn single() -> Vec<Triangle> {
        let mesh = TriangleMesh::new(
            vec![0, 1, 2],
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
        );
        create_triangle_mesh(Arc::new(mesh))
    }

    #[test]
    fn hit_inside_and_miss_outside() {
        let tris = single();
        assert_eq!(tris.len(), 1);
        let ray = Ray::new(Point3f::new(0.25, 0.25, 2.0), Vector3f::new(0.0, 0.0, -1.0));
        let hit = tris[0].intersect(&ray).unwrap();
        assert!((hit.t_hit - 2.0).abs() < 1e-6);
        assert!((hit.p.x - 0.25).abs() < 1e-6);
        assert!((hit.n.z.abs() - 1.0).abs() < 1e-6);
        let ray = Ray::new(Point3f::new(0.75, 0.75, 2.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(tris[0].intersect(&ray).is_none());
        // pointing away
        let ray = Ray::new(Point3f::new(0.25, 0.25, 2.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(tris[0].intersect(&ray).is_none());
    }

    #[test]
    fn bounds_of_a_triangle() {
        let b = single()[0].world_bound();
        assert_eq!(b.p_min, Point3f::new(0.0, 0.0, 0.0));
        assert_eq!(b.p_max, Point3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn box_mesh_is_closed() {
        let bounds = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
        let tris = create_triangle_mesh(Arc::new(TriangleMesh::from_bounds(&bounds)));
        assert_eq!(tris.len(), 12);
        // through the shared diagonal of the z min face
        let ray = Ray::new(Point3f::new(0.5, 0.5, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        let hits: Vec<Float> = tris
            .iter()
            .filter_map(|t| t.intersect(&ray))
            .map(|h| h.t_hit)
            .collect();
        assert!(hits.iter().any(|&t| (t - 1.0).abs() < 1e-6));
        assert!(hits.iter().any(|&t| (t - 2.0).abs() < 1e-6));
    }
}
