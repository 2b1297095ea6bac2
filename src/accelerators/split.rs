//! Split policies.
//!
//! The *spatial median* policy cuts a node in the middle: kd-trees
//! cycle through the axes (X at the root), octrees split at the
//! center of the node's box.
//!
//! The *surface area heuristic* (SAH) estimates the cost of tracing a
//! random ray through a candidate split,
//!
//! ```text
//! cost = trav_cost + isect_cost / SA(node) * (n_below * SA(below) + n_above * SA(above))
//! ```
//!
//! and compares it to the cost of a leaf, `isect_cost * n_prims`. A
//! split is only taken if it is strictly cheaper. For kd-trees the
//! candidates are the bounding box edges of all primitives, kept in
//! three sorted *edge lists* per node. Lists are sorted once for the
//! root and afterwards only filtered into the children, which keeps
//! their order without sorting again.

// std
use std::cmp::Ordering;
// others
use log::warn;
use strum::IntoEnumIterator;
// rs_accel
use crate::core::geometry::{bnd3_overlaps_bnd3, Bounds3f, Point3f, XYZEnum};
use crate::core::paramset::ParamSet;
use crate::core::pbrt::{clamp_t, log_2_int_u32, Float};

/// Hard depth limit for octrees, larger configured depths are
/// clamped to it.
pub const OCT_MAX_DEPTH: u32 = 6;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SplitMethod {
    SAH,
    Middle,
}

/// Builder configuration shared by all tree flavours.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AccelConfig {
    /// nodes with at most this many primitives become leaves
    pub max_leaf_size: u32,
    /// nodes at this depth become leaves (the root has depth zero)
    pub max_depth: u32,
    /// kd-tree split policy, octrees ignore it
    pub split_method: SplitMethod,
    pub isect_cost: Float,
    pub trav_cost: Float,
}

impl Default for AccelConfig {
    fn default() -> Self {
        AccelConfig {
            max_leaf_size: 1,
            max_depth: 16,
            split_method: SplitMethod::SAH,
            isect_cost: 80.0 as Float,
            trav_cost: 1.0 as Float,
        }
    }
}

impl AccelConfig {
    /// Depth limit which grows with the logarithm of the scene size.
    pub fn default_max_depth(n_prims: usize) -> u32 {
        let n: u32 = n_prims.max(1).min(std::u32::MAX as usize) as u32;
        (8.0 as Float + 1.3 as Float * log_2_int_u32(n) as Float).round() as u32
    }
    /// Octree depth limit. Eight children per level and objects
    /// copied into every octant they touch make deep octrees explode
    /// where objects overlap, so this grows with log8 of the scene
    /// size and never exceeds **OCT_MAX_DEPTH**.
    pub fn default_octree_max_depth(n_prims: usize) -> u32 {
        let n: u32 = n_prims.max(1).min(std::u32::MAX as usize) as u32;
        (1 + log_2_int_u32(n) as u32 / 3).min(OCT_MAX_DEPTH)
    }
    /// Read the configuration for a kd-tree.
    pub fn from_params(ps: &ParamSet, n_prims: usize) -> Self {
        AccelConfig::with_params(ps, AccelConfig::default_max_depth(n_prims))
    }
    /// Read the configuration for an octree, only the depth default
    /// differs.
    pub fn octree_from_params(ps: &ParamSet, n_prims: usize) -> Self {
        AccelConfig::with_params(ps, AccelConfig::default_octree_max_depth(n_prims))
    }
    fn with_params(ps: &ParamSet, default_max_depth: u32) -> Self {
        let defaults: AccelConfig = AccelConfig::default();
        let mut isect_cost: Float = ps.find_one_float("intersectcost", defaults.isect_cost);
        let mut trav_cost: Float = ps.find_one_float("traversalcost", defaults.trav_cost);
        let max_prims: i32 = ps.find_one_int("maxprims", defaults.max_leaf_size as i32);
        let max_depth: i32 = ps.find_one_int("maxdepth", -1);
        let split_method_name: String =
            ps.find_one_string("splitmethod", String::from("sah"));
        let split_method: SplitMethod = if split_method_name == "sah" {
            SplitMethod::SAH
        } else if split_method_name == "middle" {
            SplitMethod::Middle
        } else {
            warn!(
                "Split method \"{}\" unknown.  Using \"sah\".",
                split_method_name
            );
            SplitMethod::SAH
        };
        if !(isect_cost > 0.0) {
            warn!(
                "\"intersectcost\" must be positive, got {}.  Using {}.",
                isect_cost, defaults.isect_cost
            );
            isect_cost = defaults.isect_cost;
        }
        if !(trav_cost > 0.0) {
            warn!(
                "\"traversalcost\" must be positive, got {}.  Using {}.",
                trav_cost, defaults.trav_cost
            );
            trav_cost = defaults.trav_cost;
        }
        AccelConfig {
            max_leaf_size: max_prims.max(0) as u32,
            max_depth: if max_depth <= 0 {
                default_max_depth
            } else {
                max_depth as u32
            },
            split_method,
            isect_cost,
            trav_cost,
        }
    }
}

/// Where a kd-tree node is cut.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KdSplit {
    pub axis: XYZEnum,
    pub value: Float,
}

/// Spatial median for kd-trees: round robin over the axes, starting
/// with X at the root.
pub fn median_split(bounds: &Bounds3f, depth: u32) -> KdSplit {
    let axis: XYZEnum = XYZEnum::from_axis((depth % 3) as u8);
    KdSplit {
        axis,
        value: bounds.center()[axis],
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeType {
    Start = 0,
    End = 1,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundEdge {
    pub t: Float,
    pub prim_num: u32,
    pub edge_type: EdgeType,
}

impl BoundEdge {
    pub fn new(t: Float, prim_num: u32, starting: bool) -> Self {
        let edge_type: EdgeType = if starting {
            EdgeType::Start
        } else {
            EdgeType::End
        };
        BoundEdge {
            t,
            prim_num,
            edge_type,
        }
    }
}

/// Strict total order on edges: position, then start before end,
/// then primitive number.
fn edge_order(e0: &BoundEdge, e1: &BoundEdge) -> Ordering {
    e0.t
        .partial_cmp(&e1.t)
        .unwrap_or(Ordering::Equal)
        .then(e0.edge_type.cmp(&e1.edge_type))
        .then(e0.prim_num.cmp(&e1.prim_num))
}

fn sorted_edges(axis: XYZEnum, prim_bounds: &[Bounds3f], objects: &[u32]) -> Vec<BoundEdge> {
    let mut edges: Vec<BoundEdge> = Vec::with_capacity(2 * objects.len());
    for &pn in objects {
        let bounds: &Bounds3f = &prim_bounds[pn as usize];
        edges.push(BoundEdge::new(bounds.p_min[axis], pn, true));
        edges.push(BoundEdge::new(bounds.p_max[axis], pn, false));
    }
    edges.sort_by(edge_order);
    edges
}

/// The three sorted edge lists of one kd-tree node. Owned by exactly
/// one work node and moved into its children by **split()**.
#[derive(Debug, Clone, Default)]
pub struct EdgeLists {
    pub edges: [Vec<BoundEdge>; 3],
}

impl EdgeLists {
    pub fn new(prim_bounds: &[Bounds3f], objects: &[u32]) -> Self {
        EdgeLists {
            edges: [
                sorted_edges(XYZEnum::X, prim_bounds, objects),
                sorted_edges(XYZEnum::Y, prim_bounds, objects),
                sorted_edges(XYZEnum::Z, prim_bounds, objects),
            ],
        }
    }
    /// Number of primitives the lists describe.
    pub fn n_prims(&self) -> usize {
        self.edges[0].len() / 2
    }
    /// Redistribute into the two children of a split. A primitive goes
    /// below if it starts at or before the split value and above if it
    /// ends at or after it, so straddling primitives end up in both.
    pub fn split(self, split: &KdSplit, prim_bounds: &[Bounds3f]) -> (EdgeLists, EdgeLists) {
        let axis: XYZEnum = split.axis;
        let mut below: EdgeLists = EdgeLists::default();
        let mut above: EdgeLists = EdgeLists::default();
        for (i, edges) in self.edges.iter().enumerate() {
            below.edges[i] = edges
                .iter()
                .filter(|e| prim_bounds[e.prim_num as usize].p_min[axis] <= split.value)
                .cloned()
                .collect();
            above.edges[i] = edges
                .iter()
                .filter(|e| prim_bounds[e.prim_num as usize].p_max[axis] >= split.value)
                .cloned()
                .collect();
        }
        (below, above)
    }
    /// Sweep all three axes and return the cheapest split, or `None`
    /// if no split is cheaper than making this node a leaf.
    pub fn sah_split(&self, bounds: &Bounds3f, config: &AccelConfig) -> Option<KdSplit> {
        let total_sa: Float = bounds.surface_area();
        if !(total_sa > 0.0) {
            return None;
        }
        let inv_total_sa: Float = 1.0 as Float / total_sa;
        let n_prims: usize = self.n_prims();
        let mut best: Option<KdSplit> = None;
        let mut best_cost: Float = std::f32::INFINITY;
        for axis in XYZEnum::iter() {
            let mut n_below: usize = 0;
            let mut n_above: usize = n_prims;
            for edge in &self.edges[axis as usize] {
                if edge.edge_type == EdgeType::End {
                    n_above -= 1;
                }
                let t: Float = edge.t;
                if t > bounds.p_min[axis] && t < bounds.p_max[axis] {
                    // compute cost for split at _i_th edge
                    let (below, above) = bounds.split(axis, t);
                    let cost: Float = config.trav_cost
                        + config.isect_cost
                            * inv_total_sa
                            * (n_below as Float * below.surface_area()
                                + n_above as Float * above.surface_area());
                    if cost < best_cost {
                        best_cost = cost;
                        best = Some(KdSplit { axis, value: t });
                    }
                }
                if edge.edge_type == EdgeType::Start {
                    n_below += 1;
                }
            }
            debug_assert!(n_below == n_prims && n_above == 0);
        }
        let leaf_cost: Float = config.isect_cost * n_prims as Float;
        if best_cost < leaf_cost {
            best
        } else {
            None
        }
    }
}

/// Best position along one axis for a two-way cut, using the bounds
/// of the node's primitives as candidates. `None` if no candidate lies
/// strictly inside the node.
fn sah_axis_position(
    axis: XYZEnum,
    bounds: &Bounds3f,
    objects: &[u32],
    prim_bounds: &[Bounds3f],
) -> Option<Float> {
    let edges: Vec<BoundEdge> = sorted_edges(axis, prim_bounds, objects);
    let mut n_below: usize = 0;
    let mut n_above: usize = objects.len();
    let mut best: Option<Float> = None;
    let mut best_cost: Float = std::f32::INFINITY;
    for edge in &edges {
        if edge.edge_type == EdgeType::End {
            n_above -= 1;
        }
        if edge.t > bounds.p_min[axis] && edge.t < bounds.p_max[axis] {
            let (below, above) = bounds.split(axis, edge.t);
            let cost: Float = n_below as Float * below.surface_area()
                + n_above as Float * above.surface_area();
            if cost < best_cost {
                best_cost = cost;
                best = Some(edge.t);
            }
        }
        if edge.edge_type == EdgeType::Start {
            n_below += 1;
        }
    }
    best
}

/// Split point for a SAH octree node, or `None` if splitting into
/// octants is not cheaper than a leaf.
pub fn sah_split_point(
    bounds: &Bounds3f,
    objects: &[u32],
    prim_bounds: &[Bounds3f],
    config: &AccelConfig,
) -> Option<Point3f> {
    let total_sa: Float = bounds.surface_area();
    if !(total_sa > 0.0) {
        return None;
    }
    let inv_total_sa: Float = 1.0 as Float / total_sa;
    let mut split: Point3f = bounds.center();
    for axis in XYZEnum::iter() {
        if let Some(t) = sah_axis_position(axis, bounds, objects, prim_bounds) {
            split[axis] = clamp_t(t, bounds.p_min[axis], bounds.p_max[axis]);
        }
    }
    let mut cost: Float = config.trav_cost;
    for octant in 0..8_u8 {
        let child: Bounds3f = bounds.octant(&split, octant);
        let n: usize = objects
            .iter()
            .filter(|&&o| bnd3_overlaps_bnd3(&prim_bounds[o as usize], &child))
            .count();
        cost += config.isect_cost * inv_total_sa * n as Float * child.surface_area();
    }
    let leaf_cost: Float = config.isect_cost * objects.len() as Float;
    if cost < leaf_cost {
        Some(split)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cube(x: Float, y: Float, z: Float) -> Bounds3f {
        Bounds3f::new(Point3f::new(x, y, z), Point3f::new(x + 1.0, y + 1.0, z + 1.0))
    }

    fn row(n: usize) -> Vec<Bounds3f> {
        (0..n).map(|i| cube(2.0 * i as Float, 0.0, 0.0)).collect()
    }

    fn union(prim_bounds: &[Bounds3f]) -> Bounds3f {
        prim_bounds
            .iter()
            .fold(Bounds3f::default(), |b, p| crate::core::geometry::bnd3_union_bnd3f(&b, p))
    }

    #[test]
    fn edges_are_sorted_with_tie_breaks() {
        // two boxes sharing the plane x = 1
        let prim_bounds = vec![cube(0.0, 0.0, 0.0), cube(1.0, 0.0, 0.0), cube(0.0, 0.0, 0.0)];
        let lists = EdgeLists::new(&prim_bounds, &[0, 1, 2]);
        let x: Vec<(Float, EdgeType, u32)> = lists.edges[0]
            .iter()
            .map(|e| (e.t, e.edge_type, e.prim_num))
            .collect();
        assert_eq!(
            x,
            vec![
                (0.0, EdgeType::Start, 0),
                (0.0, EdgeType::Start, 2),
                (1.0, EdgeType::Start, 1),
                (1.0, EdgeType::End, 0),
                (1.0, EdgeType::End, 2),
                (2.0, EdgeType::End, 1),
            ]
        );
        assert_eq!(lists.n_prims(), 3);
    }

    #[test]
    fn split_keeps_order_and_duplicates_straddlers() {
        let mut prim_bounds = row(4);
        // straddles x = 3.75
        prim_bounds.push(Bounds3f::new(
            Point3f::new(3.5, 0.0, 0.0),
            Point3f::new(4.5, 1.0, 1.0),
        ));
        let objects: Vec<u32> = (0..5).collect();
        let lists = EdgeLists::new(&prim_bounds, &objects);
        let split = KdSplit {
            axis: XYZEnum::X,
            value: 3.75,
        };
        let (below, above) = lists.split(&split, &prim_bounds);
        assert_eq!(below.n_prims(), 3);
        assert_eq!(above.n_prims(), 3);
        for lists in [&below, &above].iter() {
            for edges in lists.edges.iter() {
                assert_eq!(edges.len(), 2 * lists.n_prims());
                for pair in edges.windows(2) {
                    assert_ne!(edge_order(&pair[0], &pair[1]), Ordering::Greater);
                }
            }
        }
        // the sorted lists of a child match sorting from scratch
        let fresh = EdgeLists::new(&prim_bounds, &[2, 3, 4]);
        assert_eq!(above.edges[1], fresh.edges[1]);
    }

    #[test]
    fn sah_separates_distant_clusters() {
        let mut prim_bounds: Vec<Bounds3f> = (0..4).map(|i| cube(i as Float * 0.1, 0.0, 0.0)).collect();
        prim_bounds.extend((0..4).map(|i| cube(100.0 + i as Float * 0.1, 0.0, 0.0)));
        let objects: Vec<u32> = (0..8).collect();
        let bounds = union(&prim_bounds);
        let lists = EdgeLists::new(&prim_bounds, &objects);
        let split = lists.sah_split(&bounds, &AccelConfig::default()).unwrap();
        assert_eq!(split.axis, XYZEnum::X);
        assert!(split.value >= 1.3 && split.value <= 100.0, "{:?}", split);
    }

    #[test]
    fn sah_refuses_identical_primitives() {
        let prim_bounds = vec![cube(0.0, 0.0, 0.0); 16];
        let objects: Vec<u32> = (0..16).collect();
        let lists = EdgeLists::new(&prim_bounds, &objects);
        assert!(lists
            .sah_split(&union(&prim_bounds), &AccelConfig::default())
            .is_none());
    }

    #[test]
    fn sah_refuses_with_infinite_intersection_cost() {
        let prim_bounds = row(32);
        let objects: Vec<u32> = (0..32).collect();
        let lists = EdgeLists::new(&prim_bounds, &objects);
        let mut config = AccelConfig::default();
        assert!(lists.sah_split(&union(&prim_bounds), &config).is_some());
        config.isect_cost = std::f32::INFINITY;
        assert!(lists.sah_split(&union(&prim_bounds), &config).is_none());
        assert!(sah_split_point(&union(&prim_bounds), &objects, &prim_bounds, &config).is_none());
    }

    #[test]
    fn median_split_cycles_axes() {
        let bounds = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(2.0, 4.0, 6.0));
        assert_eq!(
            median_split(&bounds, 0),
            KdSplit {
                axis: XYZEnum::X,
                value: 1.0
            }
        );
        assert_eq!(median_split(&bounds, 1).axis, XYZEnum::Y);
        assert_eq!(median_split(&bounds, 2).value, 3.0);
        assert_eq!(median_split(&bounds, 3).axis, XYZEnum::X);
    }

    #[test]
    fn sah_split_point_moves_towards_clusters() {
        // a dense cluster in one corner of a large box
        let mut prim_bounds: Vec<Bounds3f> = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    prim_bounds.push(cube(i as Float, j as Float, k as Float));
                }
            }
        }
        prim_bounds.push(cube(99.0, 99.0, 99.0));
        let objects: Vec<u32> = (0..prim_bounds.len() as u32).collect();
        let bounds = union(&prim_bounds);
        let split = sah_split_point(&bounds, &objects, &prim_bounds, &AccelConfig::default()).unwrap();
        assert!(split.x < 50.0 && split.y < 50.0 && split.z < 50.0, "{:?}", split);
    }

    #[test]
    fn config_from_params() {
        let mut ps = ParamSet::default();
        let config = AccelConfig::from_params(&ps, 1000);
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.split_method, SplitMethod::SAH);
        ps.add_string(String::from("splitmethod"), String::from("middle"));
        ps.add_int(String::from("maxprims"), 8);
        ps.add_int(String::from("maxdepth"), 12);
        ps.add_float(String::from("intersectcost"), -1.0);
        let config = AccelConfig::from_params(&ps, 1000);
        assert_eq!(config.split_method, SplitMethod::Middle);
        assert_eq!(config.max_leaf_size, 8);
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.isect_cost, 80.0);
        assert!(ps.unused().is_empty());
    }

    #[test]
    fn octree_depth_grows_slowly() {
        assert_eq!(AccelConfig::default_octree_max_depth(0), 1);
        assert_eq!(AccelConfig::default_octree_max_depth(2), 1);
        assert_eq!(AccelConfig::default_octree_max_depth(1000), 4);
        assert_eq!(AccelConfig::default_octree_max_depth(12_000), 5);
        assert_eq!(AccelConfig::default_octree_max_depth(std::u32::MAX as usize), OCT_MAX_DEPTH);
        let mut ps = ParamSet::default();
        assert_eq!(AccelConfig::octree_from_params(&ps, 1000).max_depth, 4);
        ps.add_int(String::from("maxdepth"), 3);
        assert_eq!(AccelConfig::octree_from_params(&ps, 1000).max_depth, 3);
    }
}
