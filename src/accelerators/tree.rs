//! Generic tree accelerator.
//!
//! The kd-tree and the octree variants share one breadth-first
//! builder and one recursive traversal. What differs between them is
//! captured by the **TreeFlavor** trait: how a split is chosen, which
//! child boxes a split produces, and how a child's box is recovered
//! from its parent during traversal.
//!
//! Nodes are stored in level order. A node's slot is reserved with a
//! placeholder (an empty leaf) when its parent is expanded and is
//! overwritten once the node itself is expanded, because the offset
//! of its first child is only known at that point. Children of one
//! node are contiguous, and so are the primitive references of one
//! leaf.
//!
//! All work nodes of one level are expanded in parallel. The
//! expansions are then appended in the original sibling order, so the
//! result does not depend on the number of threads.

// std
use std::fmt;
use std::fmt::Debug;
use std::time::Instant;
// others
use log::{debug, info, log_enabled, Level};
use rayon::prelude::*;
use smallvec::SmallVec;
// rs_accel
use crate::accelerators::node::{NodeCodec, TreeNode};
use crate::accelerators::split::AccelConfig;
use crate::core::error::{check_range, Result};
use crate::core::geometry::{bnd3_overlaps_bnd3, bnd3_union_bnd3f, Bounds3f, Ray};
use crate::core::interaction::Hit;
use crate::core::pbrt::Float;
use crate::core::primitive::Primitive;

/// Logical node type of a flavour.
pub type FlavorNode<F> = <<F as TreeFlavor>::Codec as NodeCodec>::Node;
/// Encoded node type of a flavour.
pub type FlavorEncoded<F> = <<F as TreeFlavor>::Codec as NodeCodec>::Encoded;

/// A child box a ray enters, found while visiting its parent.
#[derive(Debug, Copy, Clone)]
pub struct ChildHit {
    pub node_num: u32,
    pub slot: u8,
    pub bounds: Bounds3f,
    pub t_near: Float,
}

/// Order children by ascending entry distance. The sort is stable, so
/// equal distances keep their sibling order.
pub fn sort_by_t_near(children: &mut [ChildHit]) {
    children.sort_by(|a, b| {
        a.t_near
            .partial_cmp(&b.t_near)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// What a tree variant has to provide to the shared builder and
/// traversal.
pub trait TreeFlavor: Sync {
    type Codec: NodeCodec;
    /// Split decided for an interior node.
    type Split: Copy + Debug + Send + Sync;
    /// Per work node build state handed down from parent to children.
    type Scratch: Send;

    fn name(&self) -> &'static str;
    fn config(&self) -> &AccelConfig;
    fn create_leaf(&self, slot: u8) -> FlavorNode<Self>;
    fn create_internal(&self, slot: u8, split: &Self::Split) -> FlavorNode<Self>;
    fn root_scratch(&self, prim_bounds: &[Bounds3f], objects: &[u32]) -> Self::Scratch;
    /// Pick a split or return `None` to make the node a leaf. Only
    /// called for nodes which are above the leaf size and depth limits.
    fn choose_split(
        &self,
        bounds: &Bounds3f,
        depth: u32,
        objects: &[u32],
        prim_bounds: &[Bounds3f],
        scratch: &Self::Scratch,
    ) -> Option<Self::Split>;
    /// All candidate children of a split in sibling order.
    fn candidate_children(
        &self,
        bounds: &Bounds3f,
        split: &Self::Split,
    ) -> SmallVec<[(u8, Bounds3f); 8]>;
    /// Hand the parent's scratch down, one entry per candidate child.
    fn split_scratch(
        &self,
        scratch: Self::Scratch,
        split: &Self::Split,
        prim_bounds: &[Bounds3f],
    ) -> SmallVec<[Self::Scratch; 8]>;
    /// Recover the box of the child in `slot` from its parent.
    fn child_bounds(&self, parent: &FlavorNode<Self>, parent_bounds: &Bounds3f, slot: u8)
        -> Bounds3f;
    /// Order the children a ray enters, nearest first.
    fn order_children(
        &self,
        _parent: &FlavorNode<Self>,
        _ray: &Ray,
        children: &mut SmallVec<[ChildHit; 8]>,
    ) {
        sort_by_t_near(children);
    }
}

struct WorkNode<F: TreeFlavor> {
    node_num: u32,
    slot: u8,
    depth: u32,
    bounds: Bounds3f,
    objects: Vec<u32>,
    split: Option<F::Split>,
    scratch: F::Scratch,
}

struct ChildWork<F: TreeFlavor> {
    slot: u8,
    depth: u32,
    bounds: Bounds3f,
    objects: Vec<u32>,
    split: Option<F::Split>,
    scratch: F::Scratch,
}

enum Expansion<F: TreeFlavor> {
    Leaf {
        node_num: u32,
        slot: u8,
        objects: Vec<u32>,
    },
    Interior {
        node_num: u32,
        slot: u8,
        split: F::Split,
        children: Vec<ChildWork<F>>,
    },
}

fn decide_split<F: TreeFlavor>(
    flavor: &F,
    bounds: &Bounds3f,
    depth: u32,
    objects: &[u32],
    prim_bounds: &[Bounds3f],
    scratch: &F::Scratch,
) -> Option<F::Split> {
    let config: &AccelConfig = flavor.config();
    if objects.len() <= config.max_leaf_size as usize || depth >= config.max_depth {
        return None;
    }
    flavor.choose_split(bounds, depth, objects, prim_bounds, scratch)
}

fn expand<F: TreeFlavor>(flavor: &F, work: WorkNode<F>, prim_bounds: &[Bounds3f]) -> Expansion<F> {
    let split: F::Split = match work.split {
        Some(split) => split,
        None => {
            return Expansion::Leaf {
                node_num: work.node_num,
                slot: work.slot,
                objects: work.objects,
            }
        }
    };
    let candidates = flavor.candidate_children(&work.bounds, &split);
    let scratches = flavor.split_scratch(work.scratch, &split, prim_bounds);
    let depth: u32 = work.depth + 1;
    let mut children: Vec<ChildWork<F>> = Vec::with_capacity(candidates.len());
    for ((slot, bounds), scratch) in candidates.into_iter().zip(scratches.into_iter()) {
        let objects: Vec<u32> = work
            .objects
            .iter()
            .cloned()
            .filter(|&o| bnd3_overlaps_bnd3(&prim_bounds[o as usize], &bounds))
            .collect();
        // empty children are never stored
        if objects.is_empty() {
            continue;
        }
        let split: Option<F::Split> =
            decide_split(flavor, &bounds, depth, &objects, prim_bounds, &scratch);
        children.push(ChildWork {
            slot,
            depth,
            bounds,
            objects,
            split,
            scratch,
        });
    }
    if children.is_empty() {
        // only happens for primitives with NaN bounds
        Expansion::Leaf {
            node_num: work.node_num,
            slot: work.slot,
            objects: work.objects,
        }
    } else {
        Expansion::Interior {
            node_num: work.node_num,
            slot: work.slot,
            split,
            children,
        }
    }
}

/// Summary of a built tree.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub n_nodes: usize,
    pub n_internal: usize,
    pub n_leaves: usize,
    pub n_empty_leaves: usize,
    pub n_prim_refs: usize,
    pub max_leaf_prims: usize,
    pub max_depth: u32,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} interior, {} leaves, {} empty), {} primitive refs, at most {} per leaf, depth {}",
            self.n_nodes,
            self.n_internal,
            self.n_leaves,
            self.n_empty_leaves,
            self.n_prim_refs,
            self.max_leaf_prims,
            self.max_depth
        )
    }
}

/// A built, immutable tree over a borrowed slice of primitives.
pub struct AccelTree<'a, F: TreeFlavor, P> {
    pub flavor: F,
    pub primitives: &'a [P],
    pub nodes: Vec<FlavorEncoded<F>>,
    pub prim_refs: Vec<u32>,
    pub bounds: Bounds3f,
    pub n_internal: usize,
    pub n_leaves: usize,
}

impl<'a, F: TreeFlavor, P: Primitive> AccelTree<'a, F, P> {
    pub fn build(flavor: F, primitives: &'a [P]) -> Result<Self> {
        let start = Instant::now();
        check_range("primitives", primitives.len() as u64, std::u32::MAX as u64)?;
        // compute bounds for tree construction
        let mut bounds: Bounds3f = Bounds3f::default();
        let mut prim_bounds: Vec<Bounds3f> = Vec::with_capacity(primitives.len());
        for prim in primitives {
            let b: Bounds3f = prim.world_bound();
            bounds = bnd3_union_bnd3f(&bounds, &b);
            prim_bounds.push(b);
        }
        let objects: Vec<u32> = (0..primitives.len() as u32).collect();
        let scratch: F::Scratch = flavor.root_scratch(&prim_bounds, &objects);
        let split: Option<F::Split> =
            decide_split(&flavor, &bounds, 0, &objects, &prim_bounds, &scratch);
        let mut nodes: Vec<FlavorEncoded<F>> = Vec::new();
        let mut prim_refs: Vec<u32> = Vec::new();
        let mut n_internal: usize = 0;
        let mut n_leaves: usize = 0;
        nodes.push(F::Codec::encode(&flavor.create_leaf(0))?);
        let mut current_level: Vec<WorkNode<F>> = vec![WorkNode {
            node_num: 0,
            slot: 0,
            depth: 0,
            bounds,
            objects,
            split,
            scratch,
        }];
        let mut level: u32 = 0;
        while !current_level.is_empty() {
            debug!(
                "{}: level {} with {} node(s)",
                flavor.name(),
                level,
                current_level.len()
            );
            let expansions: Vec<Expansion<F>> = std::mem::replace(&mut current_level, Vec::new())
                .into_par_iter()
                .map(|work| expand(&flavor, work, &prim_bounds))
                .collect();
            let mut next_level: Vec<WorkNode<F>> = Vec::new();
            for expansion in expansions {
                match expansion {
                    Expansion::Leaf {
                        node_num,
                        slot,
                        objects,
                    } => {
                        check_range(
                            "primitive refs",
                            (prim_refs.len() + objects.len()) as u64,
                            std::u32::MAX as u64,
                        )?;
                        let mut node = flavor.create_leaf(slot);
                        node.init_leaf(prim_refs.len() as u32, objects.len() as u32);
                        nodes[node_num as usize] = F::Codec::encode(&node)?;
                        prim_refs.extend(objects);
                        n_leaves += 1;
                    }
                    Expansion::Interior {
                        node_num,
                        slot,
                        split,
                        children,
                    } => {
                        check_range(
                            "nodes",
                            (nodes.len() + children.len()) as u64,
                            std::u32::MAX as u64,
                        )?;
                        let first_child: u32 = nodes.len() as u32;
                        let n_children: u32 = children.len() as u32;
                        for child in children {
                            let child_num: u32 = nodes.len() as u32;
                            // placeholder, overwritten when the child is expanded
                            nodes.push(F::Codec::encode(&flavor.create_leaf(child.slot))?);
                            next_level.push(WorkNode {
                                node_num: child_num,
                                slot: child.slot,
                                depth: child.depth,
                                bounds: child.bounds,
                                objects: child.objects,
                                split: child.split,
                                scratch: child.scratch,
                            });
                        }
                        let mut node = flavor.create_internal(slot, &split);
                        node.init_interior(first_child, n_children);
                        nodes[node_num as usize] = F::Codec::encode(&node)?;
                        n_internal += 1;
                    }
                }
            }
            current_level = next_level;
            level += 1;
        }
        let tree = AccelTree {
            flavor,
            primitives,
            nodes,
            prim_refs,
            bounds,
            n_internal,
            n_leaves,
        };
        if log_enabled!(Level::Info) {
            info!(
                "{} over {} primitives built in {:?}: {}",
                tree.flavor.name(),
                primitives.len(),
                start.elapsed(),
                tree.stats()
            );
        }
        Ok(tree)
    }
    pub fn world_bound(&self) -> Bounds3f {
        self.bounds
    }
    /// Decoded node at `node_num`.
    pub fn node(&self, node_num: u32) -> FlavorNode<F> {
        F::Codec::decode(&self.nodes[node_num as usize])
    }
    /// Visit all nodes depth-first, parents before children, with
    /// their index, depth and bounds.
    pub fn walk<V>(&self, mut visitor: V)
    where
        V: FnMut(u32, &FlavorNode<F>, u32, &Bounds3f),
    {
        if self.nodes.is_empty() {
            return;
        }
        let mut todo: Vec<(u32, u32, Bounds3f)> = vec![(0, 0, self.bounds)];
        while let Some((node_num, depth, bounds)) = todo.pop() {
            let node: FlavorNode<F> = self.node(node_num);
            visitor(node_num, &node, depth, &bounds);
            if !node.is_leaf() {
                // push in reverse so the first child is visited first
                for i in (0..node.count()).rev() {
                    let child_num: u32 = node.offset() + i;
                    let child: FlavorNode<F> = self.node(child_num);
                    let child_bounds: Bounds3f =
                        self.flavor.child_bounds(&node, &bounds, child.slot());
                    todo.push((child_num, depth + 1, child_bounds));
                }
            }
        }
    }
    pub fn stats(&self) -> TreeStats {
        let mut stats: TreeStats = TreeStats::default();
        stats.n_prim_refs = self.prim_refs.len();
        self.walk(|_node_num, node, depth, _bounds| {
            stats.n_nodes += 1;
            stats.max_depth = stats.max_depth.max(depth);
            if node.is_leaf() {
                stats.n_leaves += 1;
                if node.count() == 0 {
                    stats.n_empty_leaves += 1;
                }
                stats.max_leaf_prims = stats.max_leaf_prims.max(node.count() as usize);
            } else {
                stats.n_internal += 1;
            }
        });
        stats
    }
    fn enter_children(
        &self,
        node: &FlavorNode<F>,
        bounds: &Bounds3f,
        ray: &Ray,
    ) -> SmallVec<[ChildHit; 8]> {
        let mut children: SmallVec<[ChildHit; 8]> = SmallVec::new();
        for i in 0..node.count() {
            let node_num: u32 = node.offset() + i;
            let slot: u8 = self.node(node_num).slot();
            let child_bounds: Bounds3f = self.flavor.child_bounds(node, bounds, slot);
            if let Some((t_near, _t_far)) = child_bounds.intersect_b(ray) {
                children.push(ChildHit {
                    node_num,
                    slot,
                    bounds: child_bounds,
                    t_near,
                });
            }
        }
        self.flavor.order_children(node, ray, &mut children);
        children
    }
    /// Nearest hit along the ray, with **Hit::prim_num** set to the
    /// index of the primitive in the slice the tree was built from.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut closest: Option<Hit> = None;
        self.intersect_node(0, &self.bounds, 0, ray, &mut closest);
        closest
    }
    fn intersect_node(
        &self,
        node_num: u32,
        bounds: &Bounds3f,
        depth: u32,
        ray: &Ray,
        closest: &mut Option<Hit>,
    ) {
        if depth > self.flavor.config().max_depth {
            return;
        }
        // nothing behind the closest hit found so far matters
        let mut segment: Ray = *ray;
        if let Some(hit) = *closest {
            segment.t_max = segment.t_max.min(hit.t_hit);
        }
        if bounds.intersect_b(&segment).is_none() {
            return;
        }
        let node: FlavorNode<F> = self.node(node_num);
        if node.is_leaf() {
            for i in 0..node.count() {
                let prim_num: usize = self.prim_refs[(node.offset() + i) as usize] as usize;
                if let Some(mut hit) = self.primitives[prim_num].intersect(&segment) {
                    let closer: bool = match *closest {
                        Some(best) => hit.t_hit < best.t_hit,
                        None => true,
                    };
                    if closer {
                        hit.prim_num = Some(prim_num);
                        segment.t_max = segment.t_max.min(hit.t_hit);
                        *closest = Some(hit);
                    }
                }
            }
            return;
        }
        for child in self.enter_children(&node, bounds, &segment) {
            if let Some(hit) = *closest {
                if child.t_near > hit.t_hit {
                    continue;
                }
            }
            self.intersect_node(child.node_num, &child.bounds, depth + 1, ray, closest);
        }
    }
    /// Is there any hit within `ray.t_max`?
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.intersect_p_node(0, &self.bounds, 0, ray)
    }
    fn intersect_p_node(&self, node_num: u32, bounds: &Bounds3f, depth: u32, ray: &Ray) -> bool {
        if depth > self.flavor.config().max_depth || bounds.intersect_b(ray).is_none() {
            return false;
        }
        let node: FlavorNode<F> = self.node(node_num);
        if node.is_leaf() {
            return (0..node.count()).any(|i| {
                let prim_num: usize = self.prim_refs[(node.offset() + i) as usize] as usize;
                self.primitives[prim_num].intersect_p(ray)
            });
        }
        self.enter_children(&node, bounds, ray)
            .iter()
            .any(|child| self.intersect_p_node(child.node_num, &child.bounds, depth + 1, ray))
    }
}

impl<'a, F: TreeFlavor, P: Primitive> Primitive for AccelTree<'a, F, P> {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }
    fn intersect(&self, ray: &Ray) -> Option<Hit> {
        AccelTree::intersect(self, ray)
    }
    fn intersect_p(&self, ray: &Ray) -> bool {
        AccelTree::intersect_p(self, ray)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::accelerators::kdtreeaccel::KdTreeAccel;
    use crate::accelerators::octree::{Octree64Accel, OctreeAccel, SahOctreeAccel};
    use crate::accelerators::split::SplitMethod;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::core::rng::Rng;
    use crate::shapes::cuboid::Cuboid;
    use crate::shapes::sphere::Sphere;

    fn random_cubes(n: usize, seed: u64) -> Vec<Cuboid> {
        let mut rng = Rng::with_sequence(seed);
        (0..n)
            .map(|_| {
                let p = Point3f::new(
                    rng.uniform_float_range(-10.0, 10.0),
                    rng.uniform_float_range(-10.0, 10.0),
                    rng.uniform_float_range(-10.0, 10.0),
                );
                let d = Vector3f::new(
                    rng.uniform_float_range(0.1, 2.0),
                    rng.uniform_float_range(0.1, 2.0),
                    rng.uniform_float_range(0.1, 2.0),
                );
                Cuboid::new(Bounds3f::new(p, p + d))
            })
            .collect()
    }

    fn random_rays(n: usize, seed: u64) -> Vec<Ray> {
        let mut rng = Rng::with_sequence(seed);
        (0..n)
            .map(|_| {
                let o = Point3f::new(
                    rng.uniform_float_range(-20.0, 20.0),
                    rng.uniform_float_range(-20.0, 20.0),
                    rng.uniform_float_range(-20.0, 20.0),
                );
                let target = Point3f::new(
                    rng.uniform_float_range(-8.0, 8.0),
                    rng.uniform_float_range(-8.0, 8.0),
                    rng.uniform_float_range(-8.0, 8.0),
                );
                Ray::new(o, (target - o).normalize())
            })
            .collect()
    }

    fn brute_force<P: Primitive>(prims: &[P], ray: &Ray) -> Option<Hit> {
        let mut closest: Option<Hit> = None;
        for (i, prim) in prims.iter().enumerate() {
            if let Some(mut hit) = prim.intersect(ray) {
                hit.prim_num = Some(i);
                closest = Some(match closest {
                    Some(best) => best.closest(hit),
                    None => hit,
                });
            }
        }
        closest
    }

    /// Level order, contiguous children, leaf size limit and leaf
    /// contiguity of the primitive references.
    fn check_layout<F: TreeFlavor, P: Primitive>(tree: &AccelTree<F, P>, median: bool) {
        let config: AccelConfig = *tree.flavor.config();
        let mut covered: Vec<bool> = vec![false; tree.prim_refs.len()];
        let mut n_visited: usize = 0;
        tree.walk(|node_num, node, depth, _bounds| {
            n_visited += 1;
            assert!(depth <= config.max_depth);
            if node.is_leaf() {
                if median {
                    assert!(
                        node.count() <= config.max_leaf_size || depth == config.max_depth,
                        "leaf {} with {} prims at depth {}",
                        node_num,
                        node.count(),
                        depth
                    );
                }
                for i in node.offset()..node.offset() + node.count() {
                    assert!(!covered[i as usize]);
                    covered[i as usize] = true;
                }
            } else {
                assert!(node.count() > 0);
                assert!(node.offset() > node_num);
                assert!(((node.offset() + node.count()) as usize) <= tree.nodes.len());
            }
        });
        assert_eq!(n_visited, tree.nodes.len());
        assert!(covered.iter().all(|&c| c));
        assert_eq!(tree.n_internal + tree.n_leaves, tree.nodes.len());
    }

    fn check_against_brute_force<F: TreeFlavor, P: Primitive>(tree: &AccelTree<F, P>, prims: &[P]) {
        for ray in random_rays(500, 7) {
            let expected = brute_force(prims, &ray);
            let got = tree.intersect(&ray);
            match (expected, got) {
                (None, None) => {}
                (Some(e), Some(g)) => {
                    assert!((e.t_hit - g.t_hit).abs() < 1e-5, "{:?} vs {:?}", e, g);
                }
                (e, g) => panic!("{:?}: expected {:?}, got {:?}", ray, e, g),
            }
            assert_eq!(expected.is_some(), tree.intersect_p(&ray));
        }
    }

    fn configs() -> Vec<AccelConfig> {
        let mut sah = AccelConfig::default();
        sah.max_leaf_size = 2;
        let mut middle = sah;
        middle.split_method = SplitMethod::Middle;
        middle.max_depth = 10;
        vec![sah, middle]
    }

    /// Octrees copy overlapping cubes into all octants, keep them shallow.
    fn octree_config(mut config: AccelConfig) -> AccelConfig {
        config.max_depth = 5;
        config
    }

    #[test]
    fn all_flavours_match_brute_force() {
        let prims = random_cubes(300, 1);
        for config in configs() {
            let median = config.split_method == SplitMethod::Middle;
            let kd = KdTreeAccel::new(&prims, config).unwrap();
            check_layout(&kd, median);
            check_against_brute_force(&kd, &prims);
            let oct = OctreeAccel::new(&prims, octree_config(config)).unwrap();
            check_layout(&oct, true);
            check_against_brute_force(&oct, &prims);
            let oct64 = Octree64Accel::new(&prims, octree_config(config)).unwrap();
            check_layout(&oct64, true);
            check_against_brute_force(&oct64, &prims);
            let sah_oct = SahOctreeAccel::new(&prims, octree_config(config)).unwrap();
            check_layout(&sah_oct, false);
            check_against_brute_force(&sah_oct, &prims);
        }
    }

    #[test]
    fn spheres_match_brute_force() {
        let mut rng = Rng::with_sequence(3);
        let prims: Vec<Sphere> = (0..200)
            .map(|_| {
                Sphere::new(
                    Point3f::new(
                        rng.uniform_float_range(-10.0, 10.0),
                        rng.uniform_float_range(-10.0, 10.0),
                        rng.uniform_float_range(-10.0, 10.0),
                    ),
                    rng.uniform_float_range(0.1, 1.5),
                )
            })
            .collect();
        let kd = KdTreeAccel::new(&prims, AccelConfig::default()).unwrap();
        check_layout(&kd, false);
        check_against_brute_force(&kd, &prims);
        let oct = SahOctreeAccel::new(&prims, octree_config(AccelConfig::default())).unwrap();
        check_against_brute_force(&oct, &prims);
    }

    #[test]
    fn queries_are_idempotent_and_thread_safe() {
        let prims = random_cubes(200, 2);
        let tree = KdTreeAccel::new(&prims, AccelConfig::default()).unwrap();
        let rays = random_rays(200, 11);
        let sequential: Vec<Option<Hit>> = rays.iter().map(|r| tree.intersect(r)).collect();
        let again: Vec<Option<Hit>> = rays.iter().map(|r| tree.intersect(r)).collect();
        let parallel: Vec<Option<Hit>> = rays.par_iter().map(|r| tree.intersect(r)).collect();
        for ((a, b), c) in sequential.iter().zip(again.iter()).zip(parallel.iter()) {
            assert_eq!(a.map(|h| (h.t_hit, h.prim_num)), b.map(|h| (h.t_hit, h.prim_num)));
            assert_eq!(a.map(|h| (h.t_hit, h.prim_num)), c.map(|h| (h.t_hit, h.prim_num)));
        }
    }

    #[test]
    fn build_does_not_depend_on_thread_count() {
        let prims = random_cubes(300, 4);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let single = pool.install(|| KdTreeAccel::new(&prims, AccelConfig::default()).unwrap());
        let multi = KdTreeAccel::new(&prims, AccelConfig::default()).unwrap();
        assert_eq!(single.nodes, multi.nodes);
        assert_eq!(single.prim_refs, multi.prim_refs);
    }

    #[test]
    fn empty_scene_is_a_single_empty_leaf() {
        let prims: Vec<Cuboid> = Vec::new();
        let tree = OctreeAccel::new(&prims, AccelConfig::default()).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.bounds.is_empty());
        let root = tree.node(0);
        assert!(root.is_leaf());
        assert_eq!(root.count(), 0);
        let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(tree.intersect(&ray).is_none());
        assert!(!tree.intersect_p(&ray));
    }

    #[test]
    fn ray_segment_limits_queries() {
        let prims = vec![Cuboid::new(Bounds3f::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 1.0),
        ))];
        let tree = KdTreeAccel::new(&prims, AccelConfig::default()).unwrap();
        let mut ray = Ray::new(Point3f::new(0.5, 0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(tree.intersect_p(&ray));
        ray.t_max = 4.0;
        assert!(!tree.intersect_p(&ray));
        assert!(tree.intersect(&ray).is_none());
    }

    #[test]
    fn trees_nest() {
        let cubes = random_cubes(50, 5);
        let inner = OctreeAccel::new(&cubes, octree_config(AccelConfig::default())).unwrap();
        let inners = vec![inner];
        let outer = KdTreeAccel::new(&inners, AccelConfig::default()).unwrap();
        assert_eq!(outer.world_bound(), inners[0].world_bound());
        for ray in random_rays(100, 9) {
            let e = brute_force(&cubes, &ray).map(|h| h.t_hit);
            assert_eq!(e, outer.intersect(&ray).map(|h| h.t_hit));
        }
    }

    #[test]
    fn stats_count_every_node() {
        let prims = random_cubes(100, 6);
        let tree = OctreeAccel::new(&prims, octree_config(AccelConfig::default())).unwrap();
        let stats = tree.stats();
        assert_eq!(stats.n_nodes, tree.nodes.len());
        assert_eq!(stats.n_internal, tree.n_internal);
        assert_eq!(stats.n_leaves, tree.n_leaves);
        assert_eq!(stats.n_prim_refs, tree.prim_refs.len());
        assert_eq!(stats.n_empty_leaves, 0);
        assert!(stats.n_prim_refs >= prims.len());
    }
}
