//! Octree accelerators.
//!
//! An interior node is split into (up to) eight octants at one point.
//! The plain octree always splits at the center of the node's box, so
//! the split point never has to be stored; it comes in two encodings,
//! a standard one with an 8 bit size field and a wide one with 24
//! bits. The SAH octree picks its split point with the surface area
//! heuristic and stores it in the node.
//!
//! Octants without primitives are not stored, an interior node keeps
//! only the count of its present children. Children are visited in
//! order of their entry distance.
//!
//! Objects are copied into every octant they overlap, so a region
//! shared by more than `max_leaf_size` objects is split into all eight
//! octants on every level. Octree depths are therefore clamped to
//! **OCT_MAX_DEPTH**.

// std
use std::marker::PhantomData;
// others
use log::debug;
use smallvec::SmallVec;
// rs_accel
use crate::accelerators::node::{
    NodeCodec, OctNode64Codec, OctNodeCodec, OctreeNode, SahOctNodeCodec, SahOctreeNode,
    OCT_MAX_SIZE,
};
use crate::accelerators::split::{sah_split_point, AccelConfig, OCT_MAX_DEPTH};
use crate::accelerators::tree::{AccelTree, TreeFlavor};
use crate::core::error::Result;
use crate::core::geometry::{Bounds3f, Point3f};
use crate::core::paramset::ParamSet;
use crate::core::primitive::Primitive;

fn clamp_depth(mut config: AccelConfig) -> AccelConfig {
    if config.max_depth > OCT_MAX_DEPTH {
        debug!(
            "octree depth {} clamped to {}",
            config.max_depth, OCT_MAX_DEPTH
        );
        config.max_depth = OCT_MAX_DEPTH;
    }
    config
}

fn octants(bounds: &Bounds3f, split: &Point3f) -> SmallVec<[(u8, Bounds3f); 8]> {
    (0..8_u8)
        .map(|octant| (octant, bounds.octant(split, octant)))
        .collect()
}

/// Plain octree, generic over the node encoding.
#[derive(Debug, Copy, Clone)]
pub struct Octree<C> {
    config: AccelConfig,
    codec: PhantomData<fn() -> C>,
}

impl<C> Octree<C> {
    pub fn new(config: AccelConfig) -> Self {
        Octree {
            config: clamp_depth(config),
            codec: PhantomData,
        }
    }
}

impl<C: NodeCodec<Node = OctreeNode>> TreeFlavor for Octree<C> {
    type Codec = C;
    type Split = Point3f;
    type Scratch = ();

    fn name(&self) -> &'static str {
        if C::MAX_COUNT > OCT_MAX_SIZE {
            "Octree64Accel"
        } else {
            "OctreeAccel"
        }
    }
    fn config(&self) -> &AccelConfig {
        &self.config
    }
    fn create_leaf(&self, slot: u8) -> OctreeNode {
        OctreeNode::create_leaf(slot)
    }
    fn create_internal(&self, slot: u8, _split: &Point3f) -> OctreeNode {
        OctreeNode::create_internal(slot)
    }
    fn root_scratch(&self, _prim_bounds: &[Bounds3f], _objects: &[u32]) {}
    fn choose_split(
        &self,
        bounds: &Bounds3f,
        _depth: u32,
        _objects: &[u32],
        _prim_bounds: &[Bounds3f],
        _scratch: &(),
    ) -> Option<Point3f> {
        Some(bounds.center())
    }
    fn candidate_children(&self, bounds: &Bounds3f, split: &Point3f) -> SmallVec<[(u8, Bounds3f); 8]> {
        octants(bounds, split)
    }
    fn split_scratch(&self, _scratch: (), _split: &Point3f, _prim_bounds: &[Bounds3f]) -> SmallVec<[(); 8]> {
        SmallVec::from_elem((), 8)
    }
    fn child_bounds(&self, _parent: &OctreeNode, parent_bounds: &Bounds3f, slot: u8) -> Bounds3f {
        parent_bounds.octant(&parent_bounds.center(), slot)
    }
}

/// Octree with a split point chosen per node.
#[derive(Debug, Copy, Clone)]
pub struct SahOctree {
    config: AccelConfig,
}

impl SahOctree {
    pub fn new(config: AccelConfig) -> Self {
        SahOctree {
            config: clamp_depth(config),
        }
    }
}

impl TreeFlavor for SahOctree {
    type Codec = SahOctNodeCodec;
    type Split = Point3f;
    type Scratch = ();

    fn name(&self) -> &'static str {
        "SahOctreeAccel"
    }
    fn config(&self) -> &AccelConfig {
        &self.config
    }
    fn create_leaf(&self, slot: u8) -> SahOctreeNode {
        SahOctreeNode::create_leaf(slot)
    }
    fn create_internal(&self, slot: u8, split: &Point3f) -> SahOctreeNode {
        SahOctreeNode::create_internal(slot, *split)
    }
    fn root_scratch(&self, _prim_bounds: &[Bounds3f], _objects: &[u32]) {}
    fn choose_split(
        &self,
        bounds: &Bounds3f,
        _depth: u32,
        objects: &[u32],
        prim_bounds: &[Bounds3f],
        _scratch: &(),
    ) -> Option<Point3f> {
        sah_split_point(bounds, objects, prim_bounds, &self.config)
    }
    fn candidate_children(&self, bounds: &Bounds3f, split: &Point3f) -> SmallVec<[(u8, Bounds3f); 8]> {
        octants(bounds, split)
    }
    fn split_scratch(&self, _scratch: (), _split: &Point3f, _prim_bounds: &[Bounds3f]) -> SmallVec<[(); 8]> {
        SmallVec::from_elem((), 8)
    }
    fn child_bounds(&self, parent: &SahOctreeNode, parent_bounds: &Bounds3f, slot: u8) -> Bounds3f {
        parent_bounds.octant(&parent.split, slot)
    }
}

pub type OctreeAccel<'a, P> = AccelTree<'a, Octree<OctNodeCodec>, P>;
pub type Octree64Accel<'a, P> = AccelTree<'a, Octree<OctNode64Codec>, P>;
pub type SahOctreeAccel<'a, P> = AccelTree<'a, SahOctree, P>;

impl<'a, C: NodeCodec<Node = OctreeNode>, P: Primitive> AccelTree<'a, Octree<C>, P> {
    pub fn new(primitives: &'a [P], config: AccelConfig) -> Result<Self> {
        AccelTree::build(Octree::new(config), primitives)
    }
    pub fn create(primitives: &'a [P], ps: &ParamSet) -> Result<Self> {
        let config: AccelConfig = AccelConfig::octree_from_params(ps, primitives.len());
        AccelTree::build(Octree::new(config), primitives)
    }
}

impl<'a, P: Primitive> AccelTree<'a, SahOctree, P> {
    pub fn new(primitives: &'a [P], config: AccelConfig) -> Result<Self> {
        AccelTree::build(SahOctree::new(config), primitives)
    }
    pub fn create(primitives: &'a [P], ps: &ParamSet) -> Result<Self> {
        let config: AccelConfig = AccelConfig::octree_from_params(ps, primitives.len());
        AccelTree::build(SahOctree::new(config), primitives)
    }
}
