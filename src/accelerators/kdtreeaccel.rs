//! kd-tree accelerator.
//!
//! Binary space partitioning with axis aligned split planes. Splits
//! are either chosen with the surface area heuristic (the default) or
//! at the spatial median, cycling through the axes.
//!
//! During traversal the near child is found from the sign of the ray
//! direction along the split axis, no sorting needed.

// others
use smallvec::{smallvec, SmallVec};
// rs_accel
use crate::accelerators::node::{KdAccelNode, KdNodeCodec};
use crate::accelerators::split::{median_split, AccelConfig, EdgeLists, KdSplit, SplitMethod};
use crate::accelerators::tree::{AccelTree, ChildHit, TreeFlavor};
use crate::core::error::Result;
use crate::core::geometry::{Bounds3f, Ray};
use crate::core::paramset::ParamSet;
use crate::core::primitive::Primitive;

#[derive(Debug, Copy, Clone)]
pub struct KdTree {
    pub config: AccelConfig,
}

impl KdTree {
    pub fn new(config: AccelConfig) -> Self {
        KdTree { config }
    }
}

impl TreeFlavor for KdTree {
    type Codec = KdNodeCodec;
    type Split = KdSplit;
    // sorted edge lists, SAH builds only
    type Scratch = Option<EdgeLists>;

    fn name(&self) -> &'static str {
        "KdTreeAccel"
    }
    fn config(&self) -> &AccelConfig {
        &self.config
    }
    fn create_leaf(&self, slot: u8) -> KdAccelNode {
        KdAccelNode::create_leaf(slot)
    }
    fn create_internal(&self, slot: u8, split: &KdSplit) -> KdAccelNode {
        KdAccelNode::create_internal(slot, split.axis, split.value)
    }
    fn root_scratch(&self, prim_bounds: &[Bounds3f], objects: &[u32]) -> Option<EdgeLists> {
        match self.config.split_method {
            SplitMethod::SAH => Some(EdgeLists::new(prim_bounds, objects)),
            SplitMethod::Middle => None,
        }
    }
    fn choose_split(
        &self,
        bounds: &Bounds3f,
        depth: u32,
        _objects: &[u32],
        _prim_bounds: &[Bounds3f],
        scratch: &Option<EdgeLists>,
    ) -> Option<KdSplit> {
        match scratch {
            Some(edges) => edges.sah_split(bounds, &self.config),
            None => Some(median_split(bounds, depth)),
        }
    }
    fn candidate_children(&self, bounds: &Bounds3f, split: &KdSplit) -> SmallVec<[(u8, Bounds3f); 8]> {
        let (below, above) = bounds.split(split.axis, split.value);
        smallvec![(0_u8, below), (1_u8, above)]
    }
    fn split_scratch(
        &self,
        scratch: Option<EdgeLists>,
        split: &KdSplit,
        prim_bounds: &[Bounds3f],
    ) -> SmallVec<[Option<EdgeLists>; 8]> {
        match scratch {
            Some(edges) => {
                let (below, above) = edges.split(split, prim_bounds);
                smallvec![Some(below), Some(above)]
            }
            None => smallvec![None, None],
        }
    }
    fn child_bounds(&self, parent: &KdAccelNode, parent_bounds: &Bounds3f, slot: u8) -> Bounds3f {
        match parent.split_axis() {
            Some(axis) => {
                let (below, above) = parent_bounds.split(axis, parent.split);
                if slot == 0 {
                    below
                } else {
                    above
                }
            }
            None => *parent_bounds,
        }
    }
    fn order_children(
        &self,
        parent: &KdAccelNode,
        ray: &Ray,
        children: &mut SmallVec<[ChildHit; 8]>,
    ) {
        // children arrive below first
        if let Some(axis) = parent.split_axis() {
            let below_first: bool = !(ray.d[axis] < 0.0);
            if !below_first {
                children.reverse();
            }
        }
    }
}

pub type KdTreeAccel<'a, P> = AccelTree<'a, KdTree, P>;

impl<'a, P: Primitive> AccelTree<'a, KdTree, P> {
    pub fn new(primitives: &'a [P], config: AccelConfig) -> Result<Self> {
        AccelTree::build(KdTree::new(config), primitives)
    }
    pub fn create(primitives: &'a [P], ps: &ParamSet) -> Result<Self> {
        let config: AccelConfig = AccelConfig::from_params(ps, primitives.len());
        KdTreeAccel::new(primitives, config)
    }
}
