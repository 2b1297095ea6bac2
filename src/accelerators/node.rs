//! Tree nodes exist in two forms. The *logical* node is a plain
//! struct the builder and the traversal code work with, the *encoded*
//! node is a fixed size byte array which is what a tree actually
//! stores. A **NodeCodec** converts between the two and is the only
//! place which knows about bit positions.
//!
//! | Codec | Size | Layout |
//! |---|---|---|
//! | `KdNodeCodec` | 8 | byte 0: flags (bits 7-6), order (bit 5), children - 1 (bit 4), offset bits 27-24 (bits 3-0); bytes 1-3: offset bits 0-23; bytes 4-7: split (`f32`) or primitive count (`u32`) |
//! | `OctNodeCodec` | 8 | byte 0: kind (bit 7), octant (bits 6-4); byte 1: size; bytes 2-5: offset |
//! | `OctNode64Codec` | 8 | byte 0: kind (bit 7), octant (bits 6-4); bytes 1-4: offset; bytes 5-7: size |
//! | `SahOctNodeCodec` | 20 | bytes 0-7: as `OctNode64Codec`; bytes 8-19: split point x, y, z (`f32`) |
//!
//! Multi-byte fields are little endian. Values which do not fit into
//! their bit field are rejected by `encode`, never truncated.

// std
use std::fmt::Debug;
// others
use byteorder::{ByteOrder, LittleEndian};
// rs_accel
use crate::core::error::{check_range, NodeError, Result};
use crate::core::geometry::{Point3f, XYZEnum};
use crate::core::pbrt::Float;

/// Largest offset a kd-tree node can address (28 bits).
pub const KD_MAX_OFFSET: u32 = (1_u32 << 28) - 1;
/// Largest size of a standard octree node (8 bits).
pub const OCT_MAX_SIZE: u32 = (1_u32 << 8) - 1;
/// Largest size of a wide octree node (24 bits).
pub const OCT64_MAX_SIZE: u32 = (1_u32 << 24) - 1;

/// Accessors the generic builder and traversal need from a logical
/// node.
pub trait TreeNode: Copy + Debug + PartialEq + Send + Sync {
    fn is_leaf(&self) -> bool;
    /// First primitive reference (leaf) or first child node (interior).
    fn offset(&self) -> u32;
    /// Number of primitives (leaf) or present children (interior).
    fn count(&self) -> u32;
    /// Position among the siblings (kd-tree order, octree octant).
    fn slot(&self) -> u8;
    fn init_leaf(&mut self, first_prim_offset: u32, n_prims: u32);
    fn init_interior(&mut self, first_child: u32, n_children: u32);
}

/// Lossless conversion between a logical node and its encoding.
pub trait NodeCodec {
    type Node: TreeNode;
    type Encoded: Copy + Debug + Send + Sync;
    /// Encoded size in bytes.
    const SIZE: usize;
    /// Largest primitive or child count the encoding can hold.
    const MAX_COUNT: u32;
    fn encode(node: &Self::Node) -> Result<Self::Encoded>;
    fn decode(encoded: &Self::Encoded) -> Self::Node;
}

// kd-tree

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum KdNodeFlags {
    SplitX = 0,
    SplitY = 1,
    SplitZ = 2,
    Leaf = 3,
}

impl KdNodeFlags {
    pub fn from_axis(axis: XYZEnum) -> KdNodeFlags {
        match axis {
            XYZEnum::X => KdNodeFlags::SplitX,
            XYZEnum::Y => KdNodeFlags::SplitY,
            XYZEnum::Z => KdNodeFlags::SplitZ,
        }
    }
    pub fn axis(self) -> Option<XYZEnum> {
        match self {
            KdNodeFlags::SplitX => Some(XYZEnum::X),
            KdNodeFlags::SplitY => Some(XYZEnum::Y),
            KdNodeFlags::SplitZ => Some(XYZEnum::Z),
            KdNodeFlags::Leaf => None,
        }
    }
    fn from_bits(bits: u8) -> KdNodeFlags {
        match bits & 0b11 {
            0 => KdNodeFlags::SplitX,
            1 => KdNodeFlags::SplitY,
            2 => KdNodeFlags::SplitZ,
            _ => KdNodeFlags::Leaf,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KdAccelNode {
    pub flags: KdNodeFlags,
    /// 0 = below the parent's split plane, 1 = above
    pub order: u8,
    pub offset: u32,
    pub count: u32,
    /// world space position of the split plane, zero for leaves
    pub split: Float,
}

impl KdAccelNode {
    pub fn create_leaf(order: u8) -> Self {
        KdAccelNode {
            flags: KdNodeFlags::Leaf,
            order,
            offset: 0,
            count: 0,
            split: 0.0 as Float,
        }
    }
    pub fn create_internal(order: u8, axis: XYZEnum, split: Float) -> Self {
        KdAccelNode {
            flags: KdNodeFlags::from_axis(axis),
            order,
            offset: 0,
            count: 0,
            split,
        }
    }
    pub fn split_axis(&self) -> Option<XYZEnum> {
        self.flags.axis()
    }
}

impl TreeNode for KdAccelNode {
    fn is_leaf(&self) -> bool {
        self.flags == KdNodeFlags::Leaf
    }
    fn offset(&self) -> u32 {
        self.offset
    }
    fn count(&self) -> u32 {
        self.count
    }
    fn slot(&self) -> u8 {
        self.order
    }
    fn init_leaf(&mut self, first_prim_offset: u32, n_prims: u32) {
        self.flags = KdNodeFlags::Leaf;
        self.offset = first_prim_offset;
        self.count = n_prims;
        self.split = 0.0 as Float;
    }
    fn init_interior(&mut self, first_child: u32, n_children: u32) {
        self.offset = first_child;
        self.count = n_children;
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct KdNodeCodec;

impl NodeCodec for KdNodeCodec {
    type Node = KdAccelNode;
    type Encoded = [u8; 8];
    const SIZE: usize = 8;
    const MAX_COUNT: u32 = std::u32::MAX;

    fn encode(node: &KdAccelNode) -> Result<[u8; 8]> {
        check_range("order", node.order as u64, 1)?;
        check_range("offset", node.offset as u64, KD_MAX_OFFSET as u64)?;
        let mut bytes: [u8; 8] = [0_u8; 8];
        let mut flags: u8 = (node.flags as u8) << 6 | node.order << 5;
        flags |= ((node.offset >> 24) & 0x0f) as u8;
        match node.flags {
            KdNodeFlags::Leaf => {
                LittleEndian::write_u32(&mut bytes[4..8], node.count);
            }
            _ => {
                if node.count == 0 {
                    return Err(NodeError::NoChildren);
                }
                check_range("children", node.count as u64, 2)?;
                flags |= ((node.count - 1) as u8) << 4;
                LittleEndian::write_f32(&mut bytes[4..8], node.split);
            }
        }
        bytes[0] = flags;
        bytes[1] = (node.offset & 0xff) as u8;
        bytes[2] = ((node.offset >> 8) & 0xff) as u8;
        bytes[3] = ((node.offset >> 16) & 0xff) as u8;
        Ok(bytes)
    }

    fn decode(bytes: &[u8; 8]) -> KdAccelNode {
        let flags: KdNodeFlags = KdNodeFlags::from_bits(bytes[0] >> 6);
        let order: u8 = (bytes[0] >> 5) & 1;
        let offset: u32 = ((bytes[0] & 0x0f) as u32) << 24
            | (bytes[3] as u32) << 16
            | (bytes[2] as u32) << 8
            | bytes[1] as u32;
        // the trailing four bytes depend on the kind
        let (count, split): (u32, Float) = match flags {
            KdNodeFlags::Leaf => (LittleEndian::read_u32(&bytes[4..8]), 0.0 as Float),
            _ => (
                ((bytes[0] >> 4) & 1) as u32 + 1,
                LittleEndian::read_f32(&bytes[4..8]),
            ),
        };
        KdAccelNode {
            flags,
            order,
            offset,
            count,
            split,
        }
    }
}

// octree

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum OctNodeKind {
    Internal = 0,
    Leaf = 1,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OctreeNode {
    pub kind: OctNodeKind,
    /// bit *i* set: upper half along axis *i*
    pub octant: u8,
    pub offset: u32,
    pub size: u32,
}

impl OctreeNode {
    pub fn create_leaf(octant: u8) -> Self {
        OctreeNode {
            kind: OctNodeKind::Leaf,
            octant,
            offset: 0,
            size: 0,
        }
    }
    pub fn create_internal(octant: u8) -> Self {
        OctreeNode {
            kind: OctNodeKind::Internal,
            octant,
            offset: 0,
            size: 0,
        }
    }
}

impl TreeNode for OctreeNode {
    fn is_leaf(&self) -> bool {
        self.kind == OctNodeKind::Leaf
    }
    fn offset(&self) -> u32 {
        self.offset
    }
    fn count(&self) -> u32 {
        self.size
    }
    fn slot(&self) -> u8 {
        self.octant
    }
    fn init_leaf(&mut self, first_prim_offset: u32, n_prims: u32) {
        self.kind = OctNodeKind::Leaf;
        self.offset = first_prim_offset;
        self.size = n_prims;
    }
    fn init_interior(&mut self, first_child: u32, n_children: u32) {
        self.offset = first_child;
        self.size = n_children;
    }
}

fn encode_oct_header(node: &OctreeNode) -> Result<u8> {
    check_range("octant", node.octant as u64, 7)?;
    Ok((node.kind as u8) << 7 | node.octant << 4)
}

fn decode_oct_header(byte: u8) -> (OctNodeKind, u8) {
    let kind: OctNodeKind = if byte >> 7 == 0 {
        OctNodeKind::Internal
    } else {
        OctNodeKind::Leaf
    };
    (kind, (byte >> 4) & 0x07)
}

/// Standard octree node: 8 bit size, 32 bit offset.
#[derive(Debug, Default, Copy, Clone)]
pub struct OctNodeCodec;

impl NodeCodec for OctNodeCodec {
    type Node = OctreeNode;
    type Encoded = [u8; 8];
    const SIZE: usize = 8;
    const MAX_COUNT: u32 = OCT_MAX_SIZE;

    fn encode(node: &OctreeNode) -> Result<[u8; 8]> {
        check_range("size", node.size as u64, OCT_MAX_SIZE as u64)?;
        let mut bytes: [u8; 8] = [0_u8; 8];
        bytes[0] = encode_oct_header(node)?;
        bytes[1] = node.size as u8;
        LittleEndian::write_u32(&mut bytes[2..6], node.offset);
        Ok(bytes)
    }

    fn decode(bytes: &[u8; 8]) -> OctreeNode {
        let (kind, octant) = decode_oct_header(bytes[0]);
        OctreeNode {
            kind,
            octant,
            offset: LittleEndian::read_u32(&bytes[2..6]),
            size: bytes[1] as u32,
        }
    }
}

/// Wide octree node: 32 bit offset, 24 bit size.
#[derive(Debug, Default, Copy, Clone)]
pub struct OctNode64Codec;

impl NodeCodec for OctNode64Codec {
    type Node = OctreeNode;
    type Encoded = [u8; 8];
    const SIZE: usize = 8;
    const MAX_COUNT: u32 = OCT64_MAX_SIZE;

    fn encode(node: &OctreeNode) -> Result<[u8; 8]> {
        check_range("size", node.size as u64, OCT64_MAX_SIZE as u64)?;
        let mut bytes: [u8; 8] = [0_u8; 8];
        bytes[0] = encode_oct_header(node)?;
        LittleEndian::write_u32(&mut bytes[1..5], node.offset);
        LittleEndian::write_uint(&mut bytes[5..8], node.size as u64, 3);
        Ok(bytes)
    }

    fn decode(bytes: &[u8; 8]) -> OctreeNode {
        let (kind, octant) = decode_oct_header(bytes[0]);
        OctreeNode {
            kind,
            octant,
            offset: LittleEndian::read_u32(&bytes[1..5]),
            size: LittleEndian::read_uint(&bytes[5..8], 3) as u32,
        }
    }
}

/// Octree node which carries its own split point, so children need
/// not be split at the geometric center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SahOctreeNode {
    pub node: OctreeNode,
    pub split: Point3f,
}

impl SahOctreeNode {
    pub fn create_leaf(octant: u8) -> Self {
        SahOctreeNode {
            node: OctreeNode::create_leaf(octant),
            split: Point3f::default(),
        }
    }
    pub fn create_internal(octant: u8, split: Point3f) -> Self {
        SahOctreeNode {
            node: OctreeNode::create_internal(octant),
            split,
        }
    }
}

impl TreeNode for SahOctreeNode {
    fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }
    fn offset(&self) -> u32 {
        self.node.offset
    }
    fn count(&self) -> u32 {
        self.node.size
    }
    fn slot(&self) -> u8 {
        self.node.octant
    }
    fn init_leaf(&mut self, first_prim_offset: u32, n_prims: u32) {
        self.node.init_leaf(first_prim_offset, n_prims);
        self.split = Point3f::default();
    }
    fn init_interior(&mut self, first_child: u32, n_children: u32) {
        self.node.init_interior(first_child, n_children);
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct SahOctNodeCodec;

impl NodeCodec for SahOctNodeCodec {
    type Node = SahOctreeNode;
    type Encoded = [u8; 20];
    const SIZE: usize = 20;
    const MAX_COUNT: u32 = OCT64_MAX_SIZE;

    fn encode(node: &SahOctreeNode) -> Result<[u8; 20]> {
        let mut bytes: [u8; 20] = [0_u8; 20];
        let head: [u8; 8] = OctNode64Codec::encode(&node.node)?;
        bytes[0..8].copy_from_slice(&head);
        LittleEndian::write_f32(&mut bytes[8..12], node.split.x);
        LittleEndian::write_f32(&mut bytes[12..16], node.split.y);
        LittleEndian::write_f32(&mut bytes[16..20], node.split.z);
        Ok(bytes)
    }

    fn decode(bytes: &[u8; 20]) -> SahOctreeNode {
        let mut head: [u8; 8] = [0_u8; 8];
        head.copy_from_slice(&bytes[0..8]);
        SahOctreeNode {
            node: OctNode64Codec::decode(&head),
            split: Point3f {
                x: LittleEndian::read_f32(&bytes[8..12]),
                y: LittleEndian::read_f32(&bytes[12..16]),
                z: LittleEndian::read_f32(&bytes[16..20]),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip<C: NodeCodec>(node: C::Node) {
        let encoded = C::encode(&node).unwrap();
        assert_eq!(C::decode(&encoded), node, "encoded as {:?}", encoded);
    }

    fn kd_interior(order: u8, axis: XYZEnum, split: Float, offset: u32, count: u32) -> KdAccelNode {
        let mut node = KdAccelNode::create_internal(order, axis, split);
        node.init_interior(offset, count);
        node
    }

    fn kd_leaf(order: u8, offset: u32, count: u32) -> KdAccelNode {
        let mut node = KdAccelNode::create_leaf(order);
        node.init_leaf(offset, count);
        node
    }

    #[test]
    fn kd_round_trip_boundaries() {
        for &order in &[0_u8, 1] {
            for &offset in &[0_u32, 1, 0x00ff_ffff, 0x0100_0000, KD_MAX_OFFSET] {
                for &axis in &[XYZEnum::X, XYZEnum::Y, XYZEnum::Z] {
                    for &count in &[1_u32, 2] {
                        round_trip::<KdNodeCodec>(kd_interior(order, axis, -3.25, offset, count));
                    }
                }
                for &count in &[0_u32, 1, 255, std::u32::MAX] {
                    round_trip::<KdNodeCodec>(kd_leaf(order, offset, count));
                }
            }
        }
        round_trip::<KdNodeCodec>(kd_interior(1, XYZEnum::Z, std::f32::MAX, 7, 2));
        round_trip::<KdNodeCodec>(kd_interior(0, XYZEnum::X, -0.0, 7, 1));
    }

    #[test]
    fn kd_byte_layout() {
        let node = kd_interior(1, XYZEnum::Y, 1.5, 0x0a12_3456, 2);
        let bytes = KdNodeCodec::encode(&node).unwrap();
        // flags 01, order 1, children - 1 = 1, offset bits 27-24 = 0xa
        assert_eq!(bytes[0], 0b0111_1010);
        assert_eq!(&bytes[1..4], &[0x56, 0x34, 0x12]);
        assert_eq!(&bytes[4..8], &1.5_f32.to_le_bytes());
        let leaf = kd_leaf(0, 3, 0xdead_beef);
        let bytes = KdNodeCodec::encode(&leaf).unwrap();
        assert_eq!(bytes[0], 0b1100_0000);
        assert_eq!(&bytes[4..8], &0xdead_beef_u32.to_le_bytes());
    }

    #[test]
    fn kd_rejects_out_of_range() {
        let leaf = kd_leaf(0, KD_MAX_OFFSET + 1, 1);
        assert_eq!(
            KdNodeCodec::encode(&leaf),
            Err(NodeError::OutOfRange {
                field: "offset",
                value: (KD_MAX_OFFSET + 1) as u64,
                max: KD_MAX_OFFSET as u64,
            })
        );
        assert!(KdNodeCodec::encode(&kd_leaf(2, 0, 1)).is_err());
        assert!(KdNodeCodec::encode(&kd_interior(0, XYZEnum::X, 0.0, 0, 3)).is_err());
        assert_eq!(
            KdNodeCodec::encode(&KdAccelNode::create_internal(0, XYZEnum::X, 0.0)),
            Err(NodeError::NoChildren)
        );
    }

    fn oct(kind: OctNodeKind, octant: u8, offset: u32, size: u32) -> OctreeNode {
        OctreeNode {
            kind,
            octant,
            offset,
            size,
        }
    }

    #[test]
    fn octree_round_trip_boundaries() {
        for &kind in &[OctNodeKind::Internal, OctNodeKind::Leaf] {
            for octant in 0..8_u8 {
                for &offset in &[0_u32, 1, 0x00ff_ffff, std::u32::MAX] {
                    for &size in &[0_u32, 1, 8, OCT_MAX_SIZE] {
                        round_trip::<OctNodeCodec>(oct(kind, octant, offset, size));
                    }
                    for &size in &[0_u32, 8, OCT_MAX_SIZE + 1, OCT64_MAX_SIZE] {
                        round_trip::<OctNode64Codec>(oct(kind, octant, offset, size));
                        round_trip::<SahOctNodeCodec>(SahOctreeNode {
                            node: oct(kind, octant, offset, size),
                            split: Point3f::new(-1.0, 0.5, 1e10),
                        });
                    }
                }
            }
        }
    }

    #[test]
    fn octree_byte_layout() {
        let node = oct(OctNodeKind::Leaf, 5, 0x0102_0304, 0x42);
        let bytes = OctNodeCodec::encode(&node).unwrap();
        assert_eq!(bytes, [0b1101_0000, 0x42, 0x04, 0x03, 0x02, 0x01, 0, 0]);
        let node = oct(OctNodeKind::Internal, 3, 0x0102_0304, 0x0a0b0c);
        let bytes = OctNode64Codec::encode(&node).unwrap();
        assert_eq!(bytes, [0b0011_0000, 0x04, 0x03, 0x02, 0x01, 0x0c, 0x0b, 0x0a]);
        let sah = SahOctreeNode {
            node,
            split: Point3f::new(1.0, 2.0, 3.0),
        };
        let wide = SahOctNodeCodec::encode(&sah).unwrap();
        assert_eq!(&wide[0..8], &bytes);
        assert_eq!(&wide[16..20], &3.0_f32.to_le_bytes());
    }

    #[test]
    fn octree_rejects_out_of_range() {
        assert!(OctNodeCodec::encode(&oct(OctNodeKind::Leaf, 0, 0, OCT_MAX_SIZE + 1)).is_err());
        assert!(OctNode64Codec::encode(&oct(OctNodeKind::Leaf, 0, 0, OCT64_MAX_SIZE + 1)).is_err());
        assert!(OctNodeCodec::encode(&oct(OctNodeKind::Leaf, 8, 0, 1)).is_err());
        let sah = SahOctreeNode {
            node: oct(OctNodeKind::Leaf, 0, 0, OCT64_MAX_SIZE + 1),
            split: Point3f::default(),
        };
        assert!(SahOctNodeCodec::encode(&sah).is_err());
    }
}
