mod building;
mod ray_bvh_intersection;
mod statistics;

use std::{num::NonZeroUsize, sync::Arc};

use bon::Builder;
use index_vec::IndexVec;

use crate::geometry::BoundingBox;

use super::Shape;

pub use statistics::BvhStatistics;

const DEFAULT_LEAF_SIZE: NonZeroUsize = NonZeroUsize::new(2).unwrap();
const DEFAULT_PARALLEL_BUILD_THRESHOLD: usize = 4096;

/// Tuning of the bounding volume hierarchy construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Builder)]
pub struct BvhSettings {
    /// Maximum number of shapes in a leaf node.
    #[builder(default = DEFAULT_LEAF_SIZE)]
    pub leaf_size: NonZeroUsize,

    /// Node size from which the two subtrees are built in parallel.
    #[builder(default = DEFAULT_PARALLEL_BUILD_THRESHOLD)]
    pub parallel_build_threshold: usize,
}

impl Default for BvhSettings {
    fn default() -> Self {
        BvhSettings::builder().build()
    }
}

/// Bounding volume hierarchy over a flattened list of shapes.
/// Immutable once built.
#[derive(Clone, Debug)]
pub(crate) struct Bvh {
    /// All shapes, in depth first insertion order
    shapes: IndexVec<ShapeIdx, Arc<dyn Shape>>,
    /// Shapes without a bounding box, tested against every ray
    unbounded: Vec<ShapeIdx>,
    /// None if there are no bounded shapes
    root: Option<BvhNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum BvhNode {
    Leaf {
        bounding_box: BoundingBox,
        shapes: Vec<ShapeIdx>,
    },
    Inner {
        bounding_box: BoundingBox,
        children: Box<[BvhNode; 2]>,
    },
}

impl BvhNode {
    pub fn bounding_box(&self) -> &BoundingBox {
        match self {
            BvhNode::Leaf { bounding_box, .. } => bounding_box,
            BvhNode::Inner { bounding_box, .. } => bounding_box,
        }
    }
}

index_vec::define_index_type! {
    pub(crate) struct ShapeIdx = u32;
}

impl Bvh {
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Shape indices of all leaves, left to right.
    #[cfg(test)]
    pub fn leaves(&self) -> Vec<&[ShapeIdx]> {
        let mut leaves = Vec::new();
        let mut stack: Vec<&BvhNode> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            match node {
                BvhNode::Leaf { shapes, .. } => leaves.push(shapes.as_slice()),
                BvhNode::Inner { children, .. } => {
                    stack.push(&children[1]);
                    stack.push(&children[0]);
                }
            }
        }
        leaves
    }
}
