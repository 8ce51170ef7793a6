use std::fmt::Display;

use crate::util::Stats;

use super::{Bvh, BvhNode};

/// Shape of a built hierarchy, for logging and tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct BvhStatistics {
    pub shape_count: usize,
    pub unbounded_count: usize,
    pub inner_node_count: usize,
    /// Depth of the leaves, root is at depth 1
    pub depth: Stats,
    /// Number of shapes per leaf
    pub leaf_fill: Stats,
}

impl Bvh {
    pub fn statistics(&self) -> BvhStatistics {
        let mut statistics = BvhStatistics {
            shape_count: self.shape_count(),
            unbounded_count: self.unbounded.len(),
            inner_node_count: 0,
            depth: Stats::default(),
            leaf_fill: Stats::default(),
        };

        if let Some(root) = &self.root {
            statistics.collect_recursive(root, 1);
        }

        statistics
    }
}

impl BvhStatistics {
    fn collect_recursive(&mut self, node: &BvhNode, depth: usize) {
        match node {
            BvhNode::Leaf { shapes, .. } => {
                self.depth.add_sample(depth);
                self.leaf_fill.add_sample(shapes.len());
            }
            BvhNode::Inner { children, .. } => {
                self.inner_node_count += 1;
                for child in children.iter() {
                    self.collect_recursive(child, depth + 1);
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_fill.count
    }
}

impl Display for BvhStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} shapes ({} unbounded), {} inner nodes, {} leaves; depth {}; leaf fill {}",
            self.shape_count,
            self.unbounded_count,
            self.inner_node_count,
            self.leaf_count(),
            self.depth,
            self.leaf_fill,
        )
    }
}
