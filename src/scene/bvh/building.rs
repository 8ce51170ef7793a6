use std::{sync::Arc, time::Instant};

use assert2::debug_assert;
use index_vec::IndexVec;
use ordered_float::OrderedFloat;

use crate::{
    geometry::{BoundingBox, WorldPoint},
    scene::Shape,
};

use super::{Bvh, BvhNode, BvhSettings, ShapeIdx};

impl Bvh {
    /// Builds the hierarchy over the bounded shapes, unbounded shapes are set aside.
    /// The result only depends on the order of `shapes` and on the settings.
    pub fn build(shapes: IndexVec<ShapeIdx, Arc<dyn Shape>>, settings: &BvhSettings) -> Bvh {
        let _span = tracing::debug_span!("build_bvh", shapes = shapes.len()).entered();
        let start = Instant::now();

        let mut entries = Vec::with_capacity(shapes.len());
        let mut unbounded = Vec::new();
        for (index, shape) in shapes.iter_enumerated() {
            match shape.bounding_box() {
                Some(bounding_box) => entries.push(BuildEntry::new(index, bounding_box)),
                None => unbounded.push(index),
            }
        }

        let root = if entries.is_empty() {
            None
        } else {
            Some(build_recursive(&mut entries, settings))
        };

        let bvh = Bvh {
            shapes,
            unbounded,
            root,
        };

        tracing::debug!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "BVH built: {}",
            bvh.statistics()
        );

        bvh
    }
}

/// Shape as seen by the builder
#[derive(Clone, Debug)]
struct BuildEntry {
    index: ShapeIdx,
    bounding_box: BoundingBox,
    centroid: WorldPoint,
}

impl BuildEntry {
    fn new(index: ShapeIdx, bounding_box: BoundingBox) -> BuildEntry {
        BuildEntry {
            index,
            centroid: bounding_box.centroid(),
            bounding_box,
        }
    }
}

/// Median split along the longest axis of the enclosing box.
fn build_recursive(entries: &mut [BuildEntry], settings: &BvhSettings) -> BvhNode {
    debug_assert!(!entries.is_empty());
    let enclosing_box = entries
        .iter()
        .fold(BoundingBox::empty(), |b, e| b.union(&e.bounding_box));

    if entries.len() <= settings.leaf_size.get() {
        let mut shapes: Vec<ShapeIdx> = entries.iter().map(|e| e.index).collect();
        shapes.sort_unstable();
        return BvhNode::Leaf {
            bounding_box: enclosing_box,
            shapes,
        };
    }

    let axis = enclosing_box.largest_axis().index();
    let mid = entries.len() / 2;

    // Index breaks centroid ties, the ordering is total and the split deterministic
    entries.select_nth_unstable_by_key(mid, |e| (OrderedFloat(e.centroid[axis]), e.index));

    let parallel = entries.len() >= settings.parallel_build_threshold;
    let (left, right) = entries.split_at_mut(mid);
    let (left, right) = if parallel {
        rayon::join(
            || build_recursive(left, settings),
            || build_recursive(right, settings),
        )
    } else {
        (
            build_recursive(left, settings),
            build_recursive(right, settings),
        )
    };

    BvhNode::Inner {
        bounding_box: left.bounding_box().union(right.bounding_box()),
        children: Box::new([left, right]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::FloatType,
        scene::primitives::{Plane, Sphere},
    };
    use assert2::{assert, let_assert};
    use proptest::prelude::*;
    use std::num::NonZeroUsize;
    use test_strategy::proptest;

    fn sphere(x: FloatType, y: FloatType, z: FloatType, r: FloatType) -> Arc<dyn Shape> {
        Arc::new(Sphere::new(WorldPoint::new(x, y, z), r).unwrap())
    }

    fn settings(leaf_size: usize) -> BvhSettings {
        BvhSettings::builder()
            .leaf_size(NonZeroUsize::new(leaf_size).unwrap())
            .build()
    }

    fn sphere_row(count: usize) -> IndexVec<ShapeIdx, Arc<dyn Shape>> {
        (0..count)
            .map(|i| sphere(i as FloatType * 3.0, 0.0, 0.0, 1.0))
            .collect()
    }

    /// Checks the box invariant and returns the depth of the subtree.
    fn check_node(bvh: &Bvh, node: &BvhNode) -> usize {
        match node {
            BvhNode::Leaf {
                bounding_box,
                shapes,
            } => {
                assert!(!shapes.is_empty());
                let expected = shapes.iter().fold(BoundingBox::empty(), |b, i| {
                    b.union(&bvh.shapes[*i].bounding_box().unwrap())
                });
                assert!(*bounding_box == expected);
                1
            }
            BvhNode::Inner {
                bounding_box,
                children,
            } => {
                assert!(*bounding_box == children[0].bounding_box().union(children[1].bounding_box()));
                1 + check_node(bvh, &children[0]).max(check_node(bvh, &children[1]))
            }
        }
    }

    #[test]
    fn empty() {
        let bvh = Bvh::build(IndexVec::new(), &BvhSettings::default());
        assert!(bvh.root.is_none());
        assert!(bvh.unbounded.is_empty());
        assert!(bvh.leaves().is_empty());
    }

    #[test]
    fn single_leaf() {
        let bvh = Bvh::build(sphere_row(2), &settings(2));
        let_assert!(Some(BvhNode::Leaf { shapes, .. }) = &bvh.root);
        assert!(shapes.len() == 2);
    }

    #[test]
    fn median_split_along_longest_axis() {
        let bvh = Bvh::build(sphere_row(4), &settings(2));
        let leaves = bvh.leaves();
        assert!(leaves.len() == 2);
        assert!(leaves[0] == [ShapeIdx::new(0), ShapeIdx::new(1)]);
        assert!(leaves[1] == [ShapeIdx::new(2), ShapeIdx::new(3)]);
    }

    #[test]
    fn unbounded_shapes_are_set_aside() {
        let mut shapes = sphere_row(3);
        shapes.push(Arc::new(Plane::new(WorldPoint::origin(), [0.0, 0.0, 1.0].into()).unwrap()));
        let bvh = Bvh::build(shapes, &settings(1));

        assert!(bvh.unbounded == vec![ShapeIdx::new(3)]);
        assert!(bvh.leaves().iter().map(|leaf| leaf.len()).sum::<usize>() == 3);
    }

    #[test]
    fn identical_centroids_terminate() {
        let shapes = (0..33).map(|_| sphere(1.0, 2.0, 3.0, 1.0)).collect();
        let bvh = Bvh::build(shapes, &settings(1));

        let_assert!(Some(root) = &bvh.root);
        let depth = check_node(&bvh, root);
        assert!(bvh.leaves().len() == 33);
        assert!(depth == 7);
    }

    #[test]
    fn parallel_build_matches_sequential() {
        let shapes: IndexVec<ShapeIdx, _> = (0..200)
            .map(|i| {
                let i = i as FloatType;
                sphere((i * 7.3) % 17.0, (i * 3.1) % 11.0, (i * 1.7) % 5.0, 0.5)
            })
            .collect();

        let sequential = Bvh::build(shapes.clone(), &settings(3));
        let parallel = Bvh::build(
            shapes,
            &BvhSettings::builder()
                .leaf_size(NonZeroUsize::new(3).unwrap())
                .parallel_build_threshold(0)
                .build(),
        );

        assert!(sequential.root == parallel.root);
    }

    fn sphere_field() -> impl Strategy<Value = Vec<(FloatType, FloatType, FloatType, FloatType)>> {
        proptest::collection::vec(
            (-50.0..50.0, -50.0..50.0, -50.0..50.0, 0.1..5.0),
            0..100,
        )
    }

    #[proptest]
    fn tree_invariants(
        #[strategy(sphere_field())] field: Vec<(FloatType, FloatType, FloatType, FloatType)>,
        #[strategy(1usize..5)] leaf_size: usize,
    ) {
        let shapes: IndexVec<ShapeIdx, _> = field.iter().map(|&(x, y, z, r)| sphere(x, y, z, r)).collect();
        let bvh = Bvh::build(shapes, &settings(leaf_size));

        let mut seen: Vec<ShapeIdx> = bvh.leaves().concat();
        seen.sort();
        assert!(seen == (0..field.len()).map(ShapeIdx::new).collect::<Vec<_>>());
        assert!(bvh.leaves().iter().all(|leaf| leaf.len() <= leaf_size));

        if let Some(root) = &bvh.root {
            let depth = check_node(&bvh, root);
            // Median split keeps the tree balanced
            let max_depth = (field.len() as f64).log2().ceil() as usize + 1;
            assert!(depth <= max_depth);
        }
    }

    #[proptest]
    fn rebuild_is_deterministic(
        #[strategy(sphere_field())] field: Vec<(FloatType, FloatType, FloatType, FloatType)>,
    ) {
        let shapes: IndexVec<ShapeIdx, _> = field.iter().map(|&(x, y, z, r)| sphere(x, y, z, r)).collect();
        let first = Bvh::build(shapes.clone(), &settings(2));
        let second = Bvh::build(shapes, &settings(2));

        assert!(first.leaves() == second.leaves());
        assert!(first.root == second.root);
    }
}
