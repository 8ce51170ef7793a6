use arrayvec::ArrayVec;
use assert2::debug_assert;

use super::{Bvh, BvhNode, ShapeIdx};
use crate::{
    geometry::{FloatType, Ray, RayIntersectionExt as _},
    scene::geometries::{Intersection, keep_closest},
};

/// Capacity of the traversal stack.
/// Median split keeps the depth at most log2(shape count) + 1, well below this for u32 indices.
const MAX_STACK_DEPTH: usize = 64;

/// Relative slack on the best distance when pruning nodes.
/// A shape's own distance can come out a few ulps below its box's entry distance,
/// and a lower index shape at an equal distance must still be reached.
const PRUNE_T_SCALE: FloatType = 1.0 + 16.0 * FloatType::EPSILON;

type NodeStack<'a> = ArrayVec<(&'a BvhNode, FloatType), MAX_STACK_DEPTH>;

impl Bvh {
    pub fn find_nearest(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let mut best = None;

        for index in self.unbounded.iter().copied() {
            if let Some(candidate) = self.intersect_shape(index, ray) {
                keep_closest(&mut best, candidate);
            }
        }

        let Some(root) = &self.root else {
            return best;
        };

        let mut stack = NodeStack::new();
        if let Some((t1, _)) = root.bounding_box().intersect_range(ray, prune_t(&best)) {
            stack.push((root, t1));
        }

        while let Some((node, node_t1)) = stack.pop() {
            if node_t1 > prune_t(&best) {
                // If the node's minimum intersection distance is further away than the best
                // hit found so far, the node can't do any good any more and we can skip it.
                continue;
            }

            match node {
                BvhNode::Leaf { shapes, .. } => {
                    debug_assert!(!shapes.is_empty());
                    for index in shapes.iter().copied() {
                        if let Some(candidate) = self.intersect_shape(index, ray) {
                            keep_closest(&mut best, candidate);
                        }
                    }
                }
                BvhNode::Inner { children, .. } => {
                    let max_t = prune_t(&best);
                    let [a, b] = &**children;
                    let hit_a = a.bounding_box().intersect_range(ray, max_t);
                    let hit_b = b.bounding_box().intersect_range(ray, max_t);

                    // Nearer child goes on the stack last, to be popped first
                    match (hit_a, hit_b) {
                        (Some((ta, _)), Some((tb, _))) => {
                            if ta <= tb {
                                stack.push((b, tb));
                                stack.push((a, ta));
                            } else {
                                stack.push((a, ta));
                                stack.push((b, tb));
                            }
                        }
                        (Some((ta, _)), None) => stack.push((a, ta)),
                        (None, Some((tb, _))) => stack.push((b, tb)),
                        (None, None) => {}
                    }
                }
            }
        }

        best
    }

    /// All hits, in no particular order.
    pub fn find_all(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        let mut hits: Vec<_> = self
            .unbounded
            .iter()
            .filter_map(|index| self.intersect_shape(*index, ray))
            .collect();

        let mut stack: ArrayVec<&BvhNode, MAX_STACK_DEPTH> = ArrayVec::new();
        stack.extend(
            self.root
                .iter()
                .filter(|root| root.bounding_box().intersects_ray(ray)),
        );

        while let Some(node) = stack.pop() {
            match node {
                BvhNode::Leaf { shapes, .. } => {
                    hits.extend(
                        shapes
                            .iter()
                            .filter_map(|index| self.intersect_shape(*index, ray)),
                    );
                }
                BvhNode::Inner { children, .. } => {
                    stack.extend(
                        children
                            .iter()
                            .filter(|child| child.bounding_box().intersects_ray(ray)),
                    );
                }
            }
        }

        hits
    }

    fn intersect_shape(&self, index: ShapeIdx, ray: &Ray) -> Option<Intersection<'_>> {
        let shape = &self.shapes[index];
        shape.intersect(ray).map(|hit| Intersection {
            shape: shape.as_ref(),
            index: index.index(),
            hit,
        })
    }
}

/// Largest box entry distance that can still hold a hit at least as good as `best`.
fn prune_t(best: &Option<Intersection>) -> FloatType {
    best.as_ref()
        .map_or(FloatType::INFINITY, |b| b.hit.t * PRUNE_T_SCALE)
}
