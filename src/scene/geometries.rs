use std::sync::{Arc, OnceLock};

use index_vec::IndexVec;
use ordered_float::OrderedFloat;

use super::{
    Intersectable, Shape,
    bvh::{Bvh, BvhSettings, BvhStatistics},
};
use crate::geometry::{BoundingBox, FloatType, Ray, SurfaceHit};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum QueryMode {
    /// Only the closest hit
    #[default]
    Nearest,
    /// Every hit shape, ordered by distance
    All,
}

/// Hit of a shape inside a `Geometries` container.
#[derive(Clone, Debug)]
pub struct Intersection<'a> {
    pub shape: &'a dyn Shape,
    /// Position of the shape in the depth first walk over the container (nested
    /// containers included), i.e. in insertion order.
    pub index: usize,
    pub hit: SurfaceHit,
}

impl Intersection<'_> {
    fn sort_key(&self) -> (OrderedFloat<FloatType>, usize) {
        (OrderedFloat(self.hit.t), self.index)
    }

    /// Closer along the ray, equal distances go to the earlier added shape.
    pub fn is_closer_than(&self, other: &Intersection<'_>) -> bool {
        self.sort_key() < other.sort_key()
    }
}

pub(crate) fn keep_closest<'a>(best: &mut Option<Intersection<'a>>, candidate: Intersection<'a>) {
    if best.as_ref().is_none_or(|b| candidate.is_closer_than(b)) {
        *best = Some(candidate);
    }
}

#[derive(Clone, Debug)]
pub enum Intersections<'a> {
    Nearest(Option<Intersection<'a>>),
    All(Vec<Intersection<'a>>),
}

impl<'a> Intersections<'a> {
    pub fn is_empty(&self) -> bool {
        match self {
            Intersections::Nearest(nearest) => nearest.is_none(),
            Intersections::All(all) => all.is_empty(),
        }
    }

    pub fn into_vec(self) -> Vec<Intersection<'a>> {
        match self {
            Intersections::Nearest(nearest) => nearest.into_iter().collect(),
            Intersections::All(all) => all,
        }
    }
}

/// Append only collection of shapes and nested containers, answering ray queries
/// either by testing every shape or through a bounding volume hierarchy.
///
/// The hierarchy is built on the first accelerated query and dropped whenever
/// entries are added. Queries only need `&self`, so a prepared container can be
/// shared between threads.
#[derive(Clone, Debug, Default)]
pub struct Geometries {
    entries: Vec<Intersectable>,
    acceleration_enabled: bool,
    settings: BvhSettings,
    bvh: OnceLock<Bvh>,
}

impl Geometries {
    pub fn new() -> Geometries {
        Geometries::default()
    }

    pub fn with_settings(settings: BvhSettings) -> Geometries {
        Geometries {
            settings,
            ..Geometries::default()
        }
    }

    pub fn settings(&self) -> &BvhSettings {
        &self.settings
    }

    pub fn add<I>(&mut self, entries: I)
    where
        I: IntoIterator,
        I::Item: Into<Intersectable>,
    {
        let old_len = self.entries.len();
        self.entries.extend(entries.into_iter().map(Into::into));

        if self.entries.len() > old_len && self.bvh.take().is_some() {
            tracing::trace!(
                added = self.entries.len() - old_len,
                "Entries added, dropping the BVH"
            );
        }
    }

    pub fn entries(&self) -> &[Intersectable] {
        &self.entries
    }

    /// Number of top level entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of shapes, nested containers included
    pub fn shape_count(&self) -> usize {
        let mut count = 0;
        self.visit_shapes(&mut 0, &mut |_, _| count += 1);
        count
    }

    pub fn set_acceleration_enabled(&mut self, enabled: bool) {
        if enabled != self.acceleration_enabled {
            tracing::trace!(enabled, "Switching BVH acceleration");
        }
        self.acceleration_enabled = enabled;
    }

    pub fn is_acceleration_enabled(&self) -> bool {
        self.acceleration_enabled
    }

    /// Union of the entries' boxes, None if any entry is unbounded.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.entries
            .iter()
            .try_fold(BoundingBox::empty(), |acc, entry| {
                entry.bounding_box().map(|b| acc.union(&b))
            })
    }

    pub fn find_intersections(&self, ray: &Ray, mode: QueryMode) -> Intersections<'_> {
        match mode {
            QueryMode::Nearest => Intersections::Nearest(self.find_nearest(ray)),
            QueryMode::All => Intersections::All(self.find_all(ray)),
        }
    }

    pub fn find_nearest(&self, ray: &Ray) -> Option<Intersection<'_>> {
        if self.acceleration_enabled {
            self.bvh().find_nearest(ray)
        } else {
            let mut best = None;
            self.visit_shapes(&mut 0, &mut |index, shape| {
                if let Some(candidate) = intersect_shape(shape, index, ray) {
                    keep_closest(&mut best, candidate);
                }
            });
            best
        }
    }

    /// Hits of all shapes, sorted by distance then by insertion order.
    pub fn find_all(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        let mut hits = if self.acceleration_enabled {
            self.bvh().find_all(ray)
        } else {
            let mut hits = Vec::new();
            self.visit_shapes(&mut 0, &mut |index, shape| {
                hits.extend(intersect_shape(shape, index, ray));
            });
            hits
        };
        hits.sort_by_key(Intersection::sort_key);
        hits
    }

    /// Statistics of the hierarchy, building it if needed.
    /// None when acceleration is disabled.
    pub fn bvh_statistics(&self) -> Option<BvhStatistics> {
        self.acceleration_enabled
            .then(|| self.bvh().statistics())
    }

    fn bvh(&self) -> &Bvh {
        self.bvh.get_or_init(|| {
            let mut shapes = IndexVec::with_capacity(self.entries.len());
            self.visit_shapes(&mut 0, &mut |_, shape| {
                shapes.push(Arc::clone(shape));
            });
            Bvh::build(shapes, &self.settings)
        })
    }

    /// Calls `f` for every shape in depth first order, with its position in that order.
    fn visit_shapes<'a>(
        &'a self,
        next_index: &mut usize,
        f: &mut impl FnMut(usize, &'a Arc<dyn Shape>),
    ) {
        for entry in &self.entries {
            match entry {
                Intersectable::Shape(shape) => {
                    f(*next_index, shape);
                    *next_index += 1;
                }
                Intersectable::Composite(nested) => nested.visit_shapes(next_index, f),
            }
        }
    }
}

fn intersect_shape<'a>(
    shape: &'a Arc<dyn Shape>,
    index: usize,
    ray: &Ray,
) -> Option<Intersection<'a>> {
    shape.intersect(ray).map(|hit| Intersection {
        shape: shape.as_ref(),
        index,
        hit,
    })
}
