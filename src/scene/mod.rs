mod bvh;
mod geometries;
pub mod primitives;

use std::{fmt::Debug, sync::Arc};

use crate::geometry::{BoundingBox, Ray, SurfaceHit};

pub use bvh::{BvhSettings, BvhStatistics};
pub use geometries::{Geometries, Intersection, Intersections, QueryMode};

/// Anything a ray can be tested against.
///
/// Implementations must keep every hit they report inside their bounding box,
/// the acceleration structure relies on it to skip the shape.
pub trait Shape: Debug + Send + Sync {
    /// Closest intersection with the ray at distance >= 0, if any.
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit>;

    /// Box enclosing the whole shape, or None if the shape is unbounded (e.g. an infinite plane).
    fn bounding_box(&self) -> Option<BoundingBox>;
}

/// Top level entry of a `Geometries` container.
#[derive(Clone, Debug)]
pub enum Intersectable {
    Shape(Arc<dyn Shape>),
    /// Nested container. Its shapes are flattened into the parent for queries.
    Composite(Geometries),
}

impl Intersectable {
    pub fn shape(shape: impl Shape + 'static) -> Intersectable {
        Intersectable::Shape(Arc::new(shape))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Intersectable::Shape(shape) => shape.bounding_box(),
            Intersectable::Composite(geometries) => geometries.bounding_box(),
        }
    }
}

impl From<Arc<dyn Shape>> for Intersectable {
    fn from(value: Arc<dyn Shape>) -> Self {
        Intersectable::Shape(value)
    }
}

impl From<Geometries> for Intersectable {
    fn from(value: Geometries) -> Self {
        Intersectable::Composite(value)
    }
}

/// The geometry part of a renderable scene.
#[derive(Clone, Debug)]
pub struct Scene {
    name: String,
    geometries: Geometries,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Scene {
        Scene::with_geometries(name, Geometries::new())
    }

    pub fn with_geometries(name: impl Into<String>, geometries: Geometries) -> Scene {
        Scene {
            name: name.into(),
            geometries,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometries(&self) -> &Geometries {
        &self.geometries
    }

    pub fn add_geometries<I>(&mut self, entries: I)
    where
        I: IntoIterator,
        I::Item: Into<Intersectable>,
    {
        self.geometries.add(entries);
    }

    pub fn set_acceleration_enabled(&mut self, enabled: bool) {
        self.geometries.set_acceleration_enabled(enabled);
    }

    pub fn find_intersections(&self, ray: &Ray, mode: QueryMode) -> Intersections<'_> {
        self.geometries.find_intersections(ray, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{WorldPoint, WorldVector};
    use assert2::{assert, let_assert};
    use primitives::{Plane, Sphere};

    #[test]
    fn scene_forwards_to_geometries() {
        let mut scene = Scene::new("spheres");
        scene.add_geometries([
            Sphere::new(WorldPoint::new(0.0, 0.0, 5.0), 1.0).unwrap(),
            Sphere::new(WorldPoint::new(0.0, 0.0, 10.0), 1.0).unwrap(),
        ]);
        scene.set_acceleration_enabled(true);

        assert!(scene.name() == "spheres");
        assert!(scene.geometries().len() == 2);
        assert!(scene.geometries().is_acceleration_enabled());

        let ray = Ray::new(WorldPoint::origin(), WorldVector::z()).unwrap();
        let_assert!(Intersections::Nearest(Some(nearest)) = scene.find_intersections(&ray, QueryMode::Nearest));
        assert!(nearest.index == 0);
        assert!((nearest.hit.t - 4.0).abs() < 1e-9);
    }

    #[test]
    fn composite_bounding_box() {
        let mut inner = Geometries::new();
        inner.add([Sphere::new(WorldPoint::new(5.0, 0.0, 0.0), 1.0).unwrap()]);
        let mut outer = Geometries::new();
        outer.add([Intersectable::shape(Sphere::new(WorldPoint::origin(), 1.0).unwrap()), inner.into()]);

        let_assert!(Some(bb) = Intersectable::from(outer.clone()).bounding_box());
        assert!(*bb.min() == WorldPoint::new(-1.0, -1.0, -1.0));
        assert!(*bb.max() == WorldPoint::new(6.0, 1.0, 1.0));

        outer.add([Plane::new(WorldPoint::origin(), WorldVector::z()).unwrap()]);
        assert!(Intersectable::from(outer).bounding_box().is_none());
    }
}
