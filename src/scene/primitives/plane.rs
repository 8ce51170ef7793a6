use nalgebra::Unit;

use crate::{
    error::{Error, Result},
    geometry::{BoundingBox, EPSILON, Ray, SurfaceHit, WorldPoint, WorldVector},
    scene::Shape,
};

/// Infinite plane. Has no bounding box, so it is tested against every ray.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    point: WorldPoint,
    normal: Unit<WorldVector>,
}

impl Plane {
    pub fn new(point: WorldPoint, normal: WorldVector) -> Result<Plane> {
        if !point.coords.iter().chain(normal.iter()).all(|x| x.is_finite()) {
            return Err(Error::invalid_argument("plane point and normal must be finite"));
        }
        let normal = Unit::try_new(normal, EPSILON)
            .ok_or_else(|| Error::invalid_argument("plane normal must be non-zero"))?;
        Ok(Plane { point, normal })
    }

    /// Plane through three points, normal oriented by the right hand rule.
    pub fn from_points(a: &WorldPoint, b: &WorldPoint, c: &WorldPoint) -> Result<Plane> {
        let normal = (b - a).cross(&(c - a));
        if normal.norm() <= EPSILON {
            return Err(Error::invalid_argument(
                "plane points must not be collinear",
            ));
        }
        Plane::new(*a, normal)
    }

    pub fn point(&self) -> &WorldPoint {
        &self.point
    }

    pub fn normal(&self) -> &Unit<WorldVector> {
        &self.normal
    }
}

impl Shape for Plane {
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let denominator = self.normal.dot(ray.direction().as_ref());
        if denominator.abs() <= EPSILON {
            // Parallel, possibly lying in the plane. Neither counts as a hit.
            return None;
        }

        let t = self.normal.dot(&(self.point - *ray.origin())) / denominator;
        if t < 0.0 {
            return None;
        }

        Some(SurfaceHit::new(ray, t, self.normal))
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        None
    }
}
