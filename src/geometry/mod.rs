mod bounding_box;
mod ray_box_intersection;

use nalgebra::{Point3, Unit, Vector3};

use crate::error::{Error, Result};

pub use bounding_box::{Axis, BoundingBox};
pub use ray_box_intersection::RayIntersectionExt;

pub type FloatType = f64;
pub type WorldPoint = Point3<FloatType>;
pub type WorldVector = Vector3<FloatType>;

/// Tolerance used by the primitives for parallelism and degeneracy checks.
pub const EPSILON: FloatType = 1e-9;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    origin: WorldPoint,
    /// Normalized direction of the ray
    direction: Unit<WorldVector>,

    /// Componentwise inverse of the ray direction
    /// Zeros in direction get turned into positive infinity regardless of the sign of the zero
    inv_direction: WorldVector,
}

impl Ray {
    /// Creates a ray starting at `origin`, going along `direction`.
    /// Fails if the direction has zero length or any coordinate is not finite.
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Result<Ray> {
        if !origin.coords.iter().all(|x| x.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "ray origin must be finite, got {origin:?}"
            )));
        }
        if !direction.iter().all(|x| x.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "ray direction must be finite, got {direction:?}"
            )));
        }
        let direction = Unit::try_new(direction, 0.0)
            .ok_or_else(|| Error::invalid_argument("ray direction must be non-zero"))?;
        let inv_direction = direction.map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        Ok(Ray {
            origin,
            direction,
            inv_direction,
        })
    }

    pub fn origin(&self) -> &WorldPoint {
        &self.origin
    }

    pub fn direction(&self) -> &Unit<WorldVector> {
        &self.direction
    }

    pub fn inv_direction(&self) -> &WorldVector {
        &self.inv_direction
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction.as_ref() * distance
    }
}

/// A single ray / surface intersection, as reported by a primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceHit {
    /// Distance along the ray, always >= 0
    pub t: FloatType,
    pub point: WorldPoint,
    pub normal: Unit<WorldVector>,
}

impl SurfaceHit {
    pub(crate) fn new(ray: &Ray, t: FloatType, normal: Unit<WorldVector>) -> SurfaceHit {
        SurfaceHit {
            t,
            point: ray.point_at(t),
            normal,
        }
    }
}
