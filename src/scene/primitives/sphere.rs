use nalgebra::Unit;

use crate::{
    error::{Error, Result},
    geometry::{BoundingBox, FloatType, Ray, SurfaceHit, WorldPoint, WorldVector},
    scene::Shape,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    center: WorldPoint,
    radius: FloatType,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType) -> Result<Sphere> {
        if !center.coords.iter().all(|x| x.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "sphere center must be finite, got {center:?}"
            )));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::invalid_argument(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        Ok(Sphere { center, radius })
    }

    pub fn center(&self) -> &WorldPoint {
        &self.center
    }

    pub fn radius(&self) -> FloatType {
        self.radius
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let oc = *ray.origin() - self.center;
        let b = oc.dot(ray.direction().as_ref());
        let c = oc.dot(&oc) - self.radius * self.radius;
        let discriminant = b * b - c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = -b - sqrt_disc;
        let t2 = -b + sqrt_disc;
        let t = if t1 >= 0.0 {
            t1
        } else if t2 >= 0.0 {
            t2
        } else {
            return None;
        };

        let point = ray.point_at(t);
        let normal = Unit::new_normalize(point - self.center);

        Some(SurfaceHit { t, point, normal })
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        let r_vec = WorldVector::repeat(self.radius);
        Some(BoundingBox::from_corners(
            &(self.center - r_vec),
            &(self.center + r_vec),
        ))
    }
}
