use itertools::Itertools as _;
use nalgebra::Unit;

use crate::{
    error::{Error, Result},
    geometry::{BoundingBox, EPSILON, Ray, SurfaceHit, WorldPoint, WorldVector},
    scene::Shape,
};

/// Convex planar polygon.
/// Vertices are given in order around the boundary, the normal follows the right hand rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<WorldPoint>,
    normal: Unit<WorldVector>,
    bounding_box: BoundingBox,
}

impl Polygon {
    pub fn new(vertices: Vec<WorldPoint>) -> Result<Polygon> {
        if vertices.len() < 3 {
            return Err(Error::invalid_argument(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if !vertices
            .iter()
            .flat_map(|v| v.coords.iter())
            .all(|x| x.is_finite())
        {
            return Err(Error::invalid_argument("polygon vertices must be finite"));
        }

        let normal = Unit::try_new(
            (vertices[1] - vertices[0]).cross(&(vertices[2] - vertices[1])),
            EPSILON,
        )
        .ok_or_else(|| Error::invalid_argument("first three polygon vertices are collinear"))?;

        let bounding_box = BoundingBox::from_points(&vertices);
        let tolerance = EPSILON * (1.0 + bounding_box.size().max());

        if vertices
            .iter()
            .any(|v| normal.dot(&(*v - vertices[0])).abs() > tolerance)
        {
            return Err(Error::invalid_argument("polygon vertices are not coplanar"));
        }

        // Every turn must go the same way as the first one
        for (a, b, c) in vertices.iter().circular_tuple_windows() {
            let turn = (b - a).cross(&(c - b)).dot(&normal);
            if turn <= tolerance {
                return Err(Error::invalid_argument(
                    "polygon must be strictly convex",
                ));
            }
        }

        Ok(Polygon {
            vertices,
            normal,
            bounding_box,
        })
    }

    pub fn vertices(&self) -> &[WorldPoint] {
        &self.vertices
    }

    pub fn normal(&self) -> &Unit<WorldVector> {
        &self.normal
    }
}

impl Shape for Polygon {
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let denominator = self.normal.dot(ray.direction().as_ref());
        if denominator.abs() <= EPSILON {
            return None;
        }

        let t = self.normal.dot(&(self.vertices[0] - *ray.origin())) / denominator;
        if t < 0.0 {
            return None;
        }

        // Inside (or on the boundary) iff the point is on the inner side of every edge
        let point = ray.point_at(t);
        let inside = self
            .vertices
            .iter()
            .circular_tuple_windows()
            .all(|(a, b)| (b - a).cross(&(point - *a)).dot(&self.normal) >= 0.0);

        if inside {
            Some(SurfaceHit {
                t,
                point,
                normal: self.normal,
            })
        } else {
            None
        }
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(self.bounding_box)
    }
}
