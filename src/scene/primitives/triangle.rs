use nalgebra::Unit;

use crate::{
    error::{Error, Result},
    geometry::{BoundingBox, EPSILON, Ray, SurfaceHit, WorldPoint, WorldVector},
    scene::Shape,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    vertices: [WorldPoint; 3],
    /// Edge vectors, coming from vertices[0]
    edges: [WorldVector; 2],
    normal: Unit<WorldVector>,
}

impl Triangle {
    pub fn new(a: WorldPoint, b: WorldPoint, c: WorldPoint) -> Result<Triangle> {
        let vertices = [a, b, c];
        if !vertices
            .iter()
            .flat_map(|v| v.coords.iter())
            .all(|x| x.is_finite())
        {
            return Err(Error::invalid_argument("triangle vertices must be finite"));
        }

        let edges = [b - a, c - a];
        let normal = Unit::try_new(edges[0].cross(&edges[1]), EPSILON)
            .ok_or_else(|| Error::invalid_argument("triangle must have non-zero area"))?;

        Ok(Triangle {
            vertices,
            edges,
            normal,
        })
    }

    pub fn vertices(&self) -> &[WorldPoint; 3] {
        &self.vertices
    }

    pub fn normal(&self) -> &Unit<WorldVector> {
        &self.normal
    }
}

impl Shape for Triangle {
    /// Two sided Möller–Trumbore intersection, edges and vertices count as hits.
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let [e1, e2] = &self.edges;
        let direction = ray.direction().as_ref();

        let ray_cross_e2 = direction.cross(e2);
        let det = e1.dot(&ray_cross_e2);
        if det.abs() <= EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = *ray.origin() - self.vertices[0];
        let u = inv_det * s.dot(&ray_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let s_cross_e1 = s.cross(e1);
        let v = inv_det * direction.dot(&s_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * e2.dot(&s_cross_e1);
        if t < 0.0 {
            return None;
        }

        Some(SurfaceHit::new(ray, t, self.normal))
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(BoundingBox::from_points(&self.vertices))
    }
}
