use super::{BoundingBox, FloatType, Ray};

/// Relative widening of the far end of the slab interval.
/// Covers the rounding of the three products, so that a point computed by the
/// primitives' own math is never reported as outside its box.
const FAR_T_SCALE: FloatType = 1.0 + 2.0 * gamma(3);

const fn gamma(n: i32) -> FloatType {
    let e = FloatType::EPSILON * 0.5;
    (n as FloatType * e) / (1.0 - n as FloatType * e)
}

pub trait RayIntersectionExt {
    /// Calculate first and last ray intersection with the box
    fn intersect(&self, ray: &Ray) -> (FloatType, FloatType);

    /// Ray parameter interval where the ray is inside the box, limited to `0..=max_t`.
    /// Returns None if the interval is empty. Boundaries are inclusive.
    fn intersect_range(&self, ray: &Ray, max_t: FloatType) -> Option<(FloatType, FloatType)> {
        let (t1, t2) = self.intersect(ray);
        let t1 = t1.max(0.0);
        let t2 = t2.min(max_t);
        if t1 <= t2 { Some((t1, t2)) } else { None }
    }

    fn intersects_ray(&self, ray: &Ray) -> bool {
        self.intersect_range(ray, FloatType::INFINITY).is_some()
    }
}

impl RayIntersectionExt for BoundingBox {
    /// Calculates ray intersection with the box.
    /// Returns minimum and maximum distance along the ray, ray intersects is min <= max.
    /// The distances are unbounded, they may be negative if the box is behind the ray origin.
    fn intersect(&self, ray: &Ray) -> (FloatType, FloatType) {
        if self.is_empty() {
            return (FloatType::INFINITY, FloatType::NEG_INFINITY);
        }

        // Componentwise distances along the ray to the box's min and max corners
        // The multiplication is NAN if the ray is starting inside the slab bounding plane
        // and is parallel to it. In this case we replace with +-infinity, so that the range becomes infinite
        let to_box_min = (self.min() - ray.origin())
            .component_mul(ray.inv_direction())
            .map(|x| if x.is_nan() { FloatType::NEG_INFINITY } else { x });
        let to_box_max = (self.max() - ray.origin())
            .component_mul(ray.inv_direction())
            .map(|x| if x.is_nan() { FloatType::INFINITY } else { x });

        // Correctly ordered (min_t <= max_t)
        let componentwise_min_t = to_box_min.zip_map(&to_box_max, |a, b| a.min(b));
        let componentwise_max_t = to_box_min.zip_map(&to_box_max, |a, b| a.max(b));

        let min_t = componentwise_min_t.max();
        let max_t = componentwise_max_t.min() * FAR_T_SCALE;

        (min_t, max_t)
    }
}

#[cfg(test)]
pub mod test {
    use assert2::{assert, let_assert};
    use test_case::{test_case, test_matrix};
    use test_strategy::proptest;

    use super::*;

    use crate::geometry::{WorldPoint, WorldVector, test::RayWrapper};

    fn test_box() -> BoundingBox {
        BoundingBox::from_corners(&WorldPoint::new(5.0, 5.0, 5.0), &WorldPoint::new(10.0, 10.0, 10.0))
    }

    /// Checks cases when the ray hits the box, including some corner cases.
    #[test_matrix(
        [5.0, 7.0, 10.0],
        [5.0, 7.0, 10.0],
        [5.0, 7.0, 10.0],
        [-1.0, 0.0, 2.0],
        [-1.0, 0.0, 2.0],
        [-1.0, 0.0, 2.0],
        [-10.0, -1.0, 0.0, 2.0, 5.0, 20.0]
    )]
    fn hit(
        px: FloatType,
        py: FloatType,
        pz: FloatType,
        dx: FloatType,
        dy: FloatType,
        dz: FloatType,
        origin_pos: FloatType,
    ) {
        if dx == 0.0 && dy == 0.0 && dz == 0.0 {
            return;
        }

        let b = test_box();

        let p = WorldPoint::new(px, py, pz);
        let d = WorldVector::new(dx, dy, dz);
        let temp_r = Ray::new(p, d).unwrap();
        let origin = temp_r.point_at(origin_pos);
        let r = Ray::new(origin, d).unwrap();

        let (t1, t2) = r_intersect(&b, &r)
            .expect("The ray passes through a point in/on the box, we should always have an intersection");

        let p1 = r.point_at(t1);
        let p2 = r.point_at(t2);

        assert!(point_is_on_box_surface(&p1, &b), "{p1:?} must be in {b:?}");
        assert!(point_is_on_box_surface(&p2, &b), "{p2:?} must be in {b:?}");
    }

    /// Unclamped interval, with near-equal ends snapped together.
    fn r_intersect(b: &BoundingBox, r: &Ray) -> Option<(FloatType, FloatType)> {
        const TOLERANCE: FloatType = 1e-9;

        let (t1, t2) = b.intersect(r);
        if t1 <= t2 {
            Some((t1, t2))
        } else if t1 <= t2 + TOLERANCE {
            let t = (t1 + t2) / 2.0;
            Some((t, t))
        } else {
            None
        }
    }

    /// Just a manual example of ray grazing along an edge.
    #[test]
    fn hit_along_edge() {
        let b = test_box();

        let r = Ray::new(
            WorldPoint::new(5.0, 5.0, 0.0),
            WorldVector::new(0.0, 0.0, 1.0),
        )
        .unwrap();

        let (t1, t2) = b.intersect(&r);
        assert!(t1 == 5.0);
        assert!((t2 - 10.0).abs() < 1e-12);
        assert!(b.intersects_ray(&r));
    }

    /// Rays that lie parallel to one axis and start outside the corresponding slab
    /// must miss, even if they move toward the box on other axes or remain unchanged.
    #[test_case( 0.0,  7.0,  7.0,   0.0, 1.0, 0.0 ; "low_x_parallel_miss")]
    #[test_case(12.0,  7.0,  7.0,   0.0, 1.0, 0.0 ; "high_x_parallel_miss")]
    #[test_case( 7.0,  0.0,  7.0,   1.0, 0.0, 0.0 ; "low_y_parallel_miss")]
    #[test_case( 7.0, 12.0,  7.0,   1.0, 0.0, 0.0 ; "high_y_parallel_miss")]
    #[test_case( 7.0,  7.0,  0.0,   1.0, 0.0, 0.0 ; "low_z_parallel_miss")]
    #[test_case( 7.0,  7.0, 12.0,   1.0, 0.0, 0.0 ; "high_z_parallel_miss")]
    #[test_case( 0.0,  5.0,  7.0,   1.0, 0.0, 1.0 ; "corner_miss")]
    #[test_case( 0.0,  0.0,  0.0,  -1.0, 1.0, 1.0 ; "corner_miss2")]
    #[test_case(12.0,  7.0,  7.0,   1.0, 0.0, 0.0 ; "box_behind_origin")]
    fn only_misses(px: FloatType, py: FloatType, pz: FloatType, dx: FloatType, dy: FloatType, dz: FloatType) {
        let b = test_box();
        let r = Ray::new(WorldPoint::new(px, py, pz), WorldVector::new(dx, dy, dz)).unwrap();

        assert!(!b.intersects_ray(&r));
    }

    #[test]
    fn origin_inside_box_hits() {
        let b = test_box();
        let r = Ray::new(WorldPoint::new(7.0, 7.0, 7.0), WorldVector::new(0.0, 0.0, -1.0)).unwrap();

        let_assert!(Some((t1, t2)) = b.intersect_range(&r, FloatType::INFINITY));
        assert!(t1 == 0.0);
        assert!(t2 > 0.0);
    }

    #[test]
    fn max_t_limits_range() {
        let b = test_box();
        let r = Ray::new(WorldPoint::new(7.0, 7.0, 0.0), WorldVector::new(0.0, 0.0, 1.0)).unwrap();

        assert!(b.intersect_range(&r, 4.0).is_none());
        assert!(b.intersect_range(&r, 5.0).is_some());
    }

    #[proptest]
    fn empty_box_never_hits(r: RayWrapper) {
        assert!(!BoundingBox::empty().intersects_ray(&r));
    }

    #[proptest]
    fn box_around_origin_always_hits(r: RayWrapper) {
        let b = BoundingBox::from_corners(r.origin(), &(r.origin() + WorldVector::new(1.0, 1.0, 1.0)));
        assert!(b.intersects_ray(&r));
    }

    fn point_is_on_box_surface(p: &WorldPoint, b: &BoundingBox) -> bool {
        const TOLERANCE: FloatType = 1e-6;

        let (min, max) = (b.min(), b.max());
        let within = |i: usize| p[i] >= min[i] - TOLERANCE && p[i] <= max[i] + TOLERANCE;
        let on_face =
            |i: usize| (p[i] - min[i]).abs() <= TOLERANCE || (p[i] - max[i]).abs() <= TOLERANCE;

        if !(within(0) && within(1) && within(2)) {
            return false; // outside the box entirely
        }

        on_face(0) || on_face(1) || on_face(2)
    }
}
