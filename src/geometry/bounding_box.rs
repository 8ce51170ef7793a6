use super::{FloatType, WorldPoint, WorldVector};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Axis aligned bounding box.
///
/// The empty box is represented with min = +inf and max = -inf on every axis,
/// so that it is the identity of `union`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    min: WorldPoint,
    max: WorldPoint,
}

impl BoundingBox {
    pub fn empty() -> BoundingBox {
        BoundingBox {
            min: WorldPoint::new(FloatType::INFINITY, FloatType::INFINITY, FloatType::INFINITY),
            max: WorldPoint::new(
                FloatType::NEG_INFINITY,
                FloatType::NEG_INFINITY,
                FloatType::NEG_INFINITY,
            ),
        }
    }

    /// Smallest box containing both corner points, in any order.
    pub fn from_corners(a: &WorldPoint, b: &WorldPoint) -> BoundingBox {
        BoundingBox {
            min: a.inf(b),
            max: a.sup(b),
        }
    }

    /// Smallest box containing all the points, empty box for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> BoundingBox {
        points
            .into_iter()
            .fold(BoundingBox::empty(), |b, p| b.include_point(p))
    }

    pub fn min(&self) -> &WorldPoint {
        &self.min
    }

    pub fn max(&self) -> &WorldPoint {
        &self.max
    }

    pub fn is_empty(&self) -> bool {
        Axis::ALL
            .iter()
            .any(|axis| self.min[axis.index()] > self.max[axis.index()])
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn include_point(&self, point: &WorldPoint) -> BoundingBox {
        BoundingBox {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }

    /// Returns true if `other` lies completely inside this box (boundary inclusive).
    /// Every box contains the empty box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        if other.is_empty() {
            return true;
        }
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    pub fn contains_point(&self, point: &WorldPoint) -> bool {
        Axis::ALL.iter().all(|axis| {
            let i = axis.index();
            self.min[i] <= point[i] && point[i] <= self.max[i]
        })
    }

    pub fn size(&self) -> WorldVector {
        self.max - self.min
    }

    pub fn centroid(&self) -> WorldPoint {
        WorldPoint::from((self.min.coords + self.max.coords) / 2.0)
    }

    /// Axis along which the box is the longest. Ties go to the earlier axis.
    pub fn largest_axis(&self) -> Axis {
        let size = self.size();
        Axis::ALL
            .into_iter()
            .fold(Axis::X, |best, axis| {
                if size[axis.index()] > size[best.index()] {
                    axis
                } else {
                    best
                }
            })
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::empty()
    }
}
