mod plane;
mod polygon;
mod sphere;
mod triangle;

pub use plane::Plane;
pub use polygon::Polygon;
pub use sphere::Sphere;
pub use triangle::Triangle;

use super::Intersectable;

macro_rules! impl_into_intersectable {
    ( $( $shape:ty ),* ) => {
        $(
            impl From<$shape> for Intersectable {
                fn from(value: $shape) -> Self {
                    Intersectable::shape(value)
                }
            }
        )*
    };
}

impl_into_intersectable!(Sphere, Plane, Triangle, Polygon);
