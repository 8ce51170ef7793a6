mod error;
pub mod geometry;
pub mod scene;
mod util;

pub use error::{Error, Result};
pub use geometry::{Ray, SurfaceHit};
pub use scene::{
    BvhSettings, BvhStatistics, Geometries, Intersectable, Intersection, Intersections, QueryMode,
    Scene, Shape,
};
pub use util::Stats;
