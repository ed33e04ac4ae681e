pub mod points;
pub mod transform;

pub use points::{CartesianPoints, HomogeneousPoints, PointSet};
pub use transform::PointTransform;
