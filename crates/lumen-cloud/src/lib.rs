//! Point storage for the Lumen spatial index: the `Point` value type and an
//! ordered `PointCloud` that keeps its bounding box current across mutation.

mod cloud;
mod error;
mod point;

pub use cloud::PointCloud;
pub use error::CloudError;
pub use point::Point;
