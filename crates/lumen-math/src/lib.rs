//! f32 bounding boxes and view-frustum planes shared by the Lumen spatial crates.

mod aabb;
pub mod frustum;

pub use aabb::Aabb;
pub use frustum::{Frustum, signed_distance};
pub use glam::{Mat3, Mat4, Vec3, Vec4};
