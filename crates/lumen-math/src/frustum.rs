//! View frustum as six half-spaces in f32 space.
//!
//! Planes use the `(nx, ny, nz, d)` convention: a point `p` is inside a
//! plane when `n·p + d >= 0`, and inside the frustum when it is inside all
//! six. Camera collaborators must produce planes in exactly this sign
//! convention.

use glam::{Mat4, Vec3, Vec4};

use crate::Aabb;

/// Plane indices into the frustum planes array.
pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;
pub const BOTTOM: usize = 2;
pub const TOP: usize = 3;
pub const NEAR: usize = 4;
pub const FAR: usize = 5;

/// Signed distance of `point` to `plane` (`n·p + d`).
///
/// Only a true Euclidean distance when the plane normal is unit length.
#[inline]
pub fn signed_distance(plane: Vec4, point: Vec3) -> f32 {
    plane.truncate().dot(point) + plane.w
}

/// Six inward-facing planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    /// Each `Vec4(a, b, c, d)` where `(a,b,c)` is the inward normal and
    /// `d` is the offset term.
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Wrap six planes as given. Planes are neither normalized nor validated.
    pub fn new(planes: [Vec4; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a combined view-projection matrix
    /// using the Gribb-Hartmann method, for OpenGL clip space
    /// (`-w <= z <= w`, e.g. [`Mat4::perspective_rh_gl`]).
    ///
    /// Planes with a non-zero normal are normalized so that signed
    /// distances are Euclidean.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        planes[NEAR] = rows[3] + rows[2];
        planes[FAR] = rows[3] - rows[2];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Test whether a point is inside all six planes.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|&plane| signed_distance(plane, point) >= 0.0)
    }

    /// Test whether an AABB is possibly inside the frustum.
    ///
    /// Uses the p-vertex (positive vertex) method: for each plane, take the
    /// corner of the AABB furthest along the plane normal. If that corner
    /// is behind the plane, the entire AABB is outside.
    ///
    /// This is conservative. It may return `true` for boxes that straddle
    /// two planes near a frustum edge while lying fully outside, but never
    /// returns `false` for a box that has any point inside.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for &plane in &self.planes {
            let normal = plane.truncate();
            let p = Vec3::new(
                if normal.x >= 0.0 {
                    aabb.max.x
                } else {
                    aabb.min.x
                },
                if normal.y >= 0.0 {
                    aabb.max.y
                } else {
                    aabb.min.y
                },
                if normal.z >= 0.0 {
                    aabb.max.z
                } else {
                    aabb.min.z
                },
            );

            if signed_distance(plane, p) < 0.0 {
                return false;
            }
        }
        true
    }
}

impl From<[Vec4; 6]> for Frustum {
    fn from(planes: [Vec4; 6]) -> Self {
        Self::new(planes)
    }
}
