use glam::Vec3;

/// A single sample of a point cloud.
///
/// Plain value type. A point has no identity beyond its index in the
/// cloud that owns it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Position in cloud space.
    pub position: Vec3,
    /// Linear RGB color in `[0, 1]`.
    pub color: Vec3,
    /// Surface normal, unit length when known.
    pub normal: Vec3,
    /// Return intensity (scanner-specific scale).
    pub intensity: f32,
}

impl Point {
    /// Default color for points created without one (white).
    pub const DEFAULT_COLOR: Vec3 = Vec3::ONE;
    /// Default normal for points created without one (+Z).
    pub const DEFAULT_NORMAL: Vec3 = Vec3::Z;

    /// A point at `position` with default color, normal and intensity.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// A point at `position` with the given color.
    pub fn with_color(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            color,
            ..Self::default()
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Self::DEFAULT_COLOR,
            normal: Self::DEFAULT_NORMAL,
            intensity: 1.0,
        }
    }
}

impl From<Vec3> for Point {
    fn from(position: Vec3) -> Self {
        Self::new(position)
    }
}
