use glam::Vec3;

/// Axis-aligned bounding box in f32 space.
///
/// Invariant: min.x <= max.x, min.y <= max.y, min.z <= max.z.
/// The constructor enforces this by sorting components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corners. Automatically sorts
    /// components so that min <= max on every axis.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A zero-volume box containing a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the min-to-max diagonal.
    pub fn diagonal_length(&self) -> f32 {
        self.size().length()
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true if this AABB overlaps with other
    /// (including touching edges/faces).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Grow the box so it contains `p`.
    pub fn expand_to_include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// The point of the box nearest to `p` (`p` itself when inside).
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Squared distance from `p` to the nearest point of the box.
    pub fn distance_squared_to_point(&self, p: Vec3) -> f32 {
        self.closest_point(p).distance_squared(p)
    }

    /// 3-bit octant code of `p` relative to the box center.
    ///
    /// Bit 0 is set when `p.x > center.x`, bit 1 for y, bit 2 for z.
    /// A coordinate equal to the center maps to the lesser side.
    pub fn octant_of(&self, p: Vec3) -> usize {
        let c = self.center();
        let mut code = 0;
        if p.x > c.x {
            code |= 1;
        }
        if p.y > c.y {
            code |= 2;
        }
        if p.z > c.z {
            code |= 4;
        }
        code
    }

    /// The child box for a 3-bit octant code, split at the center.
    pub fn octant(&self, code: usize) -> Aabb {
        debug_assert!(code < 8, "octant code out of range: {code}");
        let c = self.center();
        let mut min = self.min;
        let mut max = self.max;
        if code & 1 != 0 {
            min.x = c.x;
        } else {
            max.x = c.x;
        }
        if code & 2 != 0 {
            min.y = c.y;
        } else {
            max.y = c.y;
        }
        if code & 4 != 0 {
            min.z = c.z;
        } else {
            max.z = c.z;
        }
        Aabb { min, max }
    }
}
