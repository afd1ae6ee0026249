//! Ordered point storage with an incrementally maintained bounding box.

use std::ops::Index;

use glam::{Mat3, Mat4, Vec3};
use lumen_math::Aabb;
use tracing::warn;

use crate::{CloudError, Point};

/// An ordered, append-friendly collection of points.
///
/// Indices are stable across appends. The bounding box always equals the
/// componentwise min/max of the current contents: appends extend it in
/// O(1), bulk mutations recompute it from scratch.
///
/// Spatial indexes built over a cloud borrow it, so the borrow checker
/// forces a rebuild after any mutation.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    points: Vec<Point>,
    bounds: Option<Aabb>,
}

impl PointCloud {
    /// Create an empty cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cloud with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            bounds: None,
        }
    }

    // --- Appending ---

    /// Append a point. Its index is the previous `len()`.
    pub fn push(&mut self, point: Point) {
        match &mut self.bounds {
            Some(bounds) => bounds.expand_to_include(point.position),
            None => self.bounds = Some(Aabb::from_point(point.position)),
        }
        self.points.push(point);
    }

    /// Append a point at `position` with default attributes.
    pub fn add_point(&mut self, position: Vec3) {
        self.push(Point::new(position));
    }

    /// Append a point at `position` with the given color.
    pub fn add_point_with_color(&mut self, position: Vec3, color: Vec3) {
        self.push(Point::with_color(position, color));
    }

    // --- Access ---

    /// Checked access.
    pub fn get(&self, index: usize) -> Result<&Point, CloudError> {
        self.points.get(index).ok_or(CloudError::IndexOutOfRange {
            index,
            len: self.points.len(),
        })
    }

    /// Move the point at `index` to `position`, keeping the bounds current.
    pub fn set_position(&mut self, index: usize, position: Vec3) -> Result<(), CloudError> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or(CloudError::IndexOutOfRange { index, len })?;
        point.position = position;
        self.recompute_bounds();
        Ok(())
    }

    /// All points in index order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Iterate points in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the cloud holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    // --- Container operations ---

    /// Remove every point.
    pub fn clear(&mut self) {
        self.points.clear();
        self.bounds = None;
    }

    /// Reserve room for at least `additional` more points.
    pub fn reserve(&mut self, additional: usize) {
        self.points.reserve(additional);
    }

    /// Truncate or extend to `len` points. New slots are `Point::default()`.
    pub fn resize(&mut self, len: usize) {
        self.points.resize(len, Point::default());
        self.recompute_bounds();
    }

    // --- Bounds ---

    /// Bounding box of the contents, `None` when empty.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Minimum corner of the bounds (origin when empty).
    pub fn min_bound(&self) -> Vec3 {
        self.bounds.map_or(Vec3::ZERO, |b| b.min)
    }

    /// Maximum corner of the bounds (origin when empty).
    pub fn max_bound(&self) -> Vec3 {
        self.bounds.map_or(Vec3::ZERO, |b| b.max)
    }

    /// Center of the bounding box (origin when empty).
    pub fn center(&self) -> Vec3 {
        self.bounds.map_or(Vec3::ZERO, |b| b.center())
    }

    /// Length of the bounding-box diagonal (zero when empty).
    pub fn diagonal_length(&self) -> f32 {
        self.bounds.map_or(0.0, |b| b.diagonal_length())
    }

    /// Approximate heap + inline footprint in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.points.capacity() * std::mem::size_of::<Point>()
    }

    // --- Bulk operations ---

    /// Apply an affine transform to every position.
    ///
    /// Normals are carried by the inverse-transpose of the linear part and
    /// renormalized. If the linear part is singular, normals are left as is.
    pub fn transform(&mut self, transformation: &Mat4) {
        let linear = Mat3::from_mat4(*transformation);
        let det = linear.determinant();
        let normal_matrix = if det != 0.0 && det.is_finite() {
            Some(linear.inverse().transpose())
        } else {
            warn!(det, "singular transform; point normals left unchanged");
            None
        };

        for point in &mut self.points {
            point.position = transformation.transform_point3(point.position);
            if let Some(m) = normal_matrix {
                point.normal = (m * point.normal).normalize_or_zero();
            }
        }
        self.recompute_bounds();
    }

    /// Move the cloud so that its bounding-box center lands on `target`.
    pub fn translate_centroid(&mut self, target: Vec3) {
        let translation = target - self.center();
        for point in &mut self.points {
            point.position += translation;
        }
        self.recompute_bounds();
    }

    /// Scale uniformly about the bounding-box center.
    pub fn scale(&mut self, factor: f32) {
        let center = self.center();
        for point in &mut self.points {
            point.position = center + factor * (point.position - center);
        }
        self.recompute_bounds();
    }

    fn recompute_bounds(&mut self) {
        let mut iter = self.points.iter();
        self.bounds = iter.next().map(|first| {
            iter.fold(Aabb::from_point(first.position), |mut acc, p| {
                acc.expand_to_include(p.position);
                acc
            })
        });
    }
}

impl Index<usize> for PointCloud {
    type Output = Point;

    /// Unchecked by contract: panics like a slice when out of range.
    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl Extend<Point> for PointCloud {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.points.reserve(iter.size_hint().0);
        for point in iter {
            self.push(point);
        }
    }
}

impl FromIterator<Point> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut cloud = PointCloud::new();
        cloud.extend(iter);
        cloud
    }
}
