use crate::Vec3;
use std::ops::Index;

/// Up to four Minkowski-difference points, newest first.
///
/// Index `0` always holds the point added last; the classifier relies on the ordering of the
/// remaining points to keep face normals consistently wound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simplex {
    points: [Vec3; Simplex::CAPACITY],
    len: usize,
}
impl Simplex {
    pub const CAPACITY: usize = 4;

    #[inline]
    pub fn new() -> Simplex {
        Simplex { points: [Vec3::ZERO; Simplex::CAPACITY], len: 0 }
    }

    #[inline]
    pub fn push_front(&mut self, point: Vec3) {
        //! Inserts `point` at index `0`. When full, the oldest point is dropped.
        self.points.copy_within(0..Simplex::CAPACITY - 1, 1);
        self.points[0] = point;
        self.len = (self.len + 1).min(Simplex::CAPACITY);
    }

    #[inline]
    pub fn replace(&mut self, points: &[Vec3]) {
        //! Sets the contents to exactly `points`, in order.
        assert!(points.len() <= Simplex::CAPACITY, "simplex holds at most four points");
        self.points[..points.len()].copy_from_slice(points);
        self.len = points.len();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    #[inline]
    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.as_slice().get(index).copied()
    }
    #[inline]
    pub fn as_slice(&self) -> &[Vec3] {
        &self.points[..self.len]
    }
    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.as_slice().iter()
    }
}
impl Default for Simplex {
    fn default() -> Self {
        Simplex::new()
    }
}
impl Index<usize> for Simplex {
    type Output = Vec3;

    #[inline]
    fn index(&self, index: usize) -> &Vec3 {
        &self.as_slice()[index]
    }
}
