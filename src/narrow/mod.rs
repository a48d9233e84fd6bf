//! Narrowphase data and logic module.

pub mod analytic;
pub mod gjk;
pub mod simplex;

use crate::{error::ShapeError, Fp, Quat, Vec3};

// ---------- Direction helpers ---------- //

#[inline]
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    //! Returns `v` scaled to unit length, or `fallback` if `v` has no usable length.
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        fallback
    }
}

#[inline]
pub fn any_orthogonal(v: Vec3) -> Vec3 {
    //! Returns a unit vector perpendicular to `v`, crossing against the axis `v` is least aligned with.
    //! Zero-length input yields `Vec3::X`.
    let abs = v.abs();
    let axis = if abs.x <= abs.y && abs.x <= abs.z {
        Vec3::X
    } else if abs.y <= abs.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    normalize_or(v.cross(axis), Vec3::X)
}

// ---------- Support mapping ---------- //

/// A convex set that can report its extreme point in any direction.
pub trait Support {
    /// Returns a boundary point maximizing `dir.dot(point)`. `dir` need not be normalized.
    fn furthest_point(&self, dir: Vec3) -> Vec3;
    /// Returns a point inside the shape, used to seed the search direction.
    fn center(&self) -> Vec3;
}

/// A convex hull given by its vertices, stored relative to `pos` and rotated by `rot`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    verts: Vec<Vec3>,
    centroid: Vec3,
    pos: Vec3,
    rot: Quat,
}
impl PointCloud {
    /// Interior and duplicate vertices are allowed; they are never selected over a hull vertex
    /// unless they tie with one.
    pub fn new(verts: Vec<Vec3>) -> Result<PointCloud, ShapeError> {
        if verts.is_empty() {
            return Err(ShapeError::EmptyPointCloud);
        }
        let centroid = verts.iter().fold(Vec3::ZERO, |acc, &v| acc + v) / verts.len() as Fp;
        Ok(PointCloud { verts, centroid, pos: Vec3::ZERO, rot: Quat::IDENTITY })
    }

    #[inline]
    pub fn verts(&self) -> &[Vec3] {
        &self.verts
    }
    #[inline]
    pub fn pos(&self) -> Vec3 {
        self.pos
    }
    #[inline]
    pub fn rot(&self) -> Quat {
        self.rot
    }
    pub fn world_verts(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.verts.iter().map(move |&v| self.pos + self.rot * v)
    }

    #[inline]
    pub fn translate(mut self, offset: Vec3) -> PointCloud {
        self.pos += offset;
        self
    }
    #[inline]
    pub fn rotate(mut self, rot: Quat) -> PointCloud {
        //! Rotates the cloud about its own position.
        self.rot = (rot * self.rot).normalize();
        self
    }
}
impl Support for PointCloud {
    fn furthest_point(&self, dir: Vec3) -> Vec3 {
        // rotations preserve dot products, so the scan can run in the local frame
        let local = self.rot.inverse() * dir;
        let mut best = self.verts[0];
        let mut best_dot = local.dot(best);
        for &v in self.verts.iter().skip(1) {
            let dot = local.dot(v);
            if dot > best_dot {
                best = v;
                best_dot = dot;
            }
        }
        self.pos + self.rot * best
    }

    #[inline]
    fn center(&self) -> Vec3 {
        self.pos + self.rot * self.centroid
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub rad: Fp,
    pub pos: Vec3,
}
impl Sphere {
    #[inline]
    pub fn new(rad: Fp, pos: Vec3) -> Sphere {
        Sphere { rad: rad.abs(), pos }
    }
    #[inline]
    pub fn translate(self, offset: Vec3) -> Sphere {
        Sphere { pos: self.pos + offset, rad: self.rad }
    }
}
impl Support for Sphere {
    #[inline]
    fn furthest_point(&self, dir: Vec3) -> Vec3 {
        self.pos + normalize_or(dir, Vec3::ZERO) * self.rad
    }

    #[inline]
    fn center(&self) -> Vec3 {
        self.pos
    }
}

/// A segment along the local Y axis, `half_height` either side of `pos`, inflated by `rad`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub rad: Fp,
    pub half_height: Fp,
    pub pos: Vec3,
    pub rot: Quat,
}
impl Capsule {
    #[inline]
    pub fn new(rad: Fp, half_height: Fp, pos: Vec3) -> Capsule {
        Capsule { rad: rad.abs(), half_height: half_height.abs(), pos, rot: Quat::IDENTITY }
    }

    #[inline]
    pub fn axis(&self) -> Vec3 {
        //! Unit direction from the bottom endpoint to the top endpoint.
        self.rot * Vec3::Y
    }
    #[inline]
    pub fn segment(&self) -> (Vec3, Vec3) {
        //! Returns the world-space `(bottom, top)` endpoints of the core segment.
        let offset = self.axis() * self.half_height;
        (self.pos - offset, self.pos + offset)
    }

    #[inline]
    pub fn translate(self, offset: Vec3) -> Capsule {
        Capsule { pos: self.pos + offset, ..self }
    }
    #[inline]
    pub fn rotate(self, rot: Quat) -> Capsule {
        Capsule { rot: (rot * self.rot).normalize(), ..self }
    }
}
impl Support for Capsule {
    fn furthest_point(&self, dir: Vec3) -> Vec3 {
        let (bottom, top) = self.segment();
        let end = if dir.dot(self.axis()) >= 0.0 { top } else { bottom };
        end + normalize_or(dir, Vec3::ZERO) * self.rad
    }

    #[inline]
    fn center(&self) -> Vec3 {
        self.pos
    }
}

/// A box with local extents `min..max`, placed at `pos` and rotated by `rot`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub min: Vec3,
    pub max: Vec3,
    pub pos: Vec3,
    pub rot: Quat,
}
impl Cuboid {
    pub fn new(min: Vec3, max: Vec3) -> Result<Cuboid, ShapeError> {
        for (axis, lo, hi) in [('x', min.x, max.x), ('y', min.y, max.y), ('z', min.z, max.z)] {
            if lo > hi {
                return Err(ShapeError::InvertedExtents { axis });
            }
        }
        Ok(Cuboid { min, max, pos: Vec3::ZERO, rot: Quat::IDENTITY })
    }
    #[inline]
    pub fn new_safe(a: Vec3, b: Vec3) -> Cuboid {
        //! Orders minimum and maximum values.
        Cuboid { min: a.min(b), max: a.max(b), pos: Vec3::ZERO, rot: Quat::IDENTITY }
    }
    #[inline]
    pub fn from_half_extents(half: Vec3, pos: Vec3) -> Cuboid {
        let half = half.abs();
        Cuboid { min: -half, max: half, pos, rot: Quat::IDENTITY }
    }

    #[inline]
    pub fn translate(self, offset: Vec3) -> Cuboid {
        Cuboid { pos: self.pos + offset, ..self }
    }
    #[inline]
    pub fn rotate(self, rot: Quat) -> Cuboid {
        //! Rotates the cuboid about `pos`, which need not be its center.
        Cuboid { rot: (rot * self.rot).normalize(), ..self }
    }
}
impl Support for Cuboid {
    fn furthest_point(&self, dir: Vec3) -> Vec3 {
        let local = self.rot.inverse() * dir;
        let corner = Vec3::new(
            if local.x > 0.0 { self.max.x } else { self.min.x },
            if local.y > 0.0 { self.max.y } else { self.min.y },
            if local.z > 0.0 { self.max.z } else { self.min.z },
        );
        self.pos + self.rot * corner
    }

    #[inline]
    fn center(&self) -> Vec3 {
        self.pos + self.rot * ((self.min + self.max) * 0.5)
    }
}

// ---------- Shape ---------- //

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    PointCloud(PointCloud),
    Sphere(Sphere),
    Capsule(Capsule),
    Cuboid(Cuboid),
}
impl Shape {
    pub fn translate(self, offset: Vec3) -> Shape {
        match self {
            Shape::PointCloud(p) => Shape::PointCloud(p.translate(offset)),
            Shape::Sphere(s) => Shape::Sphere(s.translate(offset)),
            Shape::Capsule(c) => Shape::Capsule(c.translate(offset)),
            Shape::Cuboid(c) => Shape::Cuboid(c.translate(offset)),
        }
    }
    pub fn rotate(self, rot: Quat) -> Shape {
        //! Spheres are rotation invariant and are returned unchanged.
        match self {
            Shape::PointCloud(p) => Shape::PointCloud(p.rotate(rot)),
            Shape::Sphere(s) => Shape::Sphere(s),
            Shape::Capsule(c) => Shape::Capsule(c.rotate(rot)),
            Shape::Cuboid(c) => Shape::Cuboid(c.rotate(rot)),
        }
    }

    pub fn shape_test(&self, other: &Shape) -> bool {
        //! Returns whether the shapes overlap, using a closed-form test where the pair has one.
        use analytic::*;
        match (self, other) {
            (Shape::Sphere(a), Shape::Sphere(b)) => sphere_sphere_test(a, b),
            (Shape::Sphere(s), Shape::Cuboid(c)) | (Shape::Cuboid(c), Shape::Sphere(s)) => sphere_cuboid_test(s, c),
            (Shape::Capsule(c), Shape::Sphere(s)) | (Shape::Sphere(s), Shape::Capsule(c)) => capsule_sphere_test(c, s),
            (Shape::Capsule(a), Shape::Capsule(b)) => capsule_capsule_test(a, b),
            _ => gjk::overlap(self, other),
        }
    }
}
impl Support for Shape {
    fn furthest_point(&self, dir: Vec3) -> Vec3 {
        match self {
            Shape::PointCloud(p) => p.furthest_point(dir),
            Shape::Sphere(s) => s.furthest_point(dir),
            Shape::Capsule(c) => c.furthest_point(dir),
            Shape::Cuboid(c) => c.furthest_point(dir),
        }
    }
    fn center(&self) -> Vec3 {
        match self {
            Shape::PointCloud(p) => p.center(),
            Shape::Sphere(s) => s.center(),
            Shape::Capsule(c) => c.center(),
            Shape::Cuboid(c) => c.center(),
        }
    }
}

impl From<PointCloud> for Shape {
    fn from(cloud: PointCloud) -> Self {
        Shape::PointCloud(cloud)
    }
}
impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}
impl From<Capsule> for Shape {
    fn from(capsule: Capsule) -> Self {
        Shape::Capsule(capsule)
    }
}
impl From<Cuboid> for Shape {
    fn from(cuboid: Cuboid) -> Self {
        Shape::Cuboid(cuboid)
    }
}
