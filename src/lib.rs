//! Boolean overlap tests between 3D convex shapes.
//!
//! The general path is GJK over the shapes' support mappings (see [`narrow::gjk`]).
//! Closed-form tests for sphere, cuboid and capsule pairs live in [`narrow::analytic`]
//! and are picked automatically by [`Shape::shape_test`].
//!
//! ```
//! use gjk3d::{overlap, Cuboid, Sphere, Vec3};
//!
//! let cube = Cuboid::from_half_extents(Vec3::ONE, Vec3::ZERO);
//! let ball = Sphere::new(0.5, Vec3::new(0.0, 1.2, 0.0));
//! assert!(overlap(&cube, &ball));
//! assert!(!overlap(&cube, &ball.translate(Vec3::new(0.0, 1.0, 0.0))));
//! ```

pub mod error;
pub mod narrow;

#[cfg(not(feature = "f64"))]
pub type Fp = f32;
#[cfg(not(feature = "f64"))]
pub use glam::{Quat, Vec3};

#[cfg(feature = "f64")]
pub type Fp = f64;
#[cfg(feature = "f64")]
pub use glam::{DQuat as Quat, DVec3 as Vec3};

pub use error::ShapeError;
pub use narrow::{
    analytic::{
        capsule_capsule_test, capsule_sphere_test, closest_point_on_seg, closest_points_seg_seg,
        sphere_cuboid_test, sphere_sphere_test,
    },
    gjk::{evaluate_simplex, gjk, overlap, support, GjkConfig, GjkReport, Verdict},
    simplex::Simplex,
    Capsule, Cuboid, PointCloud, Shape, Sphere, Support,
};
