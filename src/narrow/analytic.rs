//! Closed-form overlap tests for shape pairs that don't need GJK.

use super::{Capsule, Cuboid, Sphere};
use crate::{Fp, Vec3};

#[inline]
fn clamp01(t: Fp) -> Fp {
    t.max(0.0).min(1.0)
}

#[inline]
pub fn sphere_sphere_test(a: &Sphere, b: &Sphere) -> bool {
    //! Spheres exactly `a.rad + b.rad` apart do not overlap.
    (b.pos - a.pos).length() < a.rad + b.rad
}

pub fn sphere_cuboid_test(sphere: &Sphere, cuboid: &Cuboid) -> bool {
    //! Clamps the sphere center to the cuboid in the cuboid's local frame.
    let local = cuboid.rot.inverse() * (sphere.pos - cuboid.pos);
    let closest = local.max(cuboid.min).min(cuboid.max);
    (local - closest).length_squared() <= sphere.rad * sphere.rad
}

#[inline]
pub fn closest_point_on_seg(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    //! Returns the point on segment `a->b` closest to `p`. A degenerate segment returns `a`.
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return a;
    }
    a + ab * clamp01((p - a).dot(ab) / len2)
}

pub fn closest_points_seg_seg(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    //! Returns the closest pair of points between segments `p1->q1` and `p2->q2`.
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a == 0.0 && e == 0.0 {
        (0.0, 0.0)
    } else if a == 0.0 {
        (0.0, clamp01(f / e))
    } else {
        let c = d1.dot(r);
        if e == 0.0 {
            (clamp01(-c / a), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;

            // parallel segments: any s works, start from p1
            let mut s = if denom != 0.0 { clamp01((b * f - c * e) / denom) } else { 0.0 };
            let mut t = b * s + f;
            if t < 0.0 {
                t = 0.0;
                s = clamp01(-c / a);
            } else if t > e {
                t = 1.0;
                s = clamp01((b - c) / a);
            } else {
                t /= e;
            }
            (s, t)
        }
    };
    (p1 + d1 * s, p2 + d2 * t)
}

pub fn capsule_sphere_test(capsule: &Capsule, sphere: &Sphere) -> bool {
    let (bottom, top) = capsule.segment();
    let core = closest_point_on_seg(bottom, top, sphere.pos);
    sphere_sphere_test(&Sphere::new(capsule.rad, core), sphere)
}

pub fn capsule_capsule_test(a: &Capsule, b: &Capsule) -> bool {
    let (a1, a2) = a.segment();
    let (b1, b2) = b.segment();
    let (ca, cb) = closest_points_seg_seg(a1, a2, b1, b2);
    sphere_sphere_test(&Sphere::new(a.rad, ca), &Sphere::new(b.rad, cb))
}
