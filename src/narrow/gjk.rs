//! Gilbert–Johnson–Keerthi boolean overlap test.
//!
//! The search walks a simplex of Minkowski-difference points toward the origin. Each step either
//! finds a support point that fails to pass the origin (the shapes are separated), or grows the
//! simplex until a tetrahedron encloses the origin (the shapes overlap).
//!
//! All "same direction" tests are strict: an exact zero dot product is treated as pointing away.
//! Shapes that only touch are therefore usually reported as separated. The tetrahedron face tests
//! treat products within rounding noise of zero as zero, so an origin on a face or edge of the
//! tetrahedron counts as enclosed.

use super::{any_orthogonal, normalize_or, simplex::Simplex, Support};
use crate::{Fp, Vec3};
use tracing::{trace, trace_span, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GjkConfig {
    /// Loop iterations allowed before the query gives up and reports `Verdict::Stalled`.
    pub max_iterations: usize,
    /// Search direction used when the shape centers coincide or a support point lands on the origin.
    pub fallback_dir: Vec3,
}
impl Default for GjkConfig {
    fn default() -> Self {
        GjkConfig { max_iterations: 64, fallback_dir: Vec3::X }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The Minkowski difference contains the origin.
    Overlap,
    /// A support point failed to pass the origin.
    Separated,
    /// The iteration cap was reached. Counts as no overlap.
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GjkReport {
    pub verdict: Verdict,
    /// Loop iterations performed, excluding the initial support query.
    pub iterations: usize,
}
impl GjkReport {
    #[inline]
    pub fn overlap(&self) -> bool {
        self.verdict == Verdict::Overlap
    }
    #[inline]
    pub fn converged(&self) -> bool {
        self.verdict != Verdict::Stalled
    }
}

#[inline]
pub fn support<A, B>(a: &A, b: &B, dir: Vec3) -> Vec3
where
    A: Support + ?Sized,
    B: Support + ?Sized,
{
    //! Returns the point of the Minkowski difference `a - b` furthest along `dir`.
    a.furthest_point(dir) - b.furthest_point(-dir)
}

#[inline]
pub fn overlap<A, B>(a: &A, b: &B) -> bool
where
    A: Support + ?Sized,
    B: Support + ?Sized,
{
    //! Returns whether the convex shapes overlap. Touching shapes and queries that fail to converge
    //! within the default iteration cap report `false`.
    gjk(a, b, &GjkConfig::default()).overlap()
}

pub fn gjk<A, B>(a: &A, b: &B, config: &GjkConfig) -> GjkReport
where
    A: Support + ?Sized,
    B: Support + ?Sized,
{
    let _span = trace_span!("gjk").entered();
    let fallback = normalize_or(config.fallback_dir, Vec3::X);

    let mut dir = normalize_or(b.center() - a.center(), fallback);
    let mut simplex = Simplex::new();
    let first = support(a, b, dir);
    simplex.push_front(first);
    dir = normalize_or(-first, fallback);

    for iteration in 1..=config.max_iterations {
        let point = support(a, b, dir);
        if point.dot(dir) <= 0.0 {
            trace!(iteration, "support point does not pass the origin");
            return GjkReport { verdict: Verdict::Separated, iterations: iteration };
        }

        simplex.push_front(point);
        if evaluate_simplex(&mut simplex, &mut dir) {
            trace!(iteration, "simplex encloses the origin");
            return GjkReport { verdict: Verdict::Overlap, iterations: iteration };
        }
    }

    warn!(max_iterations = config.max_iterations, "gjk did not converge");
    GjkReport { verdict: Verdict::Stalled, iterations: config.max_iterations }
}

// ---------- Voronoi region classifier ---------- //

/// Multiple of `Fp::EPSILON` covering the error of `cross(u, v).dot(w)` relative to `|u||v||w|`.
const FACE_NOISE: Fp = 8.0;

#[inline]
fn same_direction(a: Vec3, b: Vec3) -> bool {
    a.dot(b) > 0.0
}

pub fn evaluate_simplex(simplex: &mut Simplex, dir: &mut Vec3) -> bool {
    //! Reduces `simplex` to the feature closest to the origin and points `dir` at the origin from it.
    //! Returns `true` only when a tetrahedron encloses the origin.
    match simplex.len() {
        4 => tetrahedron_case(simplex, dir),
        3 => {
            triangle_case(simplex, dir);
            false
        }
        2 => {
            line_case(simplex, dir);
            false
        }
        1 => {
            *dir = normalize_or(-simplex[0], *dir);
            false
        }
        _ => false,
    }
}

fn line_case(simplex: &mut Simplex, dir: &mut Vec3) {
    let (a, b) = (simplex[0], simplex[1]);
    let ab = b - a;
    let ao = -a;

    if same_direction(ab, ao) {
        // origin lies on the segment's line when the triple product vanishes
        *dir = normalize_or(ab.cross(ao).cross(ab), any_orthogonal(ab));
    } else {
        simplex.replace(&[a]);
        *dir = normalize_or(ao, any_orthogonal(ab));
    }
}

fn triangle_case(simplex: &mut Simplex, dir: &mut Vec3) {
    let (a, b, c) = (simplex[0], simplex[1], simplex[2]);
    let ab = b - a;
    let ac = c - a;
    let ao = -a;
    let abc = ab.cross(ac);

    if same_direction(abc.cross(ac), ao) {
        if same_direction(ac, ao) {
            simplex.replace(&[a, c]);
            *dir = normalize_or(ac.cross(ao).cross(ac), any_orthogonal(ac));
        } else {
            simplex.replace(&[a, b]);
            line_case(simplex, dir);
        }
    } else if same_direction(ab.cross(abc), ao) {
        simplex.replace(&[a, b]);
        line_case(simplex, dir);
    } else if same_direction(abc, ao) {
        *dir = normalize_or(abc, any_orthogonal(ab));
    } else {
        simplex.replace(&[a, c, b]);
        *dir = normalize_or(-abc, any_orthogonal(ab));
    }
}

fn tetrahedron_case(simplex: &mut Simplex, dir: &mut Vec3) -> bool {
    let (a, b, c, d) = (simplex[0], simplex[1], simplex[2], simplex[3]);
    let ab = b - a;
    let ac = c - a;
    let ad = d - a;
    let ao = -a;

    let abc = ab.cross(ac);
    let acd = ac.cross(ad);
    let adb = ad.cross(ab);

    // bound on the rounding error of a face product for these edge lengths
    let longest = ab.length_squared().max(ac.length_squared()).max(ad.length_squared());
    let noise = FACE_NOISE * Fp::EPSILON * longest * ao.length();

    if abc.dot(ao) > noise {
        simplex.replace(&[a, b, c]);
    } else if acd.dot(ao) > noise {
        simplex.replace(&[a, c, d]);
    } else if adb.dot(ao) > noise {
        simplex.replace(&[a, d, b]);
    } else {
        return true;
    }
    triangle_case(simplex, dir);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capsule, Cuboid, PointCloud, Quat, Sphere};
    use approx::assert_abs_diff_eq;

    fn simplex_of(points: &[Vec3]) -> Simplex {
        let mut s = Simplex::new();
        s.replace(points);
        s
    }

    #[test]
    fn line_keeps_segment_facing_origin() {
        let (a, b) = (Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let mut s = simplex_of(&[a, b]);
        let mut dir = Vec3::X;

        assert!(!evaluate_simplex(&mut s, &mut dir));
        assert_eq!(s.as_slice(), &[a, b]);
        assert_eq!(dir, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn line_falls_back_to_vertex() {
        let (a, b) = (Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.0));
        let mut s = simplex_of(&[a, b]);
        let mut dir = Vec3::X;

        assert!(!evaluate_simplex(&mut s, &mut dir));
        assert_eq!(s.as_slice(), &[a]);
        assert_abs_diff_eq!(dir, Vec3::new(-1.0, -1.0, 0.0).normalize(), epsilon = 1e-6);
    }

    #[test]
    fn line_through_origin_picks_perpendicular() {
        let (a, b) = (Vec3::new(-3.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let mut s = simplex_of(&[a, b]);
        let mut dir = Vec3::X;

        evaluate_simplex(&mut s, &mut dir);
        assert_eq!(s.len(), 2);
        assert_eq!(dir, Vec3::Z);
    }

    #[test]
    fn triangle_above_origin_flips_winding() {
        let (a, b, c) = (Vec3::new(0.0, 1.0, 1.0), Vec3::new(-1.0, -1.0, 1.0), Vec3::new(1.0, -1.0, 1.0));
        let mut s = simplex_of(&[a, b, c]);
        let mut dir = Vec3::X;

        assert!(!evaluate_simplex(&mut s, &mut dir));
        assert_eq!(s.as_slice(), &[a, c, b]);
        assert_eq!(dir, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn triangle_below_origin_keeps_winding() {
        let (a, b, c) = (Vec3::new(0.0, 1.0, -1.0), Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, -1.0, -1.0));
        let mut s = simplex_of(&[a, b, c]);
        let mut dir = Vec3::X;

        evaluate_simplex(&mut s, &mut dir);
        assert_eq!(s.as_slice(), &[a, b, c]);
        assert_eq!(dir, Vec3::Z);
    }

    #[test]
    fn triangle_reduces_to_edge_ac() {
        let (a, b, c) = (Vec3::new(1.0, -1.0, 0.0), Vec3::new(3.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let mut s = simplex_of(&[a, b, c]);
        let mut dir = Vec3::X;

        evaluate_simplex(&mut s, &mut dir);
        assert_eq!(s.as_slice(), &[a, c]);
        assert_eq!(dir, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn triangle_reduces_to_vertex_a() {
        let (a, b, c) = (Vec3::new(1.0, 1.0, 0.0), Vec3::new(3.0, 1.0, 0.0), Vec3::new(1.0, 3.0, 0.0));
        let mut s = simplex_of(&[a, b, c]);
        let mut dir = Vec3::X;

        evaluate_simplex(&mut s, &mut dir);
        assert_eq!(s.as_slice(), &[a]);
        assert_abs_diff_eq!(dir, Vec3::new(-1.0, -1.0, 0.0).normalize(), epsilon = 1e-6);
    }

    #[test]
    fn triangle_reduces_to_edge_ab() {
        let (a, b, c) = (Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 3.0, 0.0));
        let mut s = simplex_of(&[a, b, c]);
        let mut dir = Vec3::X;

        evaluate_simplex(&mut s, &mut dir);
        assert_eq!(s.as_slice(), &[a, b]);
        assert_eq!(dir, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn tetrahedron_encloses_origin() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let b = Vec3::new(-1.0, 1.0, -1.0);
        let c = Vec3::new(-1.0, -1.0, 1.0);
        let d = Vec3::new(1.0, -1.0, -1.0);
        let mut s = simplex_of(&[a, b, c, d]);
        let mut dir = Vec3::X;

        assert!(evaluate_simplex(&mut s, &mut dir));
        assert_eq!(s.len(), 4);
        assert_eq!(dir, Vec3::X);
    }

    #[test]
    fn tetrahedron_with_origin_on_edge_encloses() {
        // d lies on the ray from c through the origin, so the origin sits on edge cd
        let a = Vec3::new(1.4, 2.5, -2.8);
        let b = Vec3::new(-0.2, 2.7, 0.9);
        let c = Vec3::new(0.7, 1.5, 1.8);
        let d = c * -1.9;
        let mut s = simplex_of(&[a, b, c, d]);
        let mut dir = Vec3::X;

        assert!(evaluate_simplex(&mut s, &mut dir));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn tetrahedron_away_from_origin_shrinks() {
        let offset = Vec3::new(5.0, 0.0, 0.0);
        let a = Vec3::new(1.0, 1.0, 1.0) + offset;
        let b = Vec3::new(-1.0, 1.0, -1.0) + offset;
        let c = Vec3::new(-1.0, -1.0, 1.0) + offset;
        let d = Vec3::new(1.0, -1.0, -1.0) + offset;
        let mut s = simplex_of(&[a, b, c, d]);
        let mut dir = Vec3::X;

        assert!(!evaluate_simplex(&mut s, &mut dir));
        assert!((1..=3).contains(&s.len()));
        assert_eq!(s[0], a);
        assert!(dir.is_normalized());
        assert!(dir.dot(-a) > 0.0);
    }

    #[test]
    fn boxes_far_apart_do_not_overlap() {
        let unit = Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0)).unwrap();
        let small = Cuboid::from_half_extents(Vec3::splat(0.25), Vec3::new(0.0, 1.0, 3.0));

        let report = gjk(&unit, &small, &GjkConfig::default());
        assert_eq!(report.verdict, Verdict::Separated);
        assert!(report.converged());
        assert!(report.iterations <= GjkConfig::default().max_iterations);
        assert!(!overlap(&unit, &small));
    }

    #[test]
    fn shifted_boxes_overlap() {
        let a = Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0)).unwrap();
        let b = a.translate(Vec3::new(0.0, 1.0, 0.0));

        let report = gjk(&a, &b, &GjkConfig::default());
        assert_eq!(report.verdict, Verdict::Overlap);
        assert_eq!(report.iterations, 3);
        assert!(overlap(&b, &a));
    }

    #[test]
    fn touching_faces_are_separated() {
        let a = Cuboid::from_half_extents(Vec3::ONE, Vec3::ZERO);
        assert!(!overlap(&a, &a.translate(Vec3::new(2.0, 0.0, 0.0))));
        assert!(overlap(&a, &a.translate(Vec3::new(1.99, 0.0, 0.0))));
        assert!(!overlap(&a, &a.translate(Vec3::new(3.0, 0.0, 0.0))));
    }

    #[test]
    fn coincident_centers_use_fallback() {
        let s = Sphere::new(1.0, Vec3::new(4.0, -2.0, 7.0));
        assert!(overlap(&s, &s));

        let report = gjk(&s, &s, &GjkConfig { fallback_dir: Vec3::ZERO, ..GjkConfig::default() });
        assert!(report.overlap());
    }

    #[test]
    fn separated_spheres() {
        let a = Sphere::new(1.0, Vec3::ZERO);
        let b = Sphere::new(1.0, Vec3::new(10.0, 0.0, 0.0));
        let report = gjk(&a, &b, &GjkConfig::default());
        assert_eq!(report, GjkReport { verdict: Verdict::Separated, iterations: 1 });
    }

    #[test]
    fn overlapping_spheres() {
        let a = Sphere::new(1.0, Vec3::ZERO);
        let b = Sphere::new(1.0, Vec3::new(1.0, 0.0, 0.0));
        assert!(overlap(&a, &b));
    }

    #[test]
    fn overlapping_spheres_away_from_origin() {
        let pairs = [
            (1.23, Vec3::new(-6.77, 3.66, 1.95), 1.84, Vec3::new(-6.86, 3.82, 2.72)),
            (1.32, Vec3::new(-2.06, -9.85, 4.9), 0.94, Vec3::new(-3.01, -9.19, 5.52)),
            (1.65, Vec3::new(-6.12, -5.62, -2.32), 0.84, Vec3::new(-6.39, -5.34, -2.38)),
            (1.11, Vec3::new(-8.44, 1.65, 8.85), 1.13, Vec3::new(-8.29, 1.36, 9.26)),
            (1.61, Vec3::new(1.09, -7.21, 8.57), 0.63, Vec3::new(0.45, -8.01, 8.6)),
        ];
        for &(ra, pa, rb, pb) in &pairs {
            let (a, b) = (Sphere::new(ra, pa), Sphere::new(rb, pb));
            for report in [gjk(&a, &b, &GjkConfig::default()), gjk(&b, &a, &GjkConfig::default())] {
                assert_eq!(report.verdict, Verdict::Overlap, "{:?} against {:?}", a, b);
                assert!(report.converged());
            }
        }
    }

    #[test]
    fn sphere_grid_off_origin_overlaps() {
        for i in 0..12 {
            for j in 0..12 {
                let (fi, fj) = (i as Fp, j as Fp);
                let base = Vec3::new(fi * 1.37 - 8.0, fj * 0.83 - 5.0, (i * j) as Fp * 0.11 - 4.0);
                let offset = Vec3::new(0.31 * fj - 1.7, 0.9 - 0.17 * fi, 0.4) * 0.5;

                let report = gjk(&Sphere::new(1.2, base), &Sphere::new(0.9, base + offset), &GjkConfig::default());
                assert_eq!(report.verdict, Verdict::Overlap, "i = {}, j = {}", i, j);
            }
        }
    }

    #[test]
    fn coaxial_capsules_away_from_origin() {
        let pos = Vec3::new(7.0, -3.0, 2.0);
        let a = Capsule::new(0.5, 1.0, pos);
        let b = Capsule::new(0.4, 1.0, pos + Vec3::new(0.0, 0.8, 0.0));

        let tilt = Quat::from_rotation_x(0.7);
        let tilted_a = a.rotate(tilt);
        let tilted_b = Capsule::new(0.4, 1.0, pos + tilted_a.axis() * 0.8).rotate(tilt);

        for (a, b) in [(a, b), (tilted_a, tilted_b)] {
            for report in [gjk(&a, &b, &GjkConfig::default()), gjk(&b, &a, &GjkConfig::default())] {
                assert_eq!(report.verdict, Verdict::Overlap);
                assert!(report.converged());
            }
        }
    }

    #[test]
    fn stalls_at_iteration_cap() {
        let a = Cuboid::from_half_extents(Vec3::ONE, Vec3::ZERO);
        let b = a.translate(Vec3::new(0.0, 1.0, 0.0));

        let report = gjk(&a, &b, &GjkConfig { max_iterations: 1, ..GjkConfig::default() });
        assert_eq!(report.verdict, Verdict::Stalled);
        assert!(!report.converged());
        assert!(!report.overlap());
    }

    #[test]
    fn trait_objects_and_mixed_shapes() {
        let cloud = PointCloud::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ])
        .unwrap();
        let mirrored = PointCloud::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
        ])
        .unwrap();

        let a: &dyn Support = &cloud;
        let b: &dyn Support = &mirrored;
        // shared vertex on the boundary of both hulls only
        assert!(!overlap(a, b));
        assert!(overlap(a, &mirrored.translate(Vec3::new(-0.5, 0.0, 0.0))));
    }
}
