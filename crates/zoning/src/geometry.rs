//! Cubic Bezier road curves and the side-of-curve classifier.
//!
//! All zoning decisions happen in the x/z ground plane. A 3D host curve is
//! projected with [`Bezier3::xz`] before any query.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::blocks::BlockSnapshot;
use crate::config::{CLOSEST_POINT_REFINE_STEPS, CLOSEST_POINT_SAMPLES};

/// Cubic Bezier in the ground plane (`x`, `z` stored as `Vec2::x`, `Vec2::y`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bezier2 {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
    pub d: Vec2,
}

impl Bezier2 {
    pub fn new(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Self {
        Self { a, b, c, d }
    }

    /// Straight line with control points at thirds.
    pub fn straight(from: Vec2, to: Vec2) -> Self {
        Self {
            a: from,
            b: from + (to - from) / 3.0,
            c: from + (to - from) * 2.0 / 3.0,
            d: to,
        }
    }

    /// Evaluate cubic Bezier at parameter t in [0, 1]
    pub fn evaluate(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let uu = u * u;
        let tt = t * t;
        u * uu * self.a + 3.0 * uu * t * self.b + 3.0 * u * tt * self.c + t * tt * self.d
    }

    /// Tangent (first derivative) at parameter t
    pub fn tangent(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        3.0 * u * u * (self.b - self.a)
            + 6.0 * u * t * (self.c - self.b)
            + 3.0 * t * t * (self.d - self.c)
    }

    /// Parameter of the point on the curve closest to `point`.
    ///
    /// Brackets the minimum with uniform samples, then narrows the bracket with
    /// a fixed number of golden-section steps. The step counts are constants, so
    /// the result depends only on the inputs.
    pub fn closest_t(&self, point: Vec2) -> f32 {
        let n = CLOSEST_POINT_SAMPLES.max(2);
        let mut best_i = 0;
        let mut best_d = f32::INFINITY;
        for i in 0..=n {
            let t = i as f32 / n as f32;
            let d = self.evaluate(t).distance_squared(point);
            if d < best_d {
                best_d = d;
                best_i = i;
            }
        }

        let step = 1.0 / n as f32;
        let mut lo = (best_i as f32 * step - step).max(0.0);
        let mut hi = (best_i as f32 * step + step).min(1.0);

        const INV_PHI: f32 = 0.618_034;
        let dist = |t: f32| self.evaluate(t).distance_squared(point);
        let mut x1 = hi - INV_PHI * (hi - lo);
        let mut x2 = lo + INV_PHI * (hi - lo);
        let mut f1 = dist(x1);
        let mut f2 = dist(x2);
        for _ in 0..CLOSEST_POINT_REFINE_STEPS {
            if f1 <= f2 {
                hi = x2;
                x2 = x1;
                f2 = f1;
                x1 = hi - INV_PHI * (hi - lo);
                f1 = dist(x1);
            } else {
                lo = x1;
                x1 = x2;
                f1 = f2;
                x2 = lo + INV_PHI * (hi - lo);
                f2 = dist(x2);
            }
        }

        let refined = 0.5 * (lo + hi);
        // The sampled endpoint can beat the refined interior point when the
        // minimum sits exactly on t = 0 or t = 1.
        if dist(refined) <= best_d {
            refined
        } else {
            best_i as f32 * step
        }
    }

    /// Distance from `point` to the curve, with the parameter it was found at.
    pub fn distance(&self, point: Vec2) -> (f32, f32) {
        let t = self.closest_t(point);
        (self.evaluate(t).distance(point), t)
    }

    /// Approximate arc length by sampling
    pub fn arc_length(&self) -> f32 {
        let steps = 64;
        let mut length = 0.0_f32;
        let mut prev = self.a;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let pt = self.evaluate(t);
            length += (pt - prev).length();
            prev = pt;
        }
        length
    }
}

/// Host curve with elevation. Only its ground projection is used for zoning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bezier3 {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub d: Vec3,
}

impl Bezier3 {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self { a, b, c, d }
    }

    /// Flat curve at height 0 from a ground-plane curve.
    pub fn from_xz(curve: Bezier2) -> Self {
        let lift = |p: Vec2| Vec3::new(p.x, 0.0, p.y);
        Self {
            a: lift(curve.a),
            b: lift(curve.b),
            c: lift(curve.c),
            d: lift(curve.d),
        }
    }

    pub fn evaluate(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        u * u * u * self.a + 3.0 * u * u * t * self.b + 3.0 * u * t * t * self.c + t * t * t * self.d
    }

    /// Split at `t` (de Casteljau). The halves share the point at `t` exactly.
    pub fn split(&self, t: f32) -> (Bezier3, Bezier3) {
        let t = t.clamp(0.0, 1.0);
        let ab = self.a.lerp(self.b, t);
        let bc = self.b.lerp(self.c, t);
        let cd = self.c.lerp(self.d, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let mid = abc.lerp(bcd, t);
        (
            Bezier3::new(self.a, ab, abc, mid),
            Bezier3::new(mid, bcd, cd, self.d),
        )
    }

    pub fn xz(&self) -> Bezier2 {
        let flat = |p: Vec3| Vec2::new(p.x, p.z);
        Bezier2 {
            a: flat(self.a),
            b: flat(self.b),
            c: flat(self.c),
            d: flat(self.d),
        }
    }
}

/// Which side of its road a block sits on.
///
/// `SideA` is the side the perpendicular `(tangent.y, -tangent.x)` points to.
/// `Right` preferences exclude it; `Left` preferences exclude `SideB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSide {
    SideA,
    SideB,
}

impl BlockSide {
    /// Strictly positive dot products are side A. Zero falls to side B.
    pub fn from_dot(dot: f32) -> Self {
        if dot > 0.0 {
            Self::SideA
        } else {
            Self::SideB
        }
    }
}

/// Dot product of the curve's perpendicular at the point nearest `position`
/// with the block's `direction`. The sign decides the side.
pub fn side_dot(curve: &Bezier2, position: Vec2, direction: Vec2) -> f32 {
    let t = curve.closest_t(position);
    let tangent = curve.tangent(t);
    let perpendicular = Vec2::new(tangent.y, -tangent.x);
    perpendicular.dot(direction)
}

pub fn side_of(curve: &Bezier2, position: Vec2, direction: Vec2) -> BlockSide {
    BlockSide::from_dot(side_dot(curve, position, direction))
}

pub fn classify_block(curve: &Bezier2, block: &BlockSnapshot) -> BlockSide {
    side_of(curve, block.position, block.direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn s_curve() -> Bezier2 {
        Bezier2::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(200.0, 100.0),
            Vec2::new(300.0, 100.0),
        )
    }

    #[test]
    fn test_bezier_evaluate_endpoints() {
        let curve = s_curve();
        assert!((curve.evaluate(0.0) - curve.a).length() < 0.01);
        assert!((curve.evaluate(1.0) - curve.d).length() < 0.01);
    }

    #[test]
    fn test_tangent_of_straight_line_is_constant_direction() {
        let curve = Bezier2::straight(Vec2::ZERO, Vec2::new(90.0, 0.0));
        for t in [0.0, 0.25, 0.5, 1.0] {
            let tan = curve.tangent(t);
            assert!(tan.x > 0.0);
            assert!(tan.y.abs() < 1e-4);
        }
    }

    #[test]
    fn test_arc_length_straight_line() {
        let curve = Bezier2::straight(Vec2::ZERO, Vec2::new(300.0, 0.0));
        assert!((curve.arc_length() - 300.0).abs() < 1.0);
    }

    #[test]
    fn test_closest_t_on_straight_line() {
        let curve = Bezier2::straight(Vec2::ZERO, Vec2::new(100.0, 0.0));
        let t = curve.closest_t(Vec2::new(40.0, 25.0));
        assert!((t - 0.4).abs() < 1e-3, "t = {t}");
    }

    #[test]
    fn test_closest_t_clamps_beyond_ends() {
        let curve = Bezier2::straight(Vec2::ZERO, Vec2::new(100.0, 0.0));
        assert!(curve.closest_t(Vec2::new(-50.0, 3.0)) < 1e-3);
        assert!(curve.closest_t(Vec2::new(180.0, -3.0)) > 1.0 - 1e-3);
    }

    #[test]
    fn test_closest_t_matches_dense_sampling_on_road_like_curves() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let curve = Bezier2::new(
                Vec2::new(0.0, rng.gen_range(-50.0..50.0)),
                Vec2::new(100.0, rng.gen_range(-50.0..50.0)),
                Vec2::new(200.0, rng.gen_range(-50.0..50.0)),
                Vec2::new(300.0, rng.gen_range(-50.0..50.0)),
            );
            let along = rng.gen_range(0.0..1.0);
            let offset = Vec2::new(0.0, rng.gen_range(-20.0..20.0));
            let query = curve.evaluate(along) + offset;
            let (dist, _) = curve.distance(query);
            let dense = (0..=4000)
                .map(|i| curve.evaluate(i as f32 / 4000.0).distance(query))
                .fold(f32::INFINITY, f32::min);
            assert!(dist <= dense + 0.05, "refined {dist} vs dense {dense}");
        }
    }

    #[test]
    fn test_side_dot_is_pure() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            let mut p = || Vec2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
            let curve = Bezier2::new(p(), p(), p(), p());
            let pos = p();
            let dir = p().normalize_or_zero();
            let first = side_dot(&curve, pos, dir);
            let second = side_dot(&curve, pos, dir);
            assert_eq!(first.to_bits(), second.to_bits());
            assert_eq!(side_of(&curve, pos, dir), side_of(&curve, pos, dir));
        }
    }

    #[test]
    fn test_side_of_road_running_north() {
        // Tangent (0, 1): perpendicular is (1, 0).
        let curve = Bezier2::straight(Vec2::ZERO, Vec2::new(0.0, 100.0));
        let pos = Vec2::new(20.0, 50.0);
        assert_eq!(side_of(&curve, pos, Vec2::new(1.0, 0.0)), BlockSide::SideA);
        assert_eq!(side_of(&curve, pos, Vec2::new(-1.0, 0.0)), BlockSide::SideB);
    }

    #[test]
    fn test_side_flips_when_curve_reversed() {
        let forward = Bezier2::straight(Vec2::ZERO, Vec2::new(100.0, 0.0));
        let backward = Bezier2::straight(Vec2::new(100.0, 0.0), Vec2::ZERO);
        let pos = Vec2::new(50.0, 20.0);
        let dir = Vec2::new(0.0, 1.0);
        assert_ne!(side_of(&forward, pos, dir), side_of(&backward, pos, dir));
    }

    #[test]
    fn test_zero_dot_is_side_b() {
        assert_eq!(BlockSide::from_dot(0.0), BlockSide::SideB);
        assert_eq!(BlockSide::from_dot(-0.0), BlockSide::SideB);
        assert_eq!(BlockSide::from_dot(1e-9), BlockSide::SideA);
    }

    #[test]
    fn test_split_halves_meet_and_follow_curve() {
        let curve = Bezier3::from_xz(s_curve());
        let (left, right) = curve.split(0.3);
        assert_eq!(left.d, right.a);
        assert_eq!(left.a, curve.a);
        assert_eq!(right.d, curve.d);
        assert!((left.evaluate(0.5) - curve.evaluate(0.15)).length() < 1e-3);
        assert!((right.evaluate(0.5) - curve.evaluate(0.65)).length() < 1e-3);
    }

    #[test]
    fn test_bezier3_projection_drops_height() {
        let curve = Bezier3::new(
            Vec3::new(1.0, 5.0, 2.0),
            Vec3::new(3.0, 6.0, 4.0),
            Vec3::new(5.0, 7.0, 6.0),
            Vec3::new(7.0, 8.0, 8.0),
        );
        let flat = curve.xz();
        assert_eq!(flat.a, Vec2::new(1.0, 2.0));
        assert_eq!(flat.d, Vec2::new(7.0, 8.0));
    }
}
