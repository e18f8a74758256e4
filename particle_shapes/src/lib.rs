//! # particle_shapes
//!
//! Closed-form target point clouds for a morphing particle field.
//!
//! Every shape maps a particle count `N` to exactly `N` points.  Index `i` of
//! one shape has no spatial relation to index `i` of another: switching shapes
//! re-binds each particle to whatever point this generator assigned to its
//! index, which the animation core turns into a continuous morph.
//!
//! | Shape | Construction |
//! |---|---|
//! | `Heart` | Parametric heart curve swept through a second angle for volume |
//! | `Flower` | Golden-angle phyllotaxis disc with petal undulation in z |
//! | `Saturn` | Solid planet (40 %) plus a tilted thin ring (60 %) |
//! | `Buddha` | Stacked primitives: head sphere, torso ellipsoid, base ring |
//! | `Firework` | Large uniform solid sphere |
//! | `Sphere` | Default / fallback uniform solid sphere |
//!
//! ## Quick start
//!
//! ```rust
//! use particle_shapes::{generate, ShapeKind};
//!
//! let heart = generate(ShapeKind::Heart, 8000);
//! assert_eq!(heart.len(), 8000);
//! assert_eq!(heart.to_flat().len(), 24_000);
//! ```

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use glam::{Quat, Vec3};
use rand::Rng;

/// A single 3D position.  Value type; particles have no identity beyond index.
pub type Point3 = Vec3;

// ════════════════════════════════════════════════════════════════════════════
// Shape constants
// ════════════════════════════════════════════════════════════════════════════

/// Radius of the default sphere distribution.
pub const SPHERE_RADIUS:   f32 = 4.0;
/// Radius of the firework burst.
pub const FIREWORK_RADIUS: f32 = 8.0;
/// Uniform scale applied to the raw heart curve.
pub const HEART_SCALE:     f32 = 0.3;
/// Golden angle in radians (≈ 137.5°).
pub const GOLDEN_ANGLE:    f32 = 2.39996;
const GOLDEN_ANGLE_F64:    f64 = 2.39996;
/// Outer radius of the phyllotaxis disc.
pub const FLOWER_RADIUS:   f32 = 5.0;
/// Saturn planet body radius.
pub const PLANET_RADIUS:   f32 = 2.5;
/// Inner edge of Saturn's ring.
pub const RING_INNER:      f32 = 3.5;
/// Radial width of Saturn's ring.
pub const RING_WIDTH:      f32 = 3.0;
/// Total vertical thickness of Saturn's ring.
pub const RING_THICKNESS:  f32 = 0.2;
/// Ring tilt (applied about X, then about Z).
pub const RING_TILT:       f32 = PI * 0.1;

// ════════════════════════════════════════════════════════════════════════════
// ShapeKind
// ════════════════════════════════════════════════════════════════════════════

/// The closed set of target shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Heart,
    Flower,
    Saturn,
    Buddha,
    Firework,
    #[default]
    Sphere,
}

impl ShapeKind {
    /// Shapes offered in the shape selector, in menu order.
    /// `Sphere` is the fallback and is not user-selectable.
    pub const SELECTABLE: [ShapeKind; 5] = [
        ShapeKind::Heart,
        ShapeKind::Flower,
        ShapeKind::Saturn,
        ShapeKind::Buddha,
        ShapeKind::Firework,
    ];

    /// Short lower-case identifier, as used in config files and on the CLI.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Heart    => "heart",
            ShapeKind::Flower   => "flower",
            ShapeKind::Saturn   => "saturn",
            ShapeKind::Buddha   => "buddha",
            ShapeKind::Firework => "firework",
            ShapeKind::Sphere   => "sphere",
        }
    }

    /// Display label for the shape selector.
    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Heart    => "❤️ Heart",
            ShapeKind::Flower   => "🌸 Flower",
            ShapeKind::Saturn   => "🪐 Saturn",
            ShapeKind::Buddha   => "🧘 Buddha",
            ShapeKind::Firework => "🎆 Firework",
            ShapeKind::Sphere   => "⚪ Sphere",
        }
    }

    /// Look up a shape by name, ignoring case.
    ///
    /// Unknown names fall back to [`ShapeKind::Sphere`] instead of failing.
    pub fn from_name(name: &str) -> ShapeKind {
        let key = name.trim().to_ascii_lowercase();
        match key.as_str() {
            "heart"    => ShapeKind::Heart,
            "flower"   => ShapeKind::Flower,
            "saturn"   => ShapeKind::Saturn,
            "buddha"   => ShapeKind::Buddha,
            "firework" => ShapeKind::Firework,
            "sphere"   => ShapeKind::Sphere,
            other => {
                tracing::debug!(name = other, "unknown shape, falling back to sphere");
                ShapeKind::Sphere
            }
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ShapeKind::from_name(s))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TargetBuffer
// ════════════════════════════════════════════════════════════════════════════

/// The destination point cloud for one shape: exactly `count` points.
///
/// Immutable once generated; a shape change produces a whole new buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetBuffer {
    points: Vec<Point3>,
}

impl TargetBuffer {
    pub fn len(&self)      -> usize     { self.points.len() }
    pub fn is_empty(&self) -> bool      { self.points.is_empty() }
    pub fn points(&self)   -> &[Point3] { &self.points }

    pub fn get(&self, i: usize) -> Option<Point3> {
        self.points.get(i).copied()
    }

    /// Interleaved `x, y, z` floats, `3 * len()` values.
    pub fn to_flat(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| p.to_array()).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Generators
// ════════════════════════════════════════════════════════════════════════════

/// Generate `count` target points for `shape` using the thread-local RNG.
pub fn generate(shape: ShapeKind, count: usize) -> TargetBuffer {
    generate_with(shape, count, &mut rand::thread_rng())
}

/// Generate `count` target points for `shape` with a caller-supplied RNG.
///
/// Never fails; the stochastic shapes differ between calls unless `rng`
/// is seeded identically.
pub fn generate_with<R: Rng + ?Sized>(shape: ShapeKind, count: usize, rng: &mut R) -> TargetBuffer {
    let mut points = Vec::with_capacity(count);
    // Integer floor so the split is exact for every count.
    let planet_count = count * 2 / 5;
    let tilt = ring_tilt();

    for i in 0..count {
        let p = match shape {
            ShapeKind::Heart => heart_point(rng),
            ShapeKind::Flower => flower_point(i, rng),
            ShapeKind::Saturn => {
                if i < planet_count {
                    random_in_sphere(PLANET_RADIUS, rng)
                } else {
                    tilt * ring_point(rng)
                }
            }
            ShapeKind::Buddha => buddha_point(i as f32 / count as f32, rng),
            ShapeKind::Firework => random_in_sphere(FIREWORK_RADIUS, rng),
            ShapeKind::Sphere => random_in_sphere(SPHERE_RADIUS, rng),
        };
        points.push(p);
    }

    TargetBuffer { points }
}

/// Uniform random point inside a solid sphere of `radius`.
///
/// The cube root on the radial draw keeps volumetric density uniform; a
/// plain uniform radius would crowd points toward the centre.
pub fn random_in_sphere<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Point3 {
    let u: f32 = rng.gen();
    let v: f32 = rng.gen();
    let theta = 2.0 * PI * u;
    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    let r = rng.gen::<f32>().cbrt() * radius;
    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Phyllotaxis angle of particle `i`, wrapped to `[0, 2π)`.
///
/// Accumulated in f64: `i · 2.39996` in f32 drifts by ~1e-3 rad at i = 8000.
pub fn flower_angle(i: usize) -> f32 {
    (i as f64 * GOLDEN_ANGLE_F64).rem_euclid(std::f64::consts::TAU) as f32
}

/// Combined ring rotation: about X first, then about Z.
pub fn ring_tilt() -> Quat {
    Quat::from_rotation_z(RING_TILT) * Quat::from_rotation_x(RING_TILT)
}

fn heart_point<R: Rng + ?Sized>(rng: &mut R) -> Point3 {
    let t = rng.gen::<f32>() * PI * 2.0;
    let u = rng.gen::<f32>() * PI;

    let x = 16.0 * t.sin().powi(3) * u.sin();
    let y = (13.0 * t.cos()
        - 5.0 * (2.0 * t).cos()
        - 2.0 * (3.0 * t).cos()
        - (4.0 * t).cos())
        * u.sin();
    let z = 6.0 * u.cos();

    Vec3::new(x, y, z) * HEART_SCALE
}

fn flower_point<R: Rng + ?Sized>(i: usize, rng: &mut R) -> Point3 {
    let r = FLOWER_RADIUS * rng.gen::<f32>().sqrt();
    let theta = flower_angle(i);
    // Petals fade toward the rim.
    let petal = (theta * 5.0).sin();
    Vec3::new(
        r * theta.cos(),
        r * theta.sin(),
        petal * 2.0 * (1.0 - r / 6.0),
    )
}

/// Untilted ring point, flat in the XZ plane.
fn ring_point<R: Rng + ?Sized>(rng: &mut R) -> Point3 {
    let angle = rng.gen::<f32>() * PI * 2.0;
    let radius = RING_INNER + rng.gen::<f32>() * RING_WIDTH;
    Vec3::new(
        angle.cos() * radius,
        (rng.gen::<f32>() - 0.5) * RING_THICKNESS,
        angle.sin() * radius,
    )
}

fn buddha_point<R: Rng + ?Sized>(ratio: f32, rng: &mut R) -> Point3 {
    if ratio < 0.2 {
        // head
        random_in_sphere(1.2, rng) + Vec3::new(0.0, 3.5, 0.0)
    } else if ratio < 0.6 {
        // torso, wider at the shoulders and taller than it is deep
        random_in_sphere(2.2, rng) * Vec3::new(1.2, 1.5, 1.0) + Vec3::new(0.0, 0.5, 0.0)
    } else {
        // crossed legs / base
        let t = rng.gen::<f32>() * PI * 2.0;
        let r = 2.0 + rng.gen::<f32>() * 2.5;
        Vec3::new(
            r * t.cos(),
            (rng.gen::<f32>() - 0.5) * 2.0 - 2.5,
            r * t.sin(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ALL: [ShapeKind; 6] = [
        ShapeKind::Heart,
        ShapeKind::Flower,
        ShapeKind::Saturn,
        ShapeKind::Buddha,
        ShapeKind::Firework,
        ShapeKind::Sphere,
    ];

    fn rng() -> StdRng { StdRng::seed_from_u64(0x5eed) }

    #[test]
    fn count_preserved_and_finite() {
        let mut rng = rng();
        for shape in ALL {
            for count in [0usize, 1, 2, 7, 100, 1001] {
                let buf = generate_with(shape, count, &mut rng);
                assert_eq!(buf.len(), count, "{} with {}", shape, count);
                assert!(
                    buf.points().iter().all(|p| p.is_finite()),
                    "{} produced a non-finite point", shape
                );
            }
        }
    }

    #[test]
    fn empty_buffer() {
        let buf = generate(ShapeKind::Heart, 0);
        assert!(buf.is_empty());
        assert!(buf.to_flat().is_empty());
        assert_eq!(buf.get(0), None);
    }

    #[test]
    fn sphere_density_is_volumetric() {
        let mut rng = rng();
        let n = 20_000;
        let buf = generate_with(ShapeKind::Sphere, n, &mut rng);
        let within = |frac: f32| {
            buf.points().iter()
                .filter(|p| p.length() <= SPHERE_RADIUS * frac)
                .count() as f32 / n as f32
        };
        // r³ law: P(r ≤ R/2) = 1/8, P(r ≤ 0.8R) = 0.512.
        // A surface-biased (linear) draw would give 0.5 and 0.8.
        assert!((within(0.5) - 0.125).abs() < 0.02, "got {}", within(0.5));
        assert!((within(0.8) - 0.512).abs() < 0.02, "got {}", within(0.8));
        assert!(buf.points().iter().all(|p| p.length() <= SPHERE_RADIUS + 1e-4));
    }

    #[test]
    fn flower_angle_holds_precision_at_full_count() {
        let two_pi = std::f64::consts::TAU;
        let worst = (0..8000usize)
            .map(|i| {
                let exact = (i as f64 * 2.39996).rem_euclid(two_pi);
                let mut d = (flower_angle(i) as f64 - exact).abs();
                if d > std::f64::consts::PI { d = two_pi - d; }
                d
            })
            .fold(0.0f64, f64::max);
        assert!(worst < 1e-5, "worst angle error {}", worst);
        assert!((0.0..std::f32::consts::TAU).contains(&flower_angle(7999)));
    }

    #[test]
    fn flower_follows_golden_angle() {
        let mut rng = rng();
        let n = 500;
        let buf = generate_with(ShapeKind::Flower, n, &mut rng);
        let two_pi = std::f64::consts::TAU;

        let mut angles = Vec::with_capacity(n);
        for (i, p) in buf.points().iter().enumerate() {
            let expected = (flower_angle(i) as f64).rem_euclid(two_pi);
            angles.push(expected);
            if p.truncate().length() < 1e-3 { continue; }
            let actual = (p.y as f64).atan2(p.x as f64).rem_euclid(two_pi);
            let mut diff = (actual - expected).abs();
            if diff > std::f64::consts::PI { diff = two_pi - diff; }
            assert!(diff < 1e-3, "index {}: {} vs {}", i, actual, expected);
        }

        // Successive angles advance by the golden angle.
        for i in 1..n {
            let step = (flower_angle(i) as f64 - flower_angle(i - 1) as f64).rem_euclid(two_pi);
            assert!((step - GOLDEN_ANGLE as f64).abs() < 1e-5);
        }

        // No two particles share an angle.
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let min_gap = angles.windows(2).map(|w| w[1] - w[0]).fold(f64::MAX, f64::min);
        assert!(min_gap > 1e-4, "min angular gap {}", min_gap);
    }

    #[test]
    fn flower_stays_in_disc() {
        let buf = generate_with(ShapeKind::Flower, 2000, &mut rng());
        for p in buf.points() {
            assert!(p.truncate().length() <= FLOWER_RADIUS + 1e-4);
            assert!(p.z.abs() <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn saturn_split_planet_and_ring() {
        let mut rng = rng();
        for count in [7usize, 10, 1000, 8000] {
            let buf = generate_with(ShapeKind::Saturn, count, &mut rng);
            let planet = count * 2 / 5;
            let ring_max = ((RING_INNER + RING_WIDTH).powi(2)
                + (RING_THICKNESS / 2.0).powi(2)).sqrt();

            for (i, p) in buf.points().iter().enumerate() {
                let r = p.length();
                if i < planet {
                    assert!(r <= PLANET_RADIUS + 1e-4, "planet point {} at {}", i, r);
                } else {
                    assert!(r >= RING_INNER - 1e-4 && r <= ring_max + 1e-4,
                        "ring point {} at {}", i, r);
                }
            }
            let inside = buf.points().iter().filter(|p| p.length() <= PLANET_RADIUS + 1e-4).count();
            assert_eq!(inside, planet);
        }
    }

    #[test]
    fn saturn_ring_is_tilted() {
        let buf = generate_with(ShapeKind::Saturn, 1000, &mut rng());
        // Undo the tilt: every ring point lies back in the thin XZ slab.
        let undo = ring_tilt().inverse();
        for p in &buf.points()[400..] {
            let flat = undo * *p;
            assert!(flat.y.abs() <= RING_THICKNESS / 2.0 + 1e-4);
        }
        // With the tilt applied, at least some ring points leave that slab.
        assert!(buf.points()[400..].iter().any(|p| p.y.abs() > 0.5));
    }

    #[test]
    fn heart_scenario_8000() {
        let buf = generate_with(ShapeKind::Heart, 8000, &mut rng());
        let flat = buf.to_flat();
        assert_eq!(flat.len(), 24_000);
        assert!(flat.iter().all(|v| v.is_finite()));
        // The heart polynomial spans y ∈ [-17, ~11.93] before the 0.3 scale.
        for p in buf.points() {
            assert!(p.y >= -17.0 * HEART_SCALE - 1e-3 && p.y <= 12.0 * HEART_SCALE);
            assert!(p.x.abs() <= 16.0 * HEART_SCALE + 1e-3);
            assert!(p.z.abs() <= 6.0 * HEART_SCALE + 1e-3);
        }
    }

    #[test]
    fn buddha_sections() {
        let n = 1000;
        let buf = generate_with(ShapeKind::Buddha, n, &mut rng());
        let head = Vec3::new(0.0, 3.5, 0.0);
        for (i, p) in buf.points().iter().enumerate() {
            if i < 200 {
                assert!(p.distance(head) <= 1.2 + 1e-4);
            } else if i >= 600 {
                assert!(p.y >= -3.5 - 1e-4 && p.y <= -1.5 + 1e-4);
                let r = Vec3::new(p.x, 0.0, p.z).length();
                assert!(r >= 2.0 - 1e-4 && r <= 4.5 + 1e-4);
            }
        }
    }

    #[test]
    fn firework_is_larger_than_sphere() {
        let mut rng = rng();
        let fw = generate_with(ShapeKind::Firework, 2000, &mut rng);
        let max = fw.points().iter().map(|p| p.length()).fold(0.0, f32::max);
        assert!(max > SPHERE_RADIUS && max <= FIREWORK_RADIUS + 1e-4);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_with(ShapeKind::Buddha, 300, &mut StdRng::seed_from_u64(9));
        let b = generate_with(ShapeKind::Buddha, 300, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_name_falls_back_to_sphere() {
        assert_eq!(ShapeKind::from_name("Heart"), ShapeKind::Heart);
        assert_eq!(ShapeKind::from_name(" SATURN "), ShapeKind::Saturn);
        assert_eq!(ShapeKind::from_name("hart"), ShapeKind::Sphere);
        assert_eq!("".parse::<ShapeKind>().unwrap(), ShapeKind::Sphere);
        assert_eq!(ShapeKind::default(), ShapeKind::Sphere);
    }

    #[test]
    fn name_round_trips_for_selectable() {
        for shape in ShapeKind::SELECTABLE {
            assert_eq!(ShapeKind::from_name(shape.name()), shape);
            assert!(shape.label().to_lowercase().contains(shape.name()));
        }
    }
}
