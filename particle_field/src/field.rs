//! The live particle buffer and its per-frame update.
//!
//! Each frame the field computes a gesture- and time-dependent transform of
//! the current shape's target buffer and pulls every live particle toward it
//! with exponential smoothing.  Index `i` of the live buffer always chases
//! index `i` of the target buffer.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use particle_shapes::{generate_with, Point3, ShapeKind, TargetBuffer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::Rgb;

// ════════════════════════════════════════════════════════════════════════════
// Tuning constants
// ════════════════════════════════════════════════════════════════════════════

/// Idle breathing: scale = 1 + AMPLITUDE · sin(RATE · t).
pub const BREATH_AMPLITUDE:   f32 = 0.1;
pub const BREATH_RATE:        f32 = 0.5;
/// Gesture scale: MIN at a closed hand, MIN + RANGE fully open.
pub const SCALE_MIN:          f32 = 0.5;
pub const SCALE_RANGE:        f32 = 2.0;
/// Factor above which the scatter shimmer kicks in.
pub const EXPLOSION_THRESHOLD: f32 = 0.8;
pub const EXPLOSION_GAIN:     f32 = 2.0;
/// Full width of the per-axis scatter box per unit of explosion factor.
pub const EXPLOSION_SPREAD:   f32 = 5.0;
/// Vertical undulation: AMPLITUDE · sin(2t + 0.5·x).
pub const NOISE_AMPLITUDE:    f32 = 0.1;
/// Exponential smoothing rate (1/s).
pub const SMOOTHING_RATE:     f32 = 3.0;
/// Per-frame color blend weight.
pub const TINT_BLEND:         f32 = 0.05;
pub const BASE_POINT_SIZE:    f32 = 0.08;
/// Spin about the vertical axis (rad/s).
pub const SPIN_RATE:          f32 = 0.1;
pub const SATURN_WOBBLE:      f32 = 0.2;
pub const SATURN_WOBBLE_RATE: f32 = 0.2;
/// Edge length of the cube the live buffer starts scattered in.
pub const SCATTER_EXTENT:     f32 = 10.0;

// ════════════════════════════════════════════════════════════════════════════
// Inputs
// ════════════════════════════════════════════════════════════════════════════

/// Latest gesture reading handed to the animation core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureState {
    /// Openness in 0.0–1.0; only meaningful while `present`.
    pub factor:  f32,
    pub present: bool,
}

impl GestureState {
    /// Neutral factor reported whenever no hand is present.
    pub const NEUTRAL_FACTOR: f32 = 0.5;

    pub const ABSENT: GestureState = GestureState {
        factor:  Self::NEUTRAL_FACTOR,
        present: false,
    };

    pub fn present(factor: f32) -> Self {
        GestureState { factor: factor.clamp(0.0, 1.0), present: true }
    }

    /// The factor consumers should use: the reading when present, the
    /// neutral default otherwise (never a stale value).
    pub fn effective_factor(&self) -> f32 {
        if self.present { self.factor } else { Self::NEUTRAL_FACTOR }
    }
}

impl Default for GestureState {
    fn default() -> Self { GestureState::ABSENT }
}

/// User-controlled look of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    pub shape: ShapeKind,
    pub tint:  Rgb,
}

/// Everything one frame needs besides the field itself.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    /// Seconds since the view started.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta:   f32,
    pub gesture: GestureState,
}

/// Derived per-frame parameters, returned by [`ParticleField::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    pub scale:     f32,
    pub explosion: f32,
    pub alpha:     f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Per-frame formulas
// ════════════════════════════════════════════════════════════════════════════

/// Uniform scale applied to the targets this frame.
pub fn target_scale(gesture: GestureState, elapsed: f32) -> f32 {
    if gesture.present {
        SCALE_MIN + gesture.factor * SCALE_RANGE
    } else {
        1.0 + (elapsed * BREATH_RATE).sin() * BREATH_AMPLITUDE
    }
}

/// Scatter magnitude: ramps 0 → 0.4 as the factor goes 0.8 → 1.0.
pub fn explosion_factor(gesture: GestureState) -> f32 {
    if gesture.present && gesture.factor > EXPLOSION_THRESHOLD {
        (gesture.factor - EXPLOSION_THRESHOLD) * EXPLOSION_GAIN
    } else {
        0.0
    }
}

/// Vertical undulation for a particle whose target sits at `target_x`.
pub fn breathing_noise(elapsed: f32, target_x: f32) -> f32 {
    (elapsed * 2.0 + target_x * 0.5).sin() * NOISE_AMPLITUDE
}

/// Fraction of the remaining distance covered in `delta` seconds.
///
/// `1 - e^(-rate·Δt)` composes across frames, so two half-steps land where
/// one full step does.  Never exceeds 1, so a long stall cannot overshoot.
pub fn smoothing_alpha(delta: f32) -> f32 {
    1.0 - (-SMOOTHING_RATE * delta.max(0.0)).exp()
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

/// Live and target buffers plus the visual state of their owning transform.
pub struct ParticleField {
    shape:      ShapeKind,
    targets:    TargetBuffer,
    live:       Vec<Point3>,
    color:      Rgb,
    point_size: f32,
    /// Rotation of the owning transform, never baked into `live`.
    yaw:        f32,
    tilt:       f32,
    rng:        StdRng,
}

impl ParticleField {
    /// Build a field of `count` particles scattered randomly, aiming at
    /// `appearance.shape`.
    pub fn new(count: usize, appearance: Appearance) -> Self {
        Self::build(count, appearance, StdRng::from_entropy())
    }

    /// Like [`ParticleField::new`] but reproducible.
    pub fn with_seed(count: usize, appearance: Appearance, seed: u64) -> Self {
        Self::build(count, appearance, StdRng::seed_from_u64(seed))
    }

    fn build(count: usize, appearance: Appearance, mut rng: StdRng) -> Self {
        let live = (0..count)
            .map(|_| {
                Vec3::new(
                    (rng.gen::<f32>() - 0.5) * SCATTER_EXTENT,
                    (rng.gen::<f32>() - 0.5) * SCATTER_EXTENT,
                    (rng.gen::<f32>() - 0.5) * SCATTER_EXTENT,
                )
            })
            .collect();
        let targets = generate_with(appearance.shape, count, &mut rng);
        tracing::debug!(count, shape = %appearance.shape, "particle field created");

        ParticleField {
            shape: appearance.shape,
            targets,
            live,
            color: appearance.tint,
            point_size: BASE_POINT_SIZE,
            yaw: 0.0,
            tilt: 0.0,
            rng,
        }
    }

    /// Switch the target shape.  Regenerates the target buffer only when the
    /// shape actually changes; returns whether it did.  The live buffer is
    /// left where it is and morphs over the following frames.
    pub fn set_shape(&mut self, shape: ShapeKind) -> bool {
        if shape == self.shape {
            return false;
        }
        self.targets = generate_with(shape, self.live.len(), &mut self.rng);
        tracing::debug!(from = %self.shape, to = %shape, "target buffer regenerated");
        self.shape = shape;
        true
    }

    /// Advance one frame: pull every live particle toward its scaled,
    /// noised and (when wide open) scattered target, blend the color toward
    /// `tint`, and turn the owning transform.
    pub fn step(&mut self, input: &FrameInput, tint: Rgb) -> FrameParams {
        let t = input.elapsed;
        let scale = target_scale(input.gesture, t);
        let explosion = explosion_factor(input.gesture);
        let alpha = smoothing_alpha(input.delta);

        self.color = self.color.lerp(tint, TINT_BLEND);
        self.point_size = BASE_POINT_SIZE * scale;

        let spread = explosion * EXPLOSION_SPREAD;
        for (live, target) in self.live.iter_mut().zip(self.targets.points()) {
            let noise = breathing_noise(t, target.x);
            let mut goal = *target * scale;
            if explosion > 0.0 {
                // Re-rolled every frame: a shimmer, not a displacement.
                goal += Vec3::new(
                    (self.rng.gen::<f32>() - 0.5) * spread,
                    (self.rng.gen::<f32>() - 0.5) * spread,
                    (self.rng.gen::<f32>() - 0.5) * spread,
                );
            }
            goal.y += noise;
            *live += (goal - *live) * alpha;
        }

        self.yaw = (self.yaw + input.delta.max(0.0) * SPIN_RATE).rem_euclid(TAU);
        if self.shape == ShapeKind::Saturn {
            self.tilt = (t * SATURN_WOBBLE_RATE).sin() * SATURN_WOBBLE;
        } else {
            self.tilt -= self.tilt * alpha;
        }

        FrameParams { scale, explosion, alpha }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn len(&self)         -> usize         { self.live.len() }
    pub fn is_empty(&self)    -> bool          { self.live.is_empty() }
    pub fn shape(&self)       -> ShapeKind     { self.shape }
    pub fn live(&self)        -> &[Point3]     { &self.live }
    pub fn targets(&self)     -> &TargetBuffer { &self.targets }
    pub fn color(&self)       -> Rgb           { self.color }
    pub fn point_size(&self)  -> f32           { self.point_size }
    pub fn yaw(&self)         -> f32           { self.yaw }
    pub fn tilt(&self)        -> f32           { self.tilt }

    /// Interleaved `x, y, z` copy of the live buffer.
    pub fn live_flat(&self) -> Vec<f32> {
        self.live.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Orientation of the owning transform (yaw about Y, then tilt about Z
    /// in the object's frame).
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_z(self.tilt)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
