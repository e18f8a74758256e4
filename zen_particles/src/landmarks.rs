//! Hand landmarks → openness factor.
//!
//! Landmarks use the 21-keypoint hand layout with coordinates normalised to
//! roughly 0.0–1.0 across the sensor's field of view.  Only three keypoints
//! matter here: the wrist, the thumb tip and the index fingertip.

use glam::Vec3;
use particle_field::GestureState;

// ════════════════════════════════════════════════════════════════════════════
// Landmarks
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:          usize = 0;
pub const THUMB_TIP:      usize = 4;
pub const INDEX_TIP:      usize = 8;
pub const KEYPOINT_COUNT: usize = 21;

/// One normalised keypoint.
pub type Landmark = Vec3;

/// Distance in the image plane, ignoring depth.
pub fn planar_distance(a: Landmark, b: Landmark) -> f32 {
    a.truncate().distance(b.truncate())
}

/// All keypoints of one detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; KEYPOINT_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; KEYPOINT_COUNT]) -> Self {
        HandLandmarks { points }
    }

    /// A hand known only by the three keypoints the factor needs; every
    /// other keypoint is parked on the wrist.
    pub fn sparse(wrist: Landmark, thumb_tip: Landmark, index_tip: Landmark) -> Self {
        let mut points = [wrist; KEYPOINT_COUNT];
        points[THUMB_TIP] = thumb_tip;
        points[INDEX_TIP] = index_tip;
        HandLandmarks { points }
    }

    pub fn point(&self, i: usize) -> Landmark { self.points[i] }
    pub fn wrist(&self)     -> Landmark { self.points[WRIST] }
    pub fn thumb_tip(&self) -> Landmark { self.points[THUMB_TIP] }
    pub fn index_tip(&self) -> Landmark { self.points[INDEX_TIP] }
}

// ════════════════════════════════════════════════════════════════════════════
// Factor derivation
// ════════════════════════════════════════════════════════════════════════════

/// Thumb–index distance at which a pinch reads as fully closed.
pub const PINCH_CLOSED: f32 = 0.02;
pub const PINCH_GAIN:   f32 = 5.0;
/// Wrist–wrist distance at which two hands read as together.
pub const SPREAD_CLOSED: f32 = 0.2;
pub const SPREAD_GAIN:   f32 = 1.5;

/// One hand: pinch openness from the thumb and index tips (3D distance).
pub fn pinch_factor(hand: &HandLandmarks) -> f32 {
    let d = hand.thumb_tip().distance(hand.index_tip());
    ((d - PINCH_CLOSED) * PINCH_GAIN).clamp(0.0, 1.0)
}

/// Two hands: how far apart the wrists are in the image plane.
pub fn spread_factor(a: &HandLandmarks, b: &HandLandmarks) -> f32 {
    let d = planar_distance(a.wrist(), b.wrist());
    ((d - SPREAD_CLOSED) * SPREAD_GAIN).clamp(0.0, 1.0)
}

/// Raw openness for whatever hands were detected this frame.
///
/// `None` when no hand is visible.  With more than two hands only the first
/// two are used.
pub fn raw_factor(hands: &[HandLandmarks]) -> Option<f32> {
    match hands {
        []           => None,
        [one]        => Some(pinch_factor(one)),
        [a, b, ..]   => Some(spread_factor(a, b)),
    }
}

/// The reading a producer publishes for one sensor frame.
pub fn reading_for(hands: &[HandLandmarks]) -> GestureState {
    match raw_factor(hands) {
        Some(f) => GestureState::present(f),
        None    => GestureState { factor: 0.0, present: false },
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSmoother
// ════════════════════════════════════════════════════════════════════════════

/// Low-pass filter applied by the app to each published reading:
/// `prev · 0.8 + new · 0.2`, snapping back to the neutral 0.5 whenever the
/// hand disappears.
#[derive(Clone, Debug)]
pub struct GestureSmoother {
    factor: f32,
}

impl GestureSmoother {
    pub const KEEP: f32 = 0.8;

    pub fn new() -> Self {
        GestureSmoother { factor: GestureState::NEUTRAL_FACTOR }
    }

    pub fn factor(&self) -> f32 { self.factor }

    pub fn apply(&mut self, reading: GestureState) -> GestureState {
        if !reading.present {
            self.factor = GestureState::NEUTRAL_FACTOR;
            return GestureState::ABSENT;
        }
        self.factor = self.factor * Self::KEEP + reading.factor * (1.0 - Self::KEEP);
        GestureState::present(self.factor)
    }
}

impl Default for GestureSmoother {
    fn default() -> Self { Self::new() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
