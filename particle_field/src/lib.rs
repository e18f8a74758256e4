//! # particle_field
//!
//! The per-frame animation core of the particle toy.
//!
//! A [`ParticleField`] owns two equally long buffers:
//!
//! * the **target buffer**, generated by [`particle_shapes`] whenever the
//!   shape changes, and
//! * the **live buffer**, mutated in place every frame and handed to the
//!   renderer.
//!
//! ## Frame → motion mapping
//!
//! | Input | Effect |
//! |---|---|
//! | No hand | Idle breathing, scale `1 + 0.1·sin(0.5t)` |
//! | Hand, factor `f` | Scale `0.5 + 2f` (closed shrinks, open grows) |
//! | Hand, `f > 0.8` | Extra per-frame scatter, up to ±1.0 per axis |
//! | Time | Vertical undulation `0.1·sin(2t + 0.5x)` |
//! | Δt | Live buffer covers `1 − e^(−3Δt)` of the gap to its goal |
//!
//! ```rust
//! use particle_field::{Appearance, FrameInput, GestureState, ParticleField, Rgb};
//! use particle_shapes::ShapeKind;
//!
//! let tint = Rgb::from_hex("#ff0055").unwrap();
//! let mut field = ParticleField::new(8000, Appearance { shape: ShapeKind::Heart, tint });
//! let input = FrameInput { elapsed: 0.0, delta: 1.0 / 60.0, gesture: GestureState::ABSENT };
//! field.step(&input, tint);
//! assert_eq!(field.live().len(), 8000);
//! ```

pub mod color;
pub mod field;

pub use color::Rgb;
pub use field::{
    breathing_noise, explosion_factor, smoothing_alpha, target_scale,
    Appearance, FrameInput, FrameParams, GestureState, ParticleField,
};
pub use particle_shapes::{Point3, ShapeKind};
