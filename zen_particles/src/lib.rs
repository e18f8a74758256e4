//! # zen_particles
//!
//! A field of particles that morphs between shapes and breathes with your
//! hands, drawn into a software-rendered window.
//!
//! ## Gesture → Motion mapping
//!
//! | Hands seen | Measure | Openness factor |
//! |---|---|---|
//! | none | n/a | idle: slow breathing around scale 1.0, camera orbits |
//! | one | thumb tip ↔ index tip (3D) | `clamp((d − 0.02) · 5, 0, 1)` |
//! | two | wrist ↔ wrist (image plane) | `clamp((d − 0.2) · 1.5, 0, 1)` |
//!
//! The factor is low-pass filtered (`0.8 · prev + 0.2 · new`) and sets the
//! cloud's scale (`0.5 + 2 · factor`).  Above 0.8 the particles start to
//! scatter like a firework.
//!
//! ## Feature flags
//!
//! * (default): **simulation mode**, keyboard keys stand in for hands.
//! * `leap`: **hardware mode**, polls a real LeapMotion controller via LeapC.
//!
//! ### Keyboard
//!
//! | Key | Action |
//! |---|---|
//! | `1`–`5` | Heart, Flower, Saturn, Buddha, Firework |
//! | `C` | Next palette colour |
//! | `X` | Type a `#rrggbb` tint on stdin |
//! | click | Pick a palette swatch |
//! | `H` | Simulated hand on / off |
//! | `B` | Simulated second hand on / off |
//! | `Up` / hold | Open the hand (or spread both hands) |
//! | `Down` / hold | Close the hand (or bring hands together) |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod cli;
pub mod config;
pub mod gesture;
pub mod landmarks;
pub mod visualizer;
