//! Top-level application state machine.
//!
//! `AppState` owns the `ParticleField`, the user-controlled `Appearance`,
//! the palette and the gesture smoother.  Each frame it takes the latest
//! published gesture reading, steps the field and hands a `FrameView` to the
//! visualizer.

use std::f32::consts::TAU;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::Context;
use particle_field::{Appearance, FrameInput, FrameParams, GestureState, ParticleField, Rgb};
use tracing::{info, warn};

use crate::config::{AppConfig, SourceKind};
use crate::gesture::{
    spawn_gesture_source, GestureHandle, GestureSlot, SimGestureSource, SimInput, SourceStatus,
};
use crate::landmarks::GestureSmoother;
use crate::visualizer::{hand_readout, FrameView, Presenter, UiCommand, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

/// Camera auto-orbit speed (rad/s) while no hand is in view.
pub const AUTO_ORBIT_RATE: f32 = TAU / 60.0 * 0.5;

pub struct AppState {
    // ── animation ────────────────────────────────────────────────────────
    field:       ParticleField,
    appearance:  Appearance,
    /// View-only camera yaw; never touches the particles.
    camera_yaw:  f32,

    // ── colour controls ──────────────────────────────────────────────────
    palette:     Vec<Rgb>,
    /// Palette entry matching the current tint, if any.
    palette_idx: Option<usize>,

    // ── gesture ──────────────────────────────────────────────────────────
    smoother:    GestureSmoother,
    gesture:     GestureState,
    /// Sequence number of the last reading fed to the smoother.
    last_seq:    u64,
    source:      SourceStatus,

    // ── status line ──────────────────────────────────────────────────────
    pub status:  String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> anyhow::Result<Self> {
        let appearance = cfg.appearance()?;
        let palette = cfg.palette_colors()?;
        let field = ParticleField::new(cfg.particle_count, appearance);
        Ok(Self::from_parts(field, appearance, palette))
    }

    fn from_parts(field: ParticleField, appearance: Appearance, palette: Vec<Rgb>) -> Self {
        let palette_idx = palette.iter().position(|c| *c == appearance.tint);
        let mut app = AppState {
            field,
            appearance,
            camera_yaw: 0.0,
            palette,
            palette_idx,
            smoother: GestureSmoother::new(),
            gesture:  GestureState::ABSENT,
            last_seq: 0,
            source:   SourceStatus::Starting,
            status:   String::new(),
        };
        app.refresh_status();
        app
    }

    // ── user controls ────────────────────────────────────────────────────

    /// Apply one UI action.  Only the appearance changes; positions are left
    /// to morph on their own.
    pub fn handle_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::SelectShape(shape) => {
                self.appearance.shape = shape;
                if self.field.set_shape(shape) {
                    info!(%shape, "model selected");
                }
            }
            UiCommand::NextColor => {
                if self.palette.is_empty() { return; }
                let next = self.palette_idx.map_or(0, |i| (i + 1) % self.palette.len());
                self.palette_idx = Some(next);
                self.appearance.tint = self.palette[next];
            }
            UiCommand::SetColor(color) => {
                self.appearance.tint = color;
                self.palette_idx = self.palette.iter().position(|c| *c == color);
            }
        }
        self.refresh_status();
    }

    // ── gesture input ────────────────────────────────────────────────────

    /// Feed the latest published reading through the smoother.  A reading is
    /// smoothed once, no matter how many frames observe it.
    pub fn ingest(&mut self, latest: Option<(u64, GestureState)>) {
        if self.source.is_failed() { return; }
        if let Some((seq, reading)) = latest {
            if seq != self.last_seq {
                self.last_seq = seq;
                self.gesture = self.smoother.apply(reading);
            }
        }
    }

    /// Track the producer's lifecycle.  A failure drops the field into idle
    /// mode for the rest of the session.
    pub fn set_source_status(&mut self, status: SourceStatus) {
        if status == self.source { return; }
        if let SourceStatus::Failed(msg) = &status {
            warn!(reason = %msg, "gesture input lost, continuing without it");
            self.gesture = GestureState::ABSENT;
            self.smoother = GestureSmoother::new();
        }
        self.source = status;
        self.refresh_status();
    }

    // ── per-frame logic ──────────────────────────────────────────────────

    pub fn tick(&mut self, elapsed: f32, delta: f32) -> FrameParams {
        if !self.gesture.present {
            self.camera_yaw = (self.camera_yaw + delta.max(0.0) * AUTO_ORBIT_RATE).rem_euclid(TAU);
        }
        let input = FrameInput { elapsed, delta, gesture: self.gesture };
        self.field.step(&input, self.appearance.tint)
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            live:        self.field.live(),
            orientation: self.field.orientation(),
            camera_yaw:  self.camera_yaw,
            point_size:  self.field.point_size(),
            color:       self.field.color(),
            appearance:  self.appearance,
            gesture:     self.gesture,
            source:      &self.source,
            palette:     &self.palette,
            status:      &self.status,
        }
    }

    pub fn appearance(&self) -> Appearance     { self.appearance }
    pub fn camera_yaw(&self) -> f32            { self.camera_yaw }
    pub fn gesture(&self)    -> GestureState   { self.gesture }
    pub fn source(&self)     -> &SourceStatus  { &self.source }
    pub fn field(&self)      -> &ParticleField { &self.field }

    fn refresh_status(&mut self) {
        let source = match &self.source {
            SourceStatus::Starting  => "STARTING",
            SourceStatus::Running   => "LIVE",
            SourceStatus::Failed(_) => "OFF",
            SourceStatus::Stopped   => "STOPPED",
        };
        self.status = format!(
            "MODEL {}   COLOR {}   INPUT {}   {} PARTICLES",
            self.appearance.shape.name(),
            self.appearance.tint.to_hex(),
            source,
            self.field.len(),
        );
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Entry point
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    cfg.validate().context("invalid configuration")?;

    // ── Gesture source ───────────────────────────────────────────────────
    let slot = GestureSlot::new();
    let (sim_tx, mut gestures) = start_source(&cfg, slot)?;

    // ── Visualizer (owns the window and the sim input sender) ───────────
    let mut vis = Visualizer::new(cfg.window_width, cfg.window_height, cfg.frame_interval_ms, sim_tx)?;

    // ── App state ────────────────────────────────────────────────────────
    let mut app = AppState::new(&cfg)?;
    info!(
        count = app.field().len(),
        shape = %app.appearance().shape,
        color = %app.appearance().tint.to_hex(),
        "scene ready"
    );

    // ── Main loop ────────────────────────────────────────────────────────
    let start = Instant::now();
    let mut last = start;
    let mut commands = Vec::new();
    let mut last_readout = String::new();

    while vis.is_open() {
        // 1. Window input → UI commands (sim keys go straight to the source)
        if !vis.poll_input(&mut commands) { break; }
        for cmd in commands.drain(..) {
            app.handle_command(cmd);
        }

        // 2. Latest gesture reading
        app.set_source_status(gestures.slot().status());
        app.ingest(gestures.slot().latest());

        let readout = hand_readout(&app.gesture());
        if readout != last_readout {
            tracing::debug!(%readout, "hand status");
            last_readout = readout;
        }

        // 3. Per-frame logic
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;
        app.tick(now.duration_since(start).as_secs_f32(), delta);

        // 4. Render
        if !vis.present(&app.view()) { break; }
    }

    gestures.shutdown();
    info!("window closed");
    Ok(())
}

/// Start the configured gesture source.  Returns the keyboard channel when
/// the simulator is in use.
fn start_source(
    cfg:  &AppConfig,
    slot: GestureSlot,
) -> anyhow::Result<(Option<mpsc::Sender<SimInput>>, GestureHandle)> {
    match cfg.source {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel::<SimInput>();
            let handle = spawn_gesture_source(SimGestureSource::new(rx, cfg.gesture_rate_hz), slot)?;
            Ok((Some(tx), handle))
        }
        SourceKind::Leap => {
            #[cfg(feature = "leap")]
            let handle = spawn_gesture_source(crate::gesture::LeapGestureSource, slot)?;
            #[cfg(not(feature = "leap"))]
            let handle = spawn_gesture_source(
                crate::gesture::UnavailableSource {
                    reason: "built without LeapMotion support (rebuild with --features leap)".into(),
                },
                slot,
            )?;
            Ok((None, handle))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use particle_field::ShapeKind;

    fn make_app() -> AppState {
        let cfg = AppConfig { particle_count: 400, ..AppConfig::default() };
        let appearance = cfg.appearance().unwrap();
        let field = ParticleField::with_seed(cfg.particle_count, appearance, 7);
        AppState::from_parts(field, appearance, cfg.palette_colors().unwrap())
    }

    #[test]
    fn starts_from_config() {
        let app = AppState::new(&AppConfig { particle_count: 300, ..AppConfig::default() }).unwrap();
        assert_eq!(app.field().len(), 300);
        assert_eq!(app.appearance().shape, ShapeKind::Heart);
        assert_eq!(app.appearance().tint.to_hex(), "#ff0055");
        assert_eq!(app.gesture(), GestureState::ABSENT);
    }

    #[test]
    fn bad_color_is_rejected_at_startup() {
        let cfg = AppConfig { initial_color: "nope".into(), ..AppConfig::default() };
        assert!(AppState::new(&cfg).is_err());
    }

    #[test]
    fn select_shape_swaps_targets_not_positions() {
        let mut app = make_app();
        let before: Vec<_> = app.field().live().to_vec();
        app.handle_command(UiCommand::SelectShape(ShapeKind::Saturn));
        assert_eq!(app.appearance().shape, ShapeKind::Saturn);
        assert_eq!(app.field().shape(), ShapeKind::Saturn);
        assert_eq!(app.field().live(), &before[..]);
        assert!(app.status.contains("saturn"));
    }

    #[test]
    fn next_color_cycles_and_wraps() {
        let mut app = make_app();
        let palette = AppConfig::default().palette_colors().unwrap();
        app.handle_command(UiCommand::NextColor);
        assert_eq!(app.appearance().tint, palette[1]);
        for _ in 0..5 {
            app.handle_command(UiCommand::NextColor);
        }
        assert_eq!(app.appearance().tint, palette[0]);
    }

    #[test]
    fn custom_color_then_cycle_restarts_palette() {
        let mut app = make_app();
        let odd = Rgb::from_hex("#123456").unwrap();
        app.handle_command(UiCommand::SetColor(odd));
        assert_eq!(app.appearance().tint, odd);
        app.handle_command(UiCommand::NextColor);
        assert_eq!(app.appearance().tint.to_hex(), "#ff0055");
    }

    #[test]
    fn empty_palette_ignores_cycling() {
        let cfg = AppConfig { particle_count: 10, palette: vec![], ..AppConfig::default() };
        let mut app = AppState::new(&cfg).unwrap();
        app.handle_command(UiCommand::NextColor);
        assert_eq!(app.appearance().tint.to_hex(), "#ff0055");
    }

    #[test]
    fn each_reading_is_smoothed_once() {
        let mut app = make_app();
        let slot = GestureSlot::new();
        app.ingest(slot.latest());
        assert_eq!(app.gesture(), GestureState::ABSENT);

        slot.publish(GestureState::present(1.0));
        app.ingest(slot.latest());
        app.ingest(slot.latest());
        assert!((app.gesture().factor - 0.6).abs() < 1e-6);

        slot.publish(GestureState::present(1.0));
        app.ingest(slot.latest());
        assert!((app.gesture().factor - 0.68).abs() < 1e-6);
    }

    #[test]
    fn lost_hand_returns_to_neutral() {
        let mut app = make_app();
        let slot = GestureSlot::new();
        slot.publish(GestureState::present(1.0));
        app.ingest(slot.latest());
        slot.publish(GestureState { factor: 0.0, present: false });
        app.ingest(slot.latest());
        assert_eq!(app.gesture(), GestureState::ABSENT);
    }

    #[test]
    fn source_failure_forces_idle() {
        let mut app = make_app();
        let slot = GestureSlot::new();
        slot.publish(GestureState::present(1.0));
        app.ingest(slot.latest());
        assert!(app.gesture().present);

        app.set_source_status(SourceStatus::Failed("no camera".into()));
        assert_eq!(app.gesture(), GestureState::ABSENT);
        assert!(app.status.contains("OFF"));

        // Readings still sitting in the slot are ignored from now on.
        slot.publish(GestureState::present(0.9));
        app.ingest(slot.latest());
        assert_eq!(app.gesture(), GestureState::ABSENT);

        // Rendering carries on.
        let params = app.tick(1.0, 0.016);
        assert!(params.scale.is_finite());
    }

    #[test]
    fn tick_follows_gesture() {
        let mut app = make_app();
        let idle = app.tick(0.0, 0.016);
        assert!((idle.scale - 1.0).abs() < 1e-5);
        assert_eq!(idle.explosion, 0.0);

        let slot = GestureSlot::new();
        for _ in 0..40 {
            slot.publish(GestureState::present(1.0));
            app.ingest(slot.latest());
        }
        let open = app.tick(0.0, 0.016);
        assert!(open.scale > 2.4);
        assert!(open.explosion > 0.0);
    }

    #[test]
    fn camera_orbits_only_without_a_hand() {
        let mut app = make_app();
        for _ in 0..60 {
            app.tick(0.0, 1.0 / 60.0);
        }
        let idle = app.camera_yaw();
        assert!((idle - AUTO_ORBIT_RATE).abs() < 1e-4);

        let slot = GestureSlot::new();
        slot.publish(GestureState::present(0.5));
        app.ingest(slot.latest());
        for _ in 0..60 {
            app.tick(1.0, 1.0 / 60.0);
        }
        assert_eq!(app.camera_yaw(), idle);
        assert_eq!(app.view().camera_yaw, idle);

        // Hand gone: orbit picks up where it stopped.
        slot.publish(GestureState { factor: 0.0, present: false });
        app.ingest(slot.latest());
        app.tick(2.0, 0.5);
        assert!(app.camera_yaw() > idle);
    }

    #[test]
    fn view_mirrors_state() {
        let mut app = make_app();
        app.tick(0.5, 0.016);
        let view = app.view();
        assert_eq!(view.live.len(), 400);
        assert_eq!(view.appearance.shape, ShapeKind::Heart);
        assert_eq!(view.palette.len(), 6);
        assert_eq!(view.source, &SourceStatus::Starting);
        assert!(view.point_size > 0.0);
    }
}
