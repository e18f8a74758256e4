//! Application configuration, loaded from TOML with per-field defaults.
//!
//! ```toml
//! particle_count    = 8000
//! initial_shape     = "heart"
//! initial_color     = "#ff0055"
//! palette           = ["#ff0055", "#00ffff", "#ffaa00", "#aa00ff", "#ffffff", "#00ff66"]
//! frame_interval_ms = 16
//! gesture_rate_hz   = 30.0
//! source            = "sim"
//! window_width      = 1280
//! window_height     = 720
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use particle_field::{Appearance, Rgb, ShapeKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cli::Args;

// ════════════════════════════════════════════════════════════════════════════
// SourceKind
// ════════════════════════════════════════════════════════════════════════════

/// Where gesture readings come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Keyboard-driven simulated hands.
    #[default]
    Sim,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "AppConfig::default_particle_count")]
    pub particle_count: usize,
    #[serde(default = "AppConfig::default_initial_shape")]
    pub initial_shape: String,
    #[serde(default = "AppConfig::default_initial_color")]
    pub initial_color: String,
    #[serde(default = "AppConfig::default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "AppConfig::default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "AppConfig::default_gesture_rate_hz")]
    pub gesture_rate_hz: f32,
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default = "AppConfig::default_window_width")]
    pub window_width: usize,
    #[serde(default = "AppConfig::default_window_height")]
    pub window_height: usize,
}

impl AppConfig {
    /// Upper bound on `particle_count`, from any source.
    pub const MAX_PARTICLES: usize = 200_000;

    fn default_particle_count() -> usize { 8000 }
    fn default_initial_shape() -> String { "heart".to_string() }
    fn default_initial_color() -> String { "#ff0055".to_string() }
    fn default_palette() -> Vec<String> {
        ["#ff0055", "#00ffff", "#ffaa00", "#aa00ff", "#ffffff", "#00ff66"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
    fn default_frame_interval_ms() -> u64 { 16 }
    fn default_gesture_rate_hz() -> f32 { 30.0 }
    fn default_window_width() -> usize { 1280 }
    fn default_window_height() -> usize { 720 }

    /// Read `path`, or fall back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Command-line flags win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(shape) = &args.shape {
            self.initial_shape = shape.clone();
        }
        if let Some(color) = &args.color {
            self.initial_color = color.clone();
        }
        if let Some(count) = args.count {
            self.particle_count = count;
        }
        if let Some(source) = args.source {
            self.source = source;
        }
    }

    /// Reject settings the app cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=Self::MAX_PARTICLES).contains(&self.particle_count) {
            bail!("particle_count must be 1..={}, got {}", Self::MAX_PARTICLES, self.particle_count);
        }
        if self.frame_interval_ms == 0 {
            bail!("frame_interval_ms must be at least 1");
        }
        if !(self.gesture_rate_hz.is_finite() && self.gesture_rate_hz > 0.0) {
            bail!("gesture_rate_hz must be positive, got {}", self.gesture_rate_hz);
        }
        if self.window_width < 320 || self.window_height < 240 {
            bail!("window must be at least 320×240, got {}×{}", self.window_width, self.window_height);
        }
        self.tint()?;
        self.palette_colors()?;
        Ok(())
    }

    pub fn shape(&self) -> ShapeKind {
        ShapeKind::from_name(&self.initial_shape)
    }

    pub fn tint(&self) -> anyhow::Result<Rgb> {
        Rgb::from_hex(&self.initial_color)
            .with_context(|| format!("invalid color {:?}", self.initial_color))
    }

    /// Parsed palette.  An empty list is allowed; colour cycling then does
    /// nothing.
    pub fn palette_colors(&self) -> anyhow::Result<Vec<Rgb>> {
        self.palette
            .iter()
            .map(|s| Rgb::from_hex(s).with_context(|| format!("invalid palette color {:?}", s)))
            .collect()
    }

    pub fn appearance(&self) -> anyhow::Result<Appearance> {
        Ok(Appearance { shape: self.shape(), tint: self.tint()? })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            particle_count:    Self::default_particle_count(),
            initial_shape:     Self::default_initial_shape(),
            initial_color:     Self::default_initial_color(),
            palette:           Self::default_palette(),
            frame_interval_ms: Self::default_frame_interval_ms(),
            gesture_rate_hz:   Self::default_gesture_rate_hz(),
            source:            SourceKind::default(),
            window_width:      Self::default_window_width(),
            window_height:     Self::default_window_height(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
