//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┬──────────┐
//! │ ZEN PARTICLES        [ CONTROL ACTIVE 63% ]              │  MODEL   │
//! │                                                          │ 1 HEART  │
//! │                 · ·  ·:::::·  ·                          │ 2 FLOWER │
//! │               ·  ::::::::::::::  ·                       │ ...      │
//! │                  ·::::::::::::·                          │  COLOR   │
//! │                     ·::::::·                             │ ■ ■ ■ ■  │
//! │ error message (if any)                                   │          │
//! │ key legend                                               │          │
//! └──────────────────────────────────────────────────────────┴──────────┘
//! ```

use std::io::{self, BufRead, Write};
use std::sync::mpsc::Sender;

use glam::{Quat, Vec3};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use particle_field::{Appearance, GestureState, Point3, Rgb, ShapeKind};
use rand::Rng;

use crate::gesture::{SimInput, SimKey, SourceStatus};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const PANEL_W:      usize = 180;
const BG_COLOR:     u32   = 0xFF050505;
const PANEL_BG:     u32   = 0xFF101018;
const TEXT_COLOR:   u32   = 0xFFEEEEEE;
const DIM_TEXT:     u32   = 0xFF888888;
const ACTIVE_TEXT:  u32   = 0xFF7CFFB0;
const ERROR_BG:     u32   = 0xFF5A0E0E;
const STAR_COUNT:   usize = 600;
/// Camera sits on +Z looking at the origin.
const CAMERA_Z:     f32   = 12.0;
const FOV_DEG:      f32   = 60.0;
const NEAR:         f32   = 0.1;
/// Largest splat radius in pixels, like a GL point-size limit.
pub const MAX_SPLAT_R: f32  = 6.0;
/// Material opacity for additive splats.
const OPACITY:      f32   = 0.8;
const GLYPH_SCALE:  usize = 2;
const MENU_TOP:     usize = 40;
const MENU_ROW:     usize = 5 * GLYPH_SCALE + 12;
const SWATCH:       usize = 22;
const SWATCH_GAP:   usize = 4;
const SWATCHES_ROW: usize = 6;

// ════════════════════════════════════════════════════════════════════════════
// Frame snapshot + Presenter trait
// ════════════════════════════════════════════════════════════════════════════

/// Everything the shell needs to draw one frame, borrowed from the app.
pub struct FrameView<'a> {
    pub live:        &'a [Point3],
    pub orientation: Quat,
    /// Auto-orbit angle of the camera around the Y axis.
    pub camera_yaw:  f32,
    pub point_size:  f32,
    pub color:       Rgb,
    pub appearance:  Appearance,
    pub gesture:     GestureState,
    pub source:      &'a SourceStatus,
    pub palette:     &'a [Rgb],
    pub status:      &'a str,
}

/// Something that can show a frame.  The animation core never talks to the
/// window directly.  Returns false once the surface is gone.
pub trait Presenter {
    fn present(&mut self, view: &FrameView<'_>) -> bool;
}

/// User actions on the controls.  They touch the appearance only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiCommand {
    SelectShape(ShapeKind),
    NextColor,
    SetColor(Rgb),
}

// ════════════════════════════════════════════════════════════════════════════
// Projection
// ════════════════════════════════════════════════════════════════════════════

/// Perspective projection of a world point into a `w × h` viewport.
/// Returns `(x, y, depth)`, or `None` behind the near plane.
pub fn project(p: Vec3, w: usize, h: usize) -> Option<(f32, f32, f32)> {
    let depth = CAMERA_Z - p.z;
    if depth <= NEAR {
        return None;
    }
    let focal = (h as f32 / 2.0) / (FOV_DEG.to_radians() / 2.0).tan();
    let ppu = focal / depth;
    Some((w as f32 / 2.0 + p.x * ppu, h as f32 / 2.0 - p.y * ppu, depth))
}

/// Splat radius in pixels for a point `point_size` wide at `depth`.
/// Attenuates as `size · (h/2) / depth`, capped at [`MAX_SPLAT_R`].
pub fn splat_radius(point_size: f32, depth: f32, h: usize) -> f32 {
    (point_size * (h as f32 / 2.0) / depth * 0.5).min(MAX_SPLAT_R)
}

/// Screen position and radius of one live particle, after the field's own
/// rotation and the camera orbit.
pub fn particle_splat(view_rot: Quat, p: Point3, point_size: f32, w: usize, h: usize) -> Option<(f32, f32, f32)> {
    let (x, y, depth) = project(view_rot * p, w, h)?;
    Some((x, y, splat_radius(point_size, depth, h)))
}

/// Rotation from particle space to camera space.  Orbiting the camera by
/// `camera_yaw` turns the world the other way.
pub fn view_rotation(orientation: Quat, camera_yaw: f32) -> Quat {
    Quat::from_rotation_y(-camera_yaw) * orientation
}

/// Top-left corner of palette swatch `i` in a `canvas_w`-wide window.
pub fn swatch_origin(canvas_w: usize, i: usize) -> (usize, usize) {
    let x0 = canvas_w.saturating_sub(PANEL_W);
    let top = MENU_TOP + ShapeKind::SELECTABLE.len() * MENU_ROW + 12 + 5 * GLYPH_SCALE + 10;
    (
        x0 + 12 + (i % SWATCHES_ROW) * (SWATCH + SWATCH_GAP),
        top + (i / SWATCHES_ROW) * (SWATCH + SWATCH_GAP),
    )
}

/// Which of `count` swatches, if any, lies under the point `(mx, my)`.
pub fn swatch_at(canvas_w: usize, count: usize, mx: f32, my: f32) -> Option<usize> {
    if mx < 0.0 || my < 0.0 { return None; }
    let (mx, my) = (mx as usize, my as usize);
    (0..count).find(|&i| {
        let (sx, sy) = swatch_origin(canvas_w, i);
        mx >= sx && mx < sx + SWATCH && my >= sy && my < sy + SWATCH
    })
}

/// Read one line of hex colour from `input`.  Blank or malformed answers
/// give `None`.
pub fn read_hex_color<R: BufRead>(mut input: R) -> Option<Rgb> {
    let mut buf = String::new();
    input.read_line(&mut buf).ok()?;
    Rgb::from_hex(buf.trim())
}

fn prompt_color() -> Option<Rgb> {
    print!("  Tint colour (#rrggbb): ");
    io::stdout().flush().ok();
    let color = read_hex_color(io::stdin().lock());
    if color.is_none() {
        println!("  (unchanged)");
    }
    color
}

/// Status readout text: the hand factor as a percentage, or a waiting note.
pub fn hand_readout(g: &GestureState) -> String {
    if g.present {
        format!("CONTROL ACTIVE {:.0}%", g.factor * 100.0)
    } else {
        "WAITING FOR HAND...".to_string()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas: the raw framebuffer and its drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf: Vec<u32>,
    pub w:   usize,
    pub h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; w * h], w, h }
    }

    pub fn clear(&mut self, color: u32) { self.buf.fill(color); }

    pub fn pixel(&self, x: usize, y: usize) -> u32 { self.buf[y * self.w + x] }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    /// Saturating per-channel add of `color · k`.
    pub fn add_pixel(&mut self, x: usize, y: usize, color: Rgb, k: f32) {
        if x >= self.w || y >= self.h { return; }
        let dst = &mut self.buf[y * self.w + x];
        let add = |shift: u32, v: f32| -> u32 {
            let cur = (*dst >> shift) & 0xFF;
            let inc = (v.clamp(0.0, 1.0) * k * 255.0) as u32;
            (cur + inc).min(255) << shift
        };
        *dst = 0xFF000000 | add(16, color.r) | add(8, color.g) | add(0, color.b);
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    /// Additive round splat of `radius` pixels centred at `(cx, cy)`.
    pub fn splat(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb) {
        let r = radius.max(0.5);
        let x0 = (cx - r).floor().max(0.0) as usize;
        let y0 = (cy - r).floor().max(0.0) as usize;
        let x1 = ((cx + r).ceil().max(0.0) as usize).min(self.w);
        let y1 = ((cy + r).ceil().max(0.0) as usize).min(self.h);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d2 = (dx * dx + dy * dy) / (r * r);
                if d2 <= 1.0 {
                    self.add_pixel(x, y, color, OPACITY * (1.0 - d2 * 0.5));
                }
            }
        }
    }

    /// 3×5 bitmap text, scaled by `scale`.
    pub fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > self.w { break; }
        }
    }

    pub fn text_width(text: &str, scale: usize) -> usize {
        text.chars().count() * 4 * scale
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    stars:  Vec<(usize, usize, f32)>,
    /// Only set when the keyboard simulator is the gesture source.
    sim_tx: Option<Sender<SimInput>>,
    /// Palette as last drawn, for swatch clicks.
    palette: Vec<Rgb>,
    frame:  u64,
}

impl Visualizer {
    pub fn new(
        width:  usize,
        height: usize,
        frame_interval_ms: u64,
        sim_tx: Option<Sender<SimInput>>,
    ) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Zen Particles",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow::anyhow!("opening window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(frame_interval_ms)));

        let mut rng = rand::thread_rng();
        let stars = (0..STAR_COUNT)
            .map(|_| (
                rng.gen_range(0..width.saturating_sub(PANEL_W).max(1)),
                rng.gen_range(0..height.max(1)),
                rng.gen_range(0.15..0.6),
            ))
            .collect();

        Ok(Visualizer {
            window,
            canvas: Canvas::new(width, height),
            stars,
            sim_tx,
            palette: Vec::new(),
            frame: 0,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard input.  UI commands are pushed to `out`; simulated hand
    /// keys go straight to the sim gesture source.  Returns false on quit.
    pub fn poll_input(&mut self, out: &mut Vec<UiCommand>) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            return false;
        }

        let shape_keys = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5];
        for (key, shape) in shape_keys.iter().zip(ShapeKind::SELECTABLE) {
            if one_shot(*key) {
                out.push(UiCommand::SelectShape(shape));
            }
        }
        if one_shot(Key::C) {
            out.push(UiCommand::NextColor);
        }
        if one_shot(Key::X) {
            // Blocks the frame loop until the line is entered.
            if let Some(color) = prompt_color() {
                out.push(UiCommand::SetColor(color));
            }
        }
        if self.window.get_mouse_down(MouseButton::Left) {
            if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
                if let Some(i) = swatch_at(self.canvas.w, self.palette.len(), mx, my) {
                    out.push(UiCommand::SetColor(self.palette[i]));
                }
            }
        }

        let mut sim = Vec::new();
        if one_shot(Key::H)  { sim.push(SimKey::ToggleHand); }
        if one_shot(Key::B)  { sim.push(SimKey::ToggleTwoHands); }
        if held(Key::Up)     { sim.push(SimKey::Open); }
        if held(Key::Down)   { sim.push(SimKey::Close); }

        if let Some(tx) = &self.sim_tx {
            for key in sim {
                let _ = tx.send(SimInput::KeyDown(key));
            }
        }

        true
    }

    // ── Scene ────────────────────────────────────────────────────────────

    fn draw_stars(&mut self) {
        let t = self.frame as f32 * 0.02;
        for (i, &(x, y, b)) in self.stars.iter().enumerate() {
            let twinkle = b * (0.75 + 0.25 * (t + i as f32).sin());
            let v = (twinkle * 255.0) as u32;
            self.canvas.set_pixel(x, y, 0xFF000000 | (v << 16) | (v << 8) | v);
        }
    }

    fn draw_particles(&mut self, view: &FrameView<'_>) {
        let vw = self.canvas.w.saturating_sub(PANEL_W);
        let vh = self.canvas.h;
        let rot = view_rotation(view.orientation, view.camera_yaw);
        for p in view.live {
            if let Some((x, y, r)) = particle_splat(rot, *p, view.point_size, vw, vh) {
                self.canvas.splat(x, y, r, view.color);
            }
        }
    }

    // ── HUD ──────────────────────────────────────────────────────────────

    fn draw_hud(&mut self, view: &FrameView<'_>) {
        let w = self.canvas.w;
        let h = self.canvas.h;
        let s = GLYPH_SCALE;

        self.canvas.draw_text("ZEN PARTICLES", 16, 16, 3, TEXT_COLOR);
        self.canvas.draw_text("PINCH OR SPREAD YOUR HANDS", 16, 40, 1, DIM_TEXT);

        // hand status pill
        let readout = hand_readout(&view.gesture);
        let tw = Canvas::text_width(&readout, s);
        let px = (w.saturating_sub(PANEL_W) / 2).saturating_sub(tw / 2 + 10);
        let color = if view.gesture.present { ACTIVE_TEXT } else { DIM_TEXT };
        self.canvas.draw_border(px, 14, tw + 20, 5 * s + 12, color);
        self.canvas.draw_text(&readout, px + 10, 20, s, color);

        // side panel
        let x0 = w.saturating_sub(PANEL_W);
        self.canvas.fill_rect(x0, 0, PANEL_W, h, PANEL_BG);
        self.canvas.draw_text("MODEL", x0 + 12, 16, s, DIM_TEXT);
        let mut y = MENU_TOP;
        for (i, shape) in ShapeKind::SELECTABLE.iter().enumerate() {
            let active = *shape == view.appearance.shape;
            let label = format!("{} {}", i + 1, shape.name());
            let color = if active { ACTIVE_TEXT } else { TEXT_COLOR };
            if active {
                self.canvas.draw_border(x0 + 6, y - 4, PANEL_W - 12, 5 * s + 8, color);
            }
            self.canvas.draw_text(&label, x0 + 12, y, s, color);
            y += MENU_ROW;
        }

        y += 12;
        self.canvas.draw_text("COLOR", x0 + 12, y, s, DIM_TEXT);
        let sw = SWATCH;
        for (i, c) in view.palette.iter().enumerate() {
            let (sx, sy) = swatch_origin(w, i);
            self.canvas.fill_rect(sx, sy, sw, sw, c.to_argb());
            if *c == view.appearance.tint {
                self.canvas.draw_border(sx.saturating_sub(2), sy.saturating_sub(2), sw + 4, sw + 4, 0xFFFFFFFF);
            }
        }

        // inline error for a dead gesture source
        if let SourceStatus::Failed(msg) = view.source {
            let text = format!("GESTURE INPUT OFF: {}", msg);
            let ey = h.saturating_sub(70);
            self.canvas.fill_rect(10, ey, Canvas::text_width(&text, 1) + 16, 18, ERROR_BG);
            self.canvas.draw_text(&text, 18, ey + 6, 1, TEXT_COLOR);
        }

        self.canvas.draw_text(view.status, 16, h.saturating_sub(40), 1, DIM_TEXT);
        self.canvas.draw_text(
            "1-5=model  C=color  X=hex color  H=hand  B=two hands  UP/DOWN=open/close  Q=quit",
            16, h.saturating_sub(20), 1, DIM_TEXT,
        );
    }
}

impl Presenter for Visualizer {
    fn present(&mut self, view: &FrameView<'_>) -> bool {
        self.frame += 1;
        if self.palette.as_slice() != view.palette {
            self.palette = view.palette.to_vec();
        }
        self.canvas.clear(BG_COLOR);
        self.draw_stars();
        self.draw_particles(view);
        self.draw_hud(view);
        self.window
            .update_with_buffer(&self.canvas.buf, self.canvas.w, self.canvas.h)
            .is_ok()
            && self.window.is_open()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '×' => [0b000, 0b101, 0b010, 0b101, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    use particle_field::{FrameInput, ParticleField};

    #[test]
    fn origin_projects_to_centre() {
        let (x, y, depth) = project(Vec3::ZERO, 800, 600).unwrap();
        assert_eq!((x, y), (400.0, 300.0));
        assert_eq!(depth, CAMERA_Z);
    }

    #[test]
    fn projection_orientation_and_perspective() {
        let (x, y, near) = project(Vec3::new(1.0, 1.0, 2.0), 800, 600).unwrap();
        assert!(x > 400.0 && y < 300.0, "+x right, +y up");
        let (far_x, _, far) = project(Vec3::new(1.0, 1.0, -2.0), 800, 600).unwrap();
        assert!(near < far);
        assert!(far_x < x);
        assert!(project(Vec3::new(0.0, 0.0, CAMERA_Z), 800, 600).is_none());
    }

    #[test]
    fn splat_size_attenuates_with_half_height() {
        // 0.08 wide at the origin in a 720-tall view: 0.08 · 360 / 12 = 2.4 px across.
        let r = splat_radius(0.08, CAMERA_Z, 720);
        assert!((r - 1.2).abs() < 1e-5);
        assert!(splat_radius(0.08, 24.0, 720) < r);
        assert_eq!(splat_radius(0.2, NEAR + 0.01, 720), MAX_SPLAT_R);
    }

    #[test]
    fn open_firework_splats_stay_bounded() {
        let tint = Rgb::WHITE;
        let mut field = ParticleField::with_seed(
            8000, Appearance { shape: ShapeKind::Firework, tint }, 11);
        let gesture = GestureState::present(1.0);
        for frame in 0..600 {
            let input = FrameInput { elapsed: frame as f32 / 60.0, delta: 1.0 / 60.0, gesture };
            field.step(&input, tint);
        }
        assert!((field.point_size() - 0.2).abs() < 1e-4);

        let (w, h) = (1100, 720);
        let rot = view_rotation(field.orientation(), 0.0);
        let mut area = 0.0f32;
        for p in field.live() {
            if let Some((_, _, r)) = particle_splat(rot, *p, field.point_size(), w, h) {
                assert!(r <= MAX_SPLAT_R);
                area += std::f32::consts::PI * r * r;
            }
        }
        assert!(area < (w * h) as f32, "splat area {} exceeds the viewport", area);
    }

    #[test]
    fn camera_orbit_turns_the_world_the_other_way() {
        let p = Vec3::new(1.0, 0.0, 0.0);
        let still = view_rotation(Quat::IDENTITY, 0.0) * p;
        assert!((still - p).length() < 1e-6);
        let quarter = view_rotation(Quat::IDENTITY, std::f32::consts::FRAC_PI_2) * p;
        // Camera swung toward +X, so the point now sits in front of it.
        assert!((quarter - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn swatch_hit_testing() {
        let (sx, sy) = swatch_origin(1280, 0);
        assert_eq!(sx, 1280 - PANEL_W + 12);
        assert_eq!(swatch_at(1280, 6, sx as f32 + 1.0, sy as f32 + 1.0), Some(0));
        let (sx3, sy3) = swatch_origin(1280, 3);
        assert_eq!(swatch_at(1280, 6, (sx3 + SWATCH - 1) as f32, sy3 as f32), Some(3));
        // Gap between swatches, outside the panel, or beyond the palette.
        assert_eq!(swatch_at(1280, 6, (sx + SWATCH + 1) as f32, sy as f32 + 1.0), None);
        assert_eq!(swatch_at(1280, 6, 10.0, 10.0), None);
        assert_eq!(swatch_at(1280, 2, sx3 as f32 + 1.0, sy3 as f32 + 1.0), None);
        assert_eq!(swatch_at(1280, 6, -1.0, sy as f32), None);
    }

    #[test]
    fn hex_answer_parsing() {
        let c = read_hex_color(std::io::Cursor::new("#00ff66\n")).unwrap();
        assert_eq!(c.to_hex(), "#00ff66");
        assert_eq!(read_hex_color(std::io::Cursor::new("  fa0 \n")).unwrap().to_hex(), "#ffaa00");
        assert!(read_hex_color(std::io::Cursor::new("\n")).is_none());
        assert!(read_hex_color(std::io::Cursor::new("purple\n")).is_none());
    }

    #[test]
    fn sphere_fits_the_view() {
        let (_, y, _) = project(Vec3::new(0.0, 4.0, 0.0), 800, 600).unwrap();
        assert!(y > 0.0);
    }

    #[test]
    fn readout_text() {
        assert_eq!(hand_readout(&GestureState::present(0.634)), "CONTROL ACTIVE 63%");
        assert_eq!(hand_readout(&GestureState::ABSENT), "WAITING FOR HAND...");
    }

    #[test]
    fn additive_splat_saturates() {
        let mut c = Canvas::new(16, 16);
        c.clear(0xFF000000);
        for _ in 0..10 {
            c.splat(8.0, 8.0, 3.0, Rgb::new(1.0, 0.0, 0.2));
        }
        let px = c.pixel(8, 8);
        assert_eq!((px >> 16) & 0xFF, 255);
        assert_eq!((px >> 8) & 0xFF, 0);
        assert!(px & 0xFF > 0);
        // Outside the radius stays black.
        assert_eq!(c.pixel(0, 0), 0xFF000000);
    }

    #[test]
    fn splat_clips_at_edges() {
        let mut c = Canvas::new(8, 8);
        c.splat(-2.0, -2.0, 4.0, Rgb::WHITE);
        c.splat(9.0, 9.0, 4.0, Rgb::WHITE);
        c.splat(4.0, 4.0, 0.1, Rgb::WHITE);
        assert_ne!(c.pixel(0, 0), BG_COLOR);
    }

    #[test]
    fn text_draws_inside_bounds() {
        let mut c = Canvas::new(40, 12);
        c.clear(0xFF000000);
        c.draw_text("63%", 0, 0, 2, 0xFFFFFFFF);
        assert!(c.buf.iter().any(|&p| p == 0xFFFFFFFF));
        // Long text stops at the edge rather than panicking.
        c.draw_text("WAITING FOR HAND...", 0, 0, 2, 0xFFFFFFFF);
    }

    #[test]
    fn glyphs_cover_readout_characters() {
        let fallback = char_glyph('\u{1}');
        for ch in "CONTROL ACTIVE 100% WAITING FOR HAND... heart flower saturn buddha firework".chars() {
            if ch == ' ' { continue; }
            assert_ne!(char_glyph(ch), fallback, "missing glyph {:?}", ch);
        }
    }
}
