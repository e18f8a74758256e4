//! Gesture sources: LeapMotion hardware or keyboard simulation.
//!
//! A source runs on its own thread, turns each sensor frame into hand
//! landmarks, and publishes one [`GestureState`] reading per frame into a
//! [`GestureSlot`].  The slot keeps only the latest reading: when the sensor
//! is slower than the renderer, frames simply reuse the last value, and when
//! it is faster, older readings are overwritten rather than queued.
//!
//! Setup failures (no device, no permission) end the source with a terminal
//! [`SourceStatus::Failed`]; the renderer keeps going in idle mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;
use particle_field::GestureState;
use tracing::{debug, error, info};

use crate::landmarks::{reading_for, HandLandmarks, Landmark};

// ════════════════════════════════════════════════════════════════════════════
// SourceStatus
// ════════════════════════════════════════════════════════════════════════════

/// Lifecycle of a gesture source, as shown in the status readout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    Starting,
    Running,
    /// Terminal: gesture input is gone for this session, never retried.
    Failed(String),
    Stopped,
}

impl SourceStatus {
    pub fn is_failed(&self) -> bool { matches!(self, SourceStatus::Failed(_)) }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSlot: single-slot, latest-wins handoff
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct SlotState {
    reading: GestureState,
    /// Bumped on every publish; 0 means nothing published yet.
    seq:     u64,
    status:  SourceStatus,
}

/// Shared cell between one gesture source and the render loop.
#[derive(Clone, Debug)]
pub struct GestureSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl GestureSlot {
    pub fn new() -> Self {
        GestureSlot {
            inner: Arc::new(Mutex::new(SlotState {
                reading: GestureState::ABSENT,
                seq:     0,
                status:  SourceStatus::Starting,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // A panicking writer leaves plain data behind; keep reading it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Overwrite the current reading.
    pub fn publish(&self, reading: GestureState) {
        let mut s = self.lock();
        s.reading = reading;
        s.seq += 1;
    }

    /// The most recent reading and its sequence number, without consuming it.
    /// `None` until the first publish.
    pub fn latest(&self) -> Option<(u64, GestureState)> {
        let s = self.lock();
        (s.seq > 0).then_some((s.seq, s.reading))
    }

    pub fn set_status(&self, status: SourceStatus) {
        self.lock().status = status;
    }

    pub fn status(&self) -> SourceStatus {
        self.lock().status.clone()
    }
}

impl Default for GestureSlot {
    fn default() -> Self { Self::new() }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait: unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// What a running source gets to talk to: the slot and the stop flag.
#[derive(Clone)]
pub struct GestureSink {
    slot: GestureSlot,
    stop: Arc<AtomicBool>,
}

impl GestureSink {
    /// Derive and publish the reading for one sensor frame.
    pub fn publish_hands(&self, hands: &[HandLandmarks]) {
        self.slot.publish(reading_for(hands));
    }

    /// Call once the device is open and frames are flowing.
    pub fn running(&self) {
        self.slot.set_status(SourceStatus::Running);
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Anything that can produce hand landmarks frame by frame.
///
/// `run` owns its device for its whole lifetime and must release it before
/// returning, on both the success and the error path.  It should return
/// promptly once [`GestureSink::should_stop`] turns true.
pub trait GestureSource: Send + 'static {
    fn name(&self) -> &'static str;
    fn run(self: Box<Self>, sink: GestureSink) -> anyhow::Result<()>;
}

// ════════════════════════════════════════════════════════════════════════════
// Spawn helper + handle
// ════════════════════════════════════════════════════════════════════════════

/// Owns a running source thread; stops and joins it on drop.
pub struct GestureHandle {
    slot: GestureSlot,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl GestureHandle {
    pub fn slot(&self) -> &GestureSlot { &self.slot }

    /// Signal the source to stop and wait for it to release its device.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("gesture source thread panicked");
                self.slot.set_status(SourceStatus::Failed("gesture thread panicked".into()));
            }
        }
    }
}

impl Drop for GestureHandle {
    fn drop(&mut self) { self.shutdown(); }
}

/// Spawn `source` on its own thread, publishing into `slot`.
pub fn spawn_gesture_source<G: GestureSource>(source: G, slot: GestureSlot) -> anyhow::Result<GestureHandle> {
    let stop = Arc::new(AtomicBool::new(false));
    let sink = GestureSink { slot: slot.clone(), stop: stop.clone() };
    let name = source.name();
    slot.set_status(SourceStatus::Starting);

    let join = thread::Builder::new()
        .name(format!("gesture-{}", name))
        .spawn(move || {
            let status_slot = sink.slot.clone();
            match Box::new(source).run(sink) {
                Ok(()) => {
                    debug!(source = name, "gesture source stopped");
                    status_slot.set_status(SourceStatus::Stopped);
                }
                Err(e) => {
                    error!(source = name, "gesture input unavailable: {:#}", e);
                    status_slot.set_status(SourceStatus::Failed(format!("{:#}", e)));
                }
            }
        })
        .context("spawning gesture thread")?;

    info!(source = name, "gesture source started");
    Ok(GestureHandle { slot, stop, join: Some(join) })
}

// ════════════════════════════════════════════════════════════════════════════
// LeapGestureSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// LeapMotion millimetres per normalised landmark unit.  Puts a relaxed
/// pinch near 0.1 and a wide-open hand (≈ 55 mm tip gap) at 1.0.
pub const LEAP_MM_PER_UNIT: f32 = 250.0;

/// Gesture source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each tracking frame is mapped to normalised landmarks (palm centre
/// stands in for the wrist) and run through the same factor rules as any
/// other source.
#[cfg(feature = "leap")]
pub struct LeapGestureSource;

#[cfg(feature = "leap")]
impl GestureSource for LeapGestureSource {
    fn name(&self) -> &'static str { "leap" }

    fn run(self: Box<Self>, sink: GestureSink) -> anyhow::Result<()> {
        use leaprs::*;

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| anyhow::anyhow!("failed to create LeapC connection: {:?}", e))?;
        connection.open()
            .map_err(|e| anyhow::anyhow!("failed to open LeapMotion device: {:?}", e))?;
        sink.running();

        let norm = |x: f32, y: f32, z: f32| {
            Landmark::new(x / LEAP_MM_PER_UNIT, y / LEAP_MM_PER_UNIT, z / LEAP_MM_PER_UNIT)
        };

        while !sink.should_stop() {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<HandLandmarks> = frame.hands()
                    .filter_map(|h| {
                        let digits: Vec<_> = h.digits().collect();
                        if digits.len() < 2 { return None; }
                        let palm  = h.palm().position();
                        let thumb = digits[0].distal().next_joint();
                        let index = digits[1].distal().next_joint();
                        Some(HandLandmarks::sparse(
                            norm(palm.x,  palm.y,  palm.z),
                            norm(thumb.x, thumb.y, thumb.z),
                            norm(index.x, index.y, index.z),
                        ))
                    })
                    .collect();
                sink.publish_hands(&hands);
            }
        }
        // `connection` drops here and closes the device.
        Ok(())
    }
}

/// Stand-in when the requested source was not compiled in.  Fails at once,
/// leaving the app in idle mode with an explanation on screen.
pub struct UnavailableSource {
    pub reason: String,
}

impl GestureSource for UnavailableSource {
    fn name(&self) -> &'static str { "unavailable" }

    fn run(self: Box<Self>, _sink: GestureSink) -> anyhow::Result<()> {
        anyhow::bail!("{}", self.reason)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource: keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    ToggleHand,     // H
    ToggleTwoHands, // B
    Open,           // Up
    Close,          // Down
}

/// The simulated hands: how many, how far the pinch is open, how far the
/// wrists are apart.
#[derive(Clone, Debug, PartialEq)]
pub struct SimHands {
    pub count:     usize,
    pub pinch:     f32,
    pub wrist_gap: f32,
}

impl SimHands {
    pub const PINCH_STEP: f32 = 0.01;
    pub const PINCH_MAX:  f32 = 0.3;
    pub const GAP_STEP:   f32 = 0.03;
    pub const GAP_MAX:    f32 = 1.2;

    pub fn apply(&mut self, key: SimKey) {
        match key {
            SimKey::ToggleHand => {
                self.count = if self.count == 0 { 1 } else { 0 };
            }
            SimKey::ToggleTwoHands => {
                self.count = if self.count == 2 { 1 } else { 2 };
            }
            SimKey::Open  => self.nudge(1.0),
            SimKey::Close => self.nudge(-1.0),
        }
    }

    fn nudge(&mut self, dir: f32) {
        if self.count == 2 {
            self.wrist_gap = (self.wrist_gap + dir * Self::GAP_STEP).clamp(0.0, Self::GAP_MAX);
        } else {
            self.pinch = (self.pinch + dir * Self::PINCH_STEP).clamp(0.0, Self::PINCH_MAX);
        }
    }

    /// Landmarks a camera would see for the current pose.
    pub fn landmarks(&self) -> Vec<HandLandmarks> {
        let hand = |wrist_x: f32| {
            let wrist = Landmark::new(wrist_x, 0.75, 0.0);
            let thumb = Landmark::new(wrist_x - 0.05, 0.55, -0.02);
            let index = Landmark::new(thumb.x + self.pinch, thumb.y, thumb.z);
            HandLandmarks::sparse(wrist, thumb, index)
        };
        match self.count {
            0 => Vec::new(),
            1 => vec![hand(0.5)],
            _ => vec![
                hand(0.5 - self.wrist_gap / 2.0),
                hand(0.5 + self.wrist_gap / 2.0),
            ],
        }
    }
}

impl Default for SimHands {
    fn default() -> Self {
        SimHands { count: 0, pinch: 0.12, wrist_gap: 0.5 }
    }
}

/// Gesture source driven by [`SimInput`] events from the visualizer window,
/// publishing at a fixed camera-like frame rate.
pub struct SimGestureSource {
    pub rx:      Receiver<SimInput>,
    pub rate_hz: f32,
    pub hands:   SimHands,
}

impl SimGestureSource {
    pub fn new(rx: Receiver<SimInput>, rate_hz: f32) -> Self {
        SimGestureSource { rx, rate_hz, hands: SimHands::default() }
    }
}

impl GestureSource for SimGestureSource {
    fn name(&self) -> &'static str { "sim" }

    fn run(mut self: Box<Self>, sink: GestureSink) -> anyhow::Result<()> {
        anyhow::ensure!(self.rate_hz > 0.0, "gesture rate must be positive, got {}", self.rate_hz);
        let period = Duration::from_secs_f32(1.0 / self.rate_hz);
        sink.running();

        let mut next_frame = Instant::now();
        while !sink.should_stop() {
            let wait = next_frame.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(wait) {
                Ok(SimInput::KeyDown(key)) => {
                    self.hands.apply(key);
                    debug!(?key, hands = ?self.hands, "sim input");
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            sink.publish_hands(&self.hands.landmarks());
            next_frame += period;
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
