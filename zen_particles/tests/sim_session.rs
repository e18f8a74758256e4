//! Keyboard-simulated hands driving the app without a window.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use particle_field::GestureState;
use zen_particles::app::AppState;
use zen_particles::config::AppConfig;
use zen_particles::gesture::{
    spawn_gesture_source, GestureSlot, SimGestureSource, SimInput, SimKey, SourceStatus,
    UnavailableSource,
};

fn wait_for(slot: &GestureSlot, mut pred: impl FnMut(GestureState) -> bool) -> GestureState {
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Some((_, g)) = slot.latest() {
            if pred(g) { return g; }
        }
        assert!(Instant::now() < deadline, "timed out waiting for gesture reading");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn open_hand_grows_the_cloud() {
    let cfg = AppConfig { particle_count: 300, ..AppConfig::default() };
    let mut app = AppState::new(&cfg).unwrap();

    let (tx, rx) = mpsc::channel();
    let mut handle = spawn_gesture_source(SimGestureSource::new(rx, 120.0), GestureSlot::new()).unwrap();

    tx.send(SimInput::KeyDown(SimKey::ToggleHand)).unwrap();
    for _ in 0..30 {
        tx.send(SimInput::KeyDown(SimKey::Open)).unwrap();
    }
    wait_for(handle.slot(), |g| g.present && g.factor > 0.99);

    // Pump frames until the smoother has caught up with the open hand.
    let mut elapsed = 0.0;
    let deadline = Instant::now() + Duration::from_secs(3);
    while app.gesture().factor < 0.95 {
        assert!(Instant::now() < deadline, "smoother never converged");
        app.set_source_status(handle.slot().status());
        app.ingest(handle.slot().latest());
        app.tick(elapsed, 0.016);
        elapsed += 0.016;
        thread::sleep(Duration::from_millis(2));
    }
    let params = app.tick(elapsed, 0.016);
    assert!(params.scale > 2.3);
    assert!(params.explosion > 0.0);

    // Hand leaves: straight back to idle.
    tx.send(SimInput::KeyDown(SimKey::ToggleHand)).unwrap();
    wait_for(handle.slot(), |g| !g.present);
    app.ingest(handle.slot().latest());
    assert_eq!(app.gesture(), GestureState::ABSENT);

    handle.shutdown();
    assert_eq!(handle.slot().status(), SourceStatus::Stopped);
}

#[test]
fn missing_hardware_leaves_app_idle() {
    let cfg = AppConfig { particle_count: 50, ..AppConfig::default() };
    let mut app = AppState::new(&cfg).unwrap();

    let mut handle = spawn_gesture_source(
        UnavailableSource { reason: "no device".into() },
        GestureSlot::new(),
    ).unwrap();
    handle.shutdown();

    app.set_source_status(handle.slot().status());
    assert!(app.source().is_failed());
    app.ingest(handle.slot().latest());
    assert_eq!(app.gesture(), GestureState::ABSENT);

    let params = app.tick(0.0, 0.016);
    assert!((params.scale - 1.0).abs() < 1e-5);
}
