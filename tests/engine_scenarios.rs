//! Engine scenario tests
//!
//! End-to-end decision sequences over the public API: boundary holds,
//! passthrough rules, return grace, and trace replay through the daemon.

use std::time::{Duration, Instant};

use sticky_edges::backend::{Backend, BackendEvent, ReplayBackend};
use sticky_edges::config::Config;
use sticky_edges::daemon::Daemon;
use sticky_edges::engine::{Decision, EdgeEngine, EngineConfig};
use sticky_edges::monitor::MonitorRect;

fn defaults() -> EngineConfig {
    Config::default_config().engine_config()
}

fn single_monitor() -> Vec<MonitorRect> {
    vec![MonitorRect::new(0, 0, 1920, 1080)]
}

fn dual_monitors() -> Vec<MonitorRect> {
    vec![
        MonitorRect::new(0, 0, 1920, 1080),
        MonitorRect::new(1920, 0, 1920, 1080),
    ]
}

fn expect_passed_into(engine: &EdgeEngine, decision: Decision, rect: MonitorRect) {
    match decision {
        Decision::Passed(id) => {
            assert_eq!(engine.monitors().get(id), Some(&rect));
        }
        other => panic!("expected pass into {rect:?}, got {other:?}"),
    }
}

// ============================================================================
// Boundary holds and passthrough
// ============================================================================

#[test]
fn test_single_monitor_boundary_hold() {
    let t0 = Instant::now();
    let mut engine = EdgeEngine::new(defaults());
    engine.on_monitor_set_changed(t0, single_monitor(), (960, 540));

    let d = engine.on_pointer_moved(t0 + Duration::from_millis(10), 1919, 540, 5.0, 0.0);
    assert_eq!(d, Decision::Held { x: 1918, y: 540 });
}

#[test]
fn test_always_pass_edges_cross_immediately() {
    let t0 = Instant::now();
    let mut config = defaults();
    config.edge.always_pass = true;

    let mut engine = EdgeEngine::new(config);
    engine.on_monitor_set_changed(t0, dual_monitors(), (960, 540));

    let d = engine.on_pointer_moved(t0 + Duration::from_millis(10), 1919, 540, 5.0, 0.0);
    expect_passed_into(&engine, d, MonitorRect::new(1920, 0, 1920, 1080));
}

#[test]
fn test_steady_contact_passes_after_base_delay() {
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);
    let mut engine = EdgeEngine::new(defaults());
    engine.on_monitor_set_changed(t0, dual_monitors(), (960, 540));

    // First contact arms the dwell timer; the pointer then sits still
    // against the boundary, so the adjusted delay stays at the 0.4s base.
    assert_eq!(
        engine.on_pointer_moved(at(10), 1919, 540, 5.0, 0.0),
        Decision::Held { x: 1918, y: 540 }
    );
    assert_eq!(
        engine.on_pointer_moved(at(200), 1919, 540, 0.0, 0.0),
        Decision::Held { x: 1918, y: 540 }
    );

    // 410ms of contact exceeds the 400ms delay.
    let d = engine.on_pointer_moved(at(420), 1919, 540, 0.0, 0.0);
    expect_passed_into(&engine, d, MonitorRect::new(1920, 0, 1920, 1080));
}

// ============================================================================
// Return grace
// ============================================================================

#[test]
fn test_return_grace_window_and_expiry() {
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);

    // A long base delay so only the grace window can produce fast passes.
    let mut config = defaults();
    config.edge.base_delay = Duration::from_secs(10);
    config.edge.max_delay = Duration::from_secs(10);
    config.edge.return_grace = Duration::from_secs(1);

    let mut engine = EdgeEngine::new(config);
    engine.on_monitor_set_changed(t0, dual_monitors(), (960, 540));

    // Push through the shared edge the slow way.
    assert!(matches!(
        engine.on_pointer_moved(at(10), 1919, 540, 5.0, 0.0),
        Decision::Held { .. }
    ));
    let d = engine.on_pointer_moved(at(11_000), 1919, 540, 0.0, 0.0);
    expect_passed_into(&engine, d, MonitorRect::new(1920, 0, 1920, 1080));

    // Settle inside the right-hand monitor.
    assert_eq!(
        engine.on_pointer_moved(at(11_200), 1930, 540, 10.0, 0.0),
        Decision::Free
    );

    // 900ms after breaking away: returning toward the left-hand monitor
    // passes unconditionally.
    let d = engine.on_pointer_moved(at(11_900), 1920, 540, -5.0, 0.0);
    expect_passed_into(&engine, d, MonitorRect::new(0, 0, 1920, 1080));

    assert_eq!(
        engine.on_pointer_moved(at(12_100), 1900, 540, -10.0, 0.0),
        Decision::Free
    );

    // Exactly at the grace deadline (the right-hand monitor was broken
    // away from at 11.9s, grace is 1s): the window is exclusive, so the
    // crossing is subject to the normal delay again.
    assert!(matches!(
        engine.on_pointer_moved(at(12_900), 1919, 540, 5.0, 0.0),
        Decision::Held { .. }
    ));
}

// ============================================================================
// Speed sensitivity
// ============================================================================

#[test]
fn test_deceleration_resists_harder_than_steady_push() {
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);

    // Steady push: approach and press at a constant 5 px/event. The
    // constant-speed term collapses the delay, so the second contact
    // event already passes.
    let mut engine = EdgeEngine::new(defaults());
    engine.on_monitor_set_changed(t0, dual_monitors(), (960, 540));

    assert_eq!(
        engine.on_pointer_moved(at(200), 1900, 540, 5.0, 0.0),
        Decision::Free
    );
    assert_eq!(
        engine.on_pointer_moved(at(250), 1910, 540, 5.0, 0.0),
        Decision::Free
    );
    assert!(matches!(
        engine.on_pointer_moved(at(300), 1919, 540, 5.0, 0.0),
        Decision::Held { .. }
    ));
    let d = engine.on_pointer_moved(at(350), 1919, 540, 5.0, 0.0);
    expect_passed_into(&engine, d, MonitorRect::new(1920, 0, 1920, 1080));

    // Decelerating arrival: fast approach, slow press. The slowdown
    // exponent pushes the delay to its 0.6s cap, so the same cadence is
    // still held.
    let mut engine = EdgeEngine::new(defaults());
    engine.on_monitor_set_changed(t0, dual_monitors(), (960, 540));

    assert_eq!(
        engine.on_pointer_moved(at(200), 1800, 540, 50.0, 0.0),
        Decision::Free
    );
    assert_eq!(
        engine.on_pointer_moved(at(250), 1900, 540, 50.0, 0.0),
        Decision::Free
    );
    assert!(matches!(
        engine.on_pointer_moved(at(300), 1919, 540, 2.0, 0.0),
        Decision::Held { .. }
    ));
    assert!(matches!(
        engine.on_pointer_moved(at(350), 1919, 540, 2.0, 0.0),
        Decision::Held { .. }
    ));
}

// ============================================================================
// Trace replay
// ============================================================================

fn write_crossing_trace(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("crossing.jsonl");
    let trace = concat!(
        r#"{"event":"layout","t":0.0,"x":960,"y":540,"monitors":[{"x":0,"y":0,"width":1920,"height":1080},{"x":1920,"y":0,"width":1920,"height":1080}]}"#,
        "\n",
        r#"{"event":"motion","t":0.1,"x":1000,"y":540,"dx":5.0,"dy":0.0}"#,
        "\n",
        r#"{"event":"motion","t":0.2,"x":1919,"y":540,"dx":5.0,"dy":0.0}"#,
        "\n",
        r#"{"event":"motion","t":0.7,"x":1919,"y":540}"#,
        "\n",
    );
    std::fs::write(&path, trace).unwrap();
    path
}

#[tokio::test]
async fn test_trace_drives_engine_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_crossing_trace(&dir);

    let mut engine = EdgeEngine::new(defaults());
    let mut backend = ReplayBackend::open(&path).await.unwrap();
    let mut decisions = Vec::new();

    while let Some(event) = backend.next_event().await.unwrap() {
        match event {
            BackendEvent::Layout {
                timestamp,
                monitors,
                position,
            } => engine.on_monitor_set_changed(timestamp, monitors, position),
            BackendEvent::Motion {
                timestamp,
                x,
                y,
                dx,
                dy,
            } => decisions.push(engine.on_pointer_moved(timestamp, x, y, dx, dy)),
        }
    }

    assert_eq!(decisions.len(), 3);
    assert_eq!(decisions[0], Decision::Free);
    assert_eq!(decisions[1], Decision::Held { x: 1918, y: 540 });
    expect_passed_into(&engine, decisions[2], MonitorRect::new(1920, 0, 1920, 1080));
}

#[tokio::test]
async fn test_daemon_replays_trace_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_crossing_trace(&dir);

    let daemon = Daemon::new(
        &Config::default_config(),
        dir.path().join("sticky-edges.toml"),
    );
    let mut backend = ReplayBackend::open(&path).await.unwrap();

    daemon.run(&mut backend).await.unwrap();

    // The shutdown path always leaves the pointer free.
    assert!(backend.held().is_none());
}
