//! Orchestrator state handling, driven event by event

use std::time::Duration;

use scanlens_core::SessionPhase;
use scanlens_types::{
    AppEvent, CodeFormat, DecodeResult, Device, DisplaySize, Generation, Point, Rect,
    SessionEvent,
};
use tokio::time::timeout;

use super::{Harness, fast_config, harness};
use crate::events::handle_event;

const QUIET_CAMERA: &str = r#"{
    "devices": [ { "id": "cam", "label": "Rear" }, { "id": "cam2", "label": "" } ],
    "streams": {
        "cam": { "width": 640, "height": 480, "frames": [ { "kind": "empty" } ] },
        "cam2": { "width": 640, "height": 480, "frames": [ { "kind": "empty" } ] }
    }
}"#;

fn decoded(generation: Generation, text: &str, points: Vec<Point>) -> AppEvent {
    AppEvent::Session(SessionEvent::Decoded {
        generation,
        result: DecodeResult {
            text: text.to_string(),
            points,
            source_width: 640,
            source_height: 480,
            format: CodeFormat::QrCode,
        },
    })
}

fn finder_points() -> Vec<Point> {
    vec![
        Point::new(100.0, 100.0),
        Point::new(300.0, 100.0),
        Point::new(100.0, 300.0),
    ]
}

/// Feed queued events into the orchestrator until `done` matches one
async fn pump_until(h: &mut Harness, mut done: impl FnMut(&AppEvent) -> bool) {
    loop {
        let event = match timeout(Duration::from_secs(3), h.events_rx.recv()).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => panic!("Channel error: {}", e),
            Err(_) => panic!("Timeout pumping events"),
        };
        let stop = done(&event);
        handle_event(&mut h.orchestrator, event).await;
        if stop {
            return;
        }
    }
}

async fn running_harness() -> Harness {
    let mut h = harness(&fast_config(), QUIET_CAMERA);
    h.orchestrator.initialize();
    pump_until(&mut h, |event| {
        matches!(event, AppEvent::Session(SessionEvent::Started { .. }))
    })
    .await;
    assert!(h.orchestrator.state().is_scanning);
    h
}

#[tokio::test]
async fn test_first_result_latches() {
    let mut h = running_harness().await;
    let generation = h.orchestrator.generation();

    handle_event(&mut h.orchestrator, decoded(generation, "first", finder_points())).await;
    handle_event(&mut h.orchestrator, decoded(generation, "second", vec![])).await;

    let state = h.orchestrator.state();
    assert_eq!(state.scanned_text.as_deref(), Some("first"));
    assert_eq!(
        state.scan_region.as_ref().and_then(|r| r.points.clone()),
        Some(finder_points())
    );
    assert_eq!(h.snapshot.borrow().scanned_text.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_stale_generation_is_ignored() {
    let mut h = running_harness().await;
    let current = h.orchestrator.generation();

    handle_event(&mut h.orchestrator, decoded(current - 1, "old", vec![])).await;
    handle_event(
        &mut h.orchestrator,
        AppEvent::Session(SessionEvent::Failed {
            generation: current + 1,
            message: "from nowhere".into(),
        }),
    )
    .await;

    let state = h.orchestrator.state();
    assert_eq!(state.scanned_text, None);
    assert_eq!(state.error, None);
    assert!(state.is_scanning);
}

#[tokio::test]
async fn test_overlay_follows_display_size() {
    let mut h = running_harness().await;
    let generation = h.orchestrator.generation();

    handle_event(&mut h.orchestrator, decoded(generation, "code", finder_points())).await;
    // 640x480 on 400x300 scales by 0.625 with no crop
    assert_eq!(
        h.orchestrator.state().overlay,
        Some(Rect {
            x: 62.5,
            y: 62.5,
            width: 125.0,
            height: 125.0,
        })
    );

    handle_event(
        &mut h.orchestrator,
        AppEvent::Resize(DisplaySize::new(800.0, 600.0)),
    )
    .await;
    assert_eq!(
        h.orchestrator.state().overlay,
        Some(Rect {
            x: 125.0,
            y: 125.0,
            width: 250.0,
            height: 250.0,
        })
    );
    assert_eq!(h.snapshot.borrow().display_size, DisplaySize::new(800.0, 600.0));
}

#[tokio::test]
async fn test_result_without_points_uses_fallback() {
    let mut h = running_harness().await;
    let generation = h.orchestrator.generation();

    handle_event(&mut h.orchestrator, decoded(generation, "dm", vec![])).await;

    let state = h.orchestrator.state();
    assert_eq!(state.scan_region.as_ref().map(|r| r.points.is_none()), Some(true));
    assert_eq!(
        state.overlay,
        Some(Rect {
            x: 140.0,
            y: 90.0,
            width: 120.0,
            height: 120.0,
        })
    );
}

#[tokio::test]
async fn test_overlay_decays_but_text_stays() {
    let mut h = running_harness().await;
    let generation = h.orchestrator.generation();

    handle_event(&mut h.orchestrator, decoded(generation, "keep me", finder_points())).await;
    assert!(h.orchestrator.decay.is_pending());

    pump_until(&mut h, |event| matches!(event, AppEvent::OverlayExpired { .. })).await;

    let state = h.orchestrator.state();
    assert_eq!(state.scan_region, None);
    assert_eq!(state.overlay, None);
    assert_eq!(state.scanned_text.as_deref(), Some("keep me"));
    assert!(!h.orchestrator.decay.is_pending());
}

#[tokio::test]
async fn test_reset_keeps_camera_running() {
    let mut h = running_harness().await;
    let generation = h.orchestrator.generation();

    handle_event(&mut h.orchestrator, decoded(generation, "done", finder_points())).await;
    handle_event(
        &mut h.orchestrator,
        AppEvent::Session(SessionEvent::FrameError {
            generation,
            message: "Decode failed: format".into(),
        }),
    )
    .await;
    handle_event(&mut h.orchestrator, AppEvent::Reset).await;

    let state = h.orchestrator.state();
    assert_eq!(state.scanned_text, None);
    assert_eq!(state.scan_region, None);
    assert_eq!(state.overlay, None);
    assert_eq!(state.error, None);
    assert!(state.is_scanning);
    assert!(!h.orchestrator.decay.is_pending());
    assert_eq!(h.orchestrator.generation(), generation);
    assert_eq!(h.orchestrator.session_phase(), SessionPhase::Running);

    // Accepting results again
    handle_event(&mut h.orchestrator, decoded(generation, "again", vec![])).await;
    assert_eq!(h.orchestrator.state().scanned_text.as_deref(), Some("again"));
}

#[tokio::test]
async fn test_switch_clears_and_restarts() {
    let mut h = running_harness().await;
    let old_generation = h.orchestrator.generation();

    handle_event(&mut h.orchestrator, decoded(old_generation, "old", finder_points())).await;
    handle_event(
        &mut h.orchestrator,
        AppEvent::Session(SessionEvent::FrameError {
            generation: old_generation,
            message: "Decode failed: checksum".into(),
        }),
    )
    .await;

    handle_event(&mut h.orchestrator, AppEvent::SwitchDevice("cam2".into())).await;

    let state = h.orchestrator.state().clone();
    assert_eq!(state.selected_device_id.as_deref(), Some("cam2"));
    assert_eq!(state.scanned_text, None);
    assert_eq!(state.scan_region, None);
    assert_eq!(state.error, None);
    assert!(!state.is_scanning);
    assert!(h.orchestrator.generation() > old_generation);
    assert!(!h.orchestrator.decay.is_pending());
    assert_ne!(h.orchestrator.session_phase(), SessionPhase::Idle);
    // Published in one step
    assert_eq!(*h.snapshot.borrow(), state);

    // Late news from the previous camera changes nothing
    handle_event(&mut h.orchestrator, decoded(old_generation, "late", vec![])).await;
    assert_eq!(h.orchestrator.state().scanned_text, None);

    pump_until(&mut h, |event| {
        matches!(event, AppEvent::Session(SessionEvent::Started { .. }))
    })
    .await;
    assert!(h.orchestrator.state().is_scanning);
}

#[tokio::test]
async fn test_failure_reported_then_cleared_by_switch() {
    let mut h = running_harness().await;
    let generation = h.orchestrator.generation();

    handle_event(
        &mut h.orchestrator,
        AppEvent::Session(SessionEvent::Failed {
            generation,
            message: "Camera unavailable: unplugged".into(),
        }),
    )
    .await;
    let state = h.orchestrator.state();
    assert_eq!(state.error.as_deref(), Some("Camera unavailable: unplugged"));
    assert!(!state.is_scanning);
    assert_eq!(state.hint(), None);

    handle_event(&mut h.orchestrator, AppEvent::SwitchDevice("cam".into())).await;
    assert_eq!(h.orchestrator.state().error, None);
}

#[tokio::test]
async fn test_device_list_is_replaced() {
    let mut h = harness(&fast_config(), QUIET_CAMERA);
    let list = |ids: &[&str]| -> Vec<Device> {
        ids.iter()
            .map(|id| Device {
                id: id.to_string(),
                label: String::new(),
            })
            .collect()
    };

    handle_event(&mut h.orchestrator, AppEvent::DevicesEnumerated(list(&["a", "b"]))).await;
    handle_event(&mut h.orchestrator, AppEvent::DevicesEnumerated(list(&["c"]))).await;

    assert_eq!(h.orchestrator.state().devices, list(&["c"]));
    assert!(!h.snapshot.borrow().show_device_selector());
}

#[tokio::test]
async fn test_dispose_before_start_is_safe() {
    let mut h = harness(&fast_config(), QUIET_CAMERA);

    assert!(!handle_event(&mut h.orchestrator, AppEvent::Dispose).await);
    assert_eq!(h.orchestrator.session_phase(), SessionPhase::Idle);
    assert!(!h.orchestrator.state().is_scanning);

    // Anything after teardown is refused
    assert!(!handle_event(&mut h.orchestrator, AppEvent::Reset).await);
}

#[tokio::test]
async fn test_dispose_while_starting() {
    let mut config = fast_config();
    config.scanner.startup_delay_ms = 0;
    let mut h = harness(
        &config,
        r#"{ "streams": { "slow": { "width": 640, "height": 480, "acquire_delay_ms": 500 } } }"#,
    );
    h.orchestrator.initialize();
    assert_eq!(h.orchestrator.session_phase(), SessionPhase::Starting);

    assert!(!handle_event(&mut h.orchestrator, AppEvent::Dispose).await);
    assert_eq!(h.orchestrator.session_phase(), SessionPhase::Idle);
    assert!(!h.orchestrator.decay.is_pending());
}
