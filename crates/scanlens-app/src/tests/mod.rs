use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use scanlens_config::Config;
use scanlens_replay::{Recording, ReplayDecoder, ReplayMedia};
use scanlens_types::{AppEvent, SessionState};
use tokio::sync::watch;
use tokio::time::timeout;

use crate::orchestrator::Orchestrator;

mod orchestrator_tests;

/// No startup or switch delays, fast frames, 400x300 display
pub(crate) fn fast_config() -> Config {
    let mut config = Config::default();
    config.scanner.time_between_scans_ms = 5;
    config.scanner.startup_delay_ms = 0;
    config.scanner.switch_delay_ms = 0;
    config.overlay.display_width = 400.0;
    config.overlay.display_height = 300.0;
    config
}

pub(crate) struct Harness {
    pub orchestrator: Orchestrator,
    pub snapshot: watch::Receiver<SessionState>,
    pub events_tx: AsyncSender<AppEvent>,
    pub events_rx: AsyncReceiver<AppEvent>,
}

pub(crate) fn harness(config: &Config, recording_json: &str) -> Harness {
    let recording = Arc::new(Recording::from_json(recording_json).unwrap());
    let media = Arc::new(ReplayMedia::new(recording.clone(), Duration::from_millis(1)));
    let decoder = Arc::new(ReplayDecoder::new(recording));
    let (events_tx, events_rx) = kanal::bounded_async(256);
    let (orchestrator, snapshot) = Orchestrator::new(config, media, decoder, events_tx.clone());

    Harness {
        orchestrator,
        snapshot,
        events_tx,
        events_rx,
    }
}

pub(crate) async fn wait_for_state(
    snapshot: &mut watch::Receiver<SessionState>,
    what: &str,
    predicate: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    let outcome = timeout(Duration::from_secs(3), snapshot.wait_for(predicate))
        .await
        .map(|waited| waited.map(|state| state.clone()));

    match outcome {
        Ok(Ok(state)) => state,
        Ok(Err(e)) => panic!("snapshot channel closed while waiting for {what}: {e}"),
        Err(_) => panic!("Timeout waiting for {what}, last state: {:?}", *snapshot.borrow()),
    }
}
