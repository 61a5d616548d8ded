use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use scanlens_config::Config;
use scanlens_config::scanner::ScannerConfig;
use scanlens_core::{
    DecayTimer, DecodeSession, DeviceDirectory, FrameDecoder, MediaDevices, OverlayGeometry,
    SessionPhase,
};
use scanlens_types::{AppEvent, DeviceId, Generation, SessionState};
use tokio::sync::watch;

/// Owner of the session snapshot.
///
/// Runs inside the event loop, so every mutation happens on one task and the
/// snapshot is published once per handled event.
pub struct Orchestrator {
    pub(crate) state: SessionState,
    pub(crate) generation: Generation,
    pub(crate) session: DecodeSession,
    pub(crate) directory: DeviceDirectory,
    pub(crate) decay: DecayTimer<AppEvent>,
    pub(crate) geometry: OverlayGeometry,
    pub(crate) scanner: ScannerConfig,
    pub(crate) events_tx: AsyncSender<AppEvent>,
    pub(crate) disposed: bool,
    snapshot_tx: watch::Sender<SessionState>,
}

impl Orchestrator {
    pub fn new(
        config: &Config,
        media: Arc<dyn MediaDevices>,
        decoder: Arc<dyn FrameDecoder>,
        events_tx: AsyncSender<AppEvent>,
    ) -> (Self, watch::Receiver<SessionState>) {
        let state = SessionState {
            display_size: config.overlay.display_size(),
            ..SessionState::default()
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(state.clone());

        let orchestrator = Self {
            state,
            generation: 0,
            session: DecodeSession::new(media.clone(), decoder, &config.scanner),
            directory: DeviceDirectory::new(media),
            decay: DecayTimer::new(config.overlay.decay(), events_tx.clone(), |token| {
                AppEvent::OverlayExpired { token }
            }),
            geometry: OverlayGeometry::from(&config.overlay),
            scanner: config.scanner.clone(),
            events_tx,
            disposed: false,
            snapshot_tx,
        };

        (orchestrator, snapshot_rx)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn session_phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Kick off enumeration and the default camera side by side
    pub fn initialize(&mut self) {
        tracing::info!("[SCANNER] initializing");
        self.directory.spawn_enumeration(self.events_tx.clone());
        self.schedule_start(None, self.scanner.startup_delay());
        self.publish();
    }

    /// Supersede whatever start is pending and start `device_id` after `delay`.
    /// The session must already be stopped.
    pub(crate) fn schedule_start(&mut self, device_id: Option<DeviceId>, delay: Duration) {
        self.generation += 1;
        let generation = self.generation;
        self.state.camera_requested = true;

        if delay.is_zero() {
            self.start_session(generation, device_id);
            return;
        }

        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let event = AppEvent::StartSession {
                generation,
                device_id,
            };
            if events_tx.send(event).await.is_err() {
                tracing::debug!("[SCANNER] event loop gone, dropping start {generation}");
            }
        });
    }

    pub(crate) fn start_session(&mut self, generation: Generation, device_id: Option<DeviceId>) {
        if self.disposed || generation != self.generation {
            tracing::debug!(
                "[SCANNER] skipping superseded start {generation} (current {})",
                self.generation
            );
            return;
        }

        if let Err(e) = self
            .session
            .start(device_id, generation, self.events_tx.clone())
        {
            tracing::warn!("[SCANNER] could not start session: {e}");
        }
    }

    /// Drop the shown result, its geometry and any error
    pub(crate) fn clear_result(&mut self) {
        self.decay.cancel();
        self.state.scanned_text = None;
        self.state.scan_region = None;
        self.state.overlay = None;
        self.state.error = None;
    }

    pub(crate) fn recompute_overlay(&mut self) {
        self.state.overlay = self
            .state
            .scan_region
            .as_ref()
            .and_then(|region| self.geometry.overlay_rect(region, self.state.display_size));
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        !self.disposed && generation == self.generation
    }

    pub(crate) fn publish(&self) {
        self.snapshot_tx.send_if_modified(|current| {
            if *current == self.state {
                false
            } else {
                *current = self.state.clone();
                true
            }
        });
    }
}

/// Read side and commands for the display surface
#[derive(Clone)]
pub struct ScannerHandle {
    commands: AsyncSender<AppEvent>,
    snapshot: watch::Receiver<SessionState>,
}

impl ScannerHandle {
    pub fn new(commands: AsyncSender<AppEvent>, snapshot: watch::Receiver<SessionState>) -> Self {
        Self { commands, snapshot }
    }

    pub fn snapshot(&self) -> SessionState {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.snapshot.clone()
    }

    pub async fn switch_device(&self, device_id: impl Into<DeviceId>) -> anyhow::Result<()> {
        self.send(AppEvent::SwitchDevice(device_id.into())).await
    }

    pub async fn reset(&self) -> anyhow::Result<()> {
        self.send(AppEvent::Reset).await
    }

    pub async fn resize(&self, width: f64, height: f64) -> anyhow::Result<()> {
        self.send(AppEvent::Resize(scanlens_types::DisplaySize::new(width, height)))
            .await
    }

    pub async fn refresh_devices(&self) -> anyhow::Result<()> {
        self.send(AppEvent::RefreshDevices).await
    }

    pub async fn dispose(&self) -> anyhow::Result<()> {
        self.send(AppEvent::Dispose).await
    }

    pub(crate) async fn send(&self, event: AppEvent) -> anyhow::Result<()> {
        self.commands.send(event).await?;
        Ok(())
    }
}
