use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use scanlens_config::Config;
use scanlens_core::{FrameDecoder, MediaDevices};
use scanlens_types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::orchestrator::{Orchestrator, ScannerHandle};
use crate::ui::{command_loop, ui_loop};

/// Centralized channel management
pub struct ChannelSet {
    pub events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            events: kanal::bounded_async(256), // decode bursts + UI commands
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    config: Config,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(config: Config) -> Self {
        Self {
            channels: ChannelSet::new(),
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(
        &self,
        media: Arc<dyn MediaDevices>,
        decoder: Arc<dyn FrameDecoder>,
    ) -> (ScannerHandle, JoinSet<anyhow::Result<()>>) {
        let mut tasks = JoinSet::new();

        let (mut orchestrator, snapshot) =
            Orchestrator::new(&self.config, media, decoder, self.channels.events.0.clone());
        let handle = ScannerHandle::new(self.channels.events.0.clone(), snapshot);

        // Event loop
        orchestrator.initialize();
        tasks.spawn(event_loop(orchestrator, self.channels.events.1.clone()));

        // Display surface
        tasks.spawn(ui_loop(handle.subscribe(), self.cancel_token.child_token()));

        // Console commands
        tasks.spawn(command_loop(handle.clone(), self.cancel_token.clone()));

        (handle, tasks)
    }

    /// Resolves when a task asked for shutdown (e.g. `quit`)
    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await;
    }

    pub async fn shutdown(&self, handle: &ScannerHandle) {
        if let Err(e) = handle.dispose().await {
            tracing::warn!("Failed to dispose scanner: {e}");
        }
        self.cancel_token.cancel();
    }
}
