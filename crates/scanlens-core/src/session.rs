use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use scanlens_config::scanner::ScannerConfig;
use scanlens_types::{AppEvent, DeviceId, Generation, SessionEvent};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::decoder::{DecodeHints, FrameDecoder};
use crate::device::{MediaDevices, VideoStream};
use crate::error::{DecodeError, ScanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Starting,
    Running,
    Stopping,
    Failed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Starting => "starting",
            SessionPhase::Running => "running",
            SessionPhase::Stopping => "stopping",
            SessionPhase::Failed => "failed",
        }
    }
}

struct ActiveLoop {
    generation: Generation,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Continuous decode loop against one camera.
///
/// Every event the loop emits carries the generation it was started with, so
/// the owner can drop whatever is still in flight after a restart.
pub struct DecodeSession {
    media: Arc<dyn MediaDevices>,
    decoder: Arc<dyn FrameDecoder>,
    hints: DecodeHints,
    scan_interval: Duration,
    phase: Arc<watch::Sender<SessionPhase>>,
    active: Option<ActiveLoop>,
}

impl DecodeSession {
    pub fn new(
        media: Arc<dyn MediaDevices>,
        decoder: Arc<dyn FrameDecoder>,
        config: &ScannerConfig,
    ) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Idle);

        Self {
            media,
            decoder,
            hints: DecodeHints::new(config.possible_formats.clone()),
            scan_interval: config.time_between_scans(),
            phase: Arc::new(phase),
            active: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Generation of the loop currently owned, if any
    pub fn generation(&self) -> Option<Generation> {
        self.active.as_ref().map(|active| active.generation)
    }

    /// Spawn the decode loop. Only valid from `Idle`, callers stop first.
    pub fn start(
        &mut self,
        device_id: Option<DeviceId>,
        generation: Generation,
        events: AsyncSender<AppEvent>,
    ) -> Result<(), ScanError> {
        let phase = self.phase();
        if phase != SessionPhase::Idle {
            return Err(ScanError::NotIdle(phase.as_str()));
        }

        tracing::info!(
            "[SESSION] starting generation {generation} on {}",
            device_id.as_deref().unwrap_or("default camera")
        );
        self.phase.send_replace(SessionPhase::Starting);

        let cancel = CancellationToken::new();
        let ctx = LoopContext {
            media: self.media.clone(),
            decoder: self.decoder.clone(),
            hints: self.hints.clone(),
            scan_interval: self.scan_interval,
            phase: self.phase.clone(),
            generation,
            device_id,
            events,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(run_loop(ctx));

        self.active = Some(ActiveLoop {
            generation,
            cancel,
            task,
        });
        Ok(())
    }

    /// Halt the loop and release the camera. Safe from any phase.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            self.phase.send_replace(SessionPhase::Idle);
            return;
        };

        tracing::info!("[SESSION] stopping generation {}", active.generation);
        self.phase.send_replace(SessionPhase::Stopping);
        active.cancel.cancel();

        if let Err(e) = active.task.await {
            if e.is_panic() {
                tracing::error!("[SESSION] decode loop panicked: {e}");
            }
        }

        self.phase.send_replace(SessionPhase::Idle);
    }
}

impl Drop for DecodeSession {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

struct LoopContext {
    media: Arc<dyn MediaDevices>,
    decoder: Arc<dyn FrameDecoder>,
    hints: DecodeHints,
    scan_interval: Duration,
    phase: Arc<watch::Sender<SessionPhase>>,
    generation: Generation,
    device_id: Option<DeviceId>,
    events: AsyncSender<AppEvent>,
    cancel: CancellationToken,
}

impl LoopContext {
    /// Send unless cancelled. `false` means the loop should wind down.
    async fn emit(&self, event: SessionEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        tokio::select! {
            _ = self.cancel.cancelled() => false,
            sent = self.events.send(AppEvent::Session(event)) => sent.is_ok(),
        }
    }

    fn transition(&self, from: &[SessionPhase], to: SessionPhase) {
        self.phase.send_if_modified(|phase| {
            if from.contains(phase) {
                *phase = to;
                true
            } else {
                false
            }
        });
    }

    async fn fail(&self, err: ScanError) {
        tracing::warn!("[SESSION] generation {} failed: {err}", self.generation);
        self.transition(
            &[SessionPhase::Starting, SessionPhase::Running],
            SessionPhase::Failed,
        );
        self.emit(SessionEvent::Failed {
            generation: self.generation,
            message: err.user_message(),
        })
        .await;
    }
}

async fn run_loop(ctx: LoopContext) {
    let acquired = tokio::select! {
        _ = ctx.cancel.cancelled() => {
            tracing::debug!(
                "[SESSION] generation {} superseded before acquisition",
                ctx.generation
            );
            return;
        }
        acquired = ctx.media.acquire_stream(ctx.device_id.as_deref()) => acquired,
    };

    let mut stream = match acquired {
        Ok(stream) => stream,
        Err(_) if ctx.cancel.is_cancelled() => return,
        Err(e) => {
            ctx.fail(e).await;
            return;
        }
    };

    if ctx.cancel.is_cancelled() {
        stream.release();
        return;
    }

    ctx.transition(&[SessionPhase::Starting], SessionPhase::Running);
    let started = ctx
        .emit(SessionEvent::Started {
            generation: ctx.generation,
            device_id: Some(stream.device_id().to_string()),
        })
        .await;

    if started {
        decode_frames(&ctx, stream.as_mut()).await;
    }

    stream.release();
    tracing::debug!("[SESSION] generation {} released camera", ctx.generation);
}

async fn decode_frames(ctx: &LoopContext, stream: &mut dyn VideoStream) {
    let mut ticker = tokio::time::interval(ctx.scan_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ctx.cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let frame = tokio::select! {
            _ = ctx.cancel.cancelled() => return,
            frame = stream.next_frame() => frame,
        };

        let frame = match frame {
            Ok(frame) => frame,
            Err(_) if ctx.cancel.is_cancelled() => return,
            Err(e) => {
                ctx.fail(e).await;
                return;
            }
        };

        let decoder = ctx.decoder.clone();
        let hints = ctx.hints.clone();
        let sequence = frame.sequence;
        let outcome = tokio::task::spawn_blocking(move || decoder.decode(&frame, &hints)).await;

        let keep_going = match outcome {
            Ok(Ok(result)) if ctx.hints.allows(result.format) => {
                tracing::debug!(
                    "[SESSION] frame {sequence}: decoded {:?} ({} chars)",
                    result.format,
                    result.text.len()
                );
                ctx.emit(SessionEvent::Decoded {
                    generation: ctx.generation,
                    result,
                })
                .await
            }
            Ok(Ok(result)) => {
                tracing::trace!("[SESSION] frame {sequence}: ignoring {:?}", result.format);
                true
            }
            Ok(Err(DecodeError::NotFound)) => true,
            Ok(Err(e)) => {
                tracing::debug!("[SESSION] frame {sequence}: {e}");
                ctx.emit(SessionEvent::FrameError {
                    generation: ctx.generation,
                    message: e.to_string(),
                })
                .await
            }
            Err(e) => {
                tracing::error!("[SESSION] decode task error: {e}");
                true
            }
        };

        if !keep_going {
            return;
        }
    }
}
