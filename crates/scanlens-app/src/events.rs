use kanal::AsyncReceiver;
use scanlens_types::AppEvent;

use crate::orchestrator::Orchestrator;

pub mod lifecycle;
pub mod reset;
pub mod session_update;
pub mod switch_device;

use lifecycle::{handle_devices_enumerated, handle_dispose, handle_refresh_devices};
use reset::{handle_reset, handle_resize};
use session_update::{handle_overlay_expired, handle_session_event};
use switch_device::{handle_start_session, handle_switch_device};

/// Scanner main loop, returns once the orchestrator is disposed
pub async fn event_loop(
    mut orchestrator: Orchestrator,
    events_rx: AsyncReceiver<AppEvent>,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = events_rx.recv().await?;

        tracing::trace!(
            "[EVENT_LOOP] EVENT RECEIVED: {:?}",
            std::mem::discriminant(&event)
        );

        if !handle_event(&mut orchestrator, event).await {
            break;
        }
    }

    tracing::info!("[EVENT_LOOP] stopped");
    Ok(())
}

/// Apply one event. `false` once the orchestrator is disposed.
pub async fn handle_event(orchestrator: &mut Orchestrator, event: AppEvent) -> bool {
    if orchestrator.disposed {
        tracing::debug!("[EVENT_LOOP] disposed, ignoring {:?}", event);
        return false;
    }

    match event {
        AppEvent::SwitchDevice(device_id) => {
            handle_switch_device(orchestrator, device_id).await;
        }
        AppEvent::Reset => handle_reset(orchestrator),
        AppEvent::Resize(display_size) => handle_resize(orchestrator, display_size),
        AppEvent::RefreshDevices => handle_refresh_devices(orchestrator),
        AppEvent::Dispose => {
            handle_dispose(orchestrator).await;
            return false;
        }
        AppEvent::StartSession {
            generation,
            device_id,
        } => handle_start_session(orchestrator, generation, device_id),
        AppEvent::DevicesEnumerated(devices) => handle_devices_enumerated(orchestrator, devices),
        AppEvent::Session(event) => handle_session_event(orchestrator, event),
        AppEvent::OverlayExpired { token } => handle_overlay_expired(orchestrator, token),
    }

    orchestrator.publish();
    true
}
