use scanlens_types::{ScanRegion, SessionEvent};

use crate::orchestrator::Orchestrator;

pub fn handle_session_event(orchestrator: &mut Orchestrator, event: SessionEvent) {
    if !orchestrator.is_current(event.generation()) {
        tracing::debug!(
            ">>> [SCANNER] dropping event from generation {} (current {})",
            event.generation(),
            orchestrator.generation
        );
        return;
    }

    let state = &mut orchestrator.state;
    match event {
        SessionEvent::Started { device_id, .. } => {
            tracing::info!(
                ">>> [SCANNER] camera running: {}",
                device_id.as_deref().unwrap_or("default")
            );
            state.is_scanning = true;
            if state.selected_device_id.is_none() {
                state.selected_device_id = device_id;
            }

            // Labels and ids usually only show up once permission was granted
            if state.devices.is_empty() {
                orchestrator
                    .directory
                    .spawn_enumeration(orchestrator.events_tx.clone());
            }
        }
        SessionEvent::Decoded { result, .. } => {
            if state.scanned_text.is_some() {
                tracing::trace!(">>> [SCANNER] result latched, ignoring decode");
                return;
            }

            tracing::info!(
                ">>> [SCANNER] scanned {:?}: {} chars",
                result.format,
                result.text.len()
            );
            let region = ScanRegion::from(&result);
            state.scanned_text = Some(result.text);
            state.scan_region = Some(region.clone());
            orchestrator.decay.arm(region);
            orchestrator.recompute_overlay();
        }
        SessionEvent::FrameError { message, .. } => {
            tracing::debug!(">>> [SCANNER] frame error: {message}");
            state.error = Some(message);
        }
        SessionEvent::Failed { message, .. } => {
            tracing::error!(">>> [SCANNER] session failed: {message}");
            state.error = Some(message);
            state.is_scanning = false;
        }
    }
}

pub fn handle_overlay_expired(orchestrator: &mut Orchestrator, token: u64) {
    if orchestrator.decay.expire(token).is_some() {
        tracing::trace!(">>> [SCANNER] overlay decayed");
        orchestrator.state.scan_region = None;
        orchestrator.state.overlay = None;
    }
}
