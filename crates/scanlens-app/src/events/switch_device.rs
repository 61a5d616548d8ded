use scanlens_types::{DeviceId, Generation};

use crate::orchestrator::Orchestrator;

/// Stop, clear, select, restart. Runs to completion before the next event,
/// so nothing from the old camera can land in between.
pub async fn handle_switch_device(orchestrator: &mut Orchestrator, device_id: DeviceId) {
    tracing::info!(">>> [SCANNER] switching camera to {device_id}");

    orchestrator.session.stop().await;
    orchestrator.clear_result();
    orchestrator.state.is_scanning = false;
    orchestrator.state.selected_device_id = Some(device_id.clone());

    let delay = orchestrator.scanner.switch_delay();
    orchestrator.schedule_start(Some(device_id), delay);
}

pub fn handle_start_session(
    orchestrator: &mut Orchestrator,
    generation: Generation,
    device_id: Option<DeviceId>,
) {
    orchestrator.start_session(generation, device_id);
}
