use scanlens_types::Device;

use crate::orchestrator::Orchestrator;

pub fn handle_devices_enumerated(orchestrator: &mut Orchestrator, devices: Vec<Device>) {
    tracing::debug!(">>> [SCANNER] {} cameras available", devices.len());
    orchestrator.state.devices = devices;
}

pub fn handle_refresh_devices(orchestrator: &mut Orchestrator) {
    orchestrator
        .directory
        .spawn_enumeration(orchestrator.events_tx.clone());
}

/// Teardown, fine to call before the session ever started
pub async fn handle_dispose(orchestrator: &mut Orchestrator) {
    tracing::info!(">>> [SCANNER] disposing");

    orchestrator.disposed = true;
    orchestrator.generation += 1;
    orchestrator.session.stop().await;
    orchestrator.decay.cancel();
    orchestrator.state.is_scanning = false;
    orchestrator.publish();
}
