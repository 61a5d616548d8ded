use scanlens_types::DisplaySize;

use crate::orchestrator::Orchestrator;

/// Dismiss the current result, the camera keeps running
pub fn handle_reset(orchestrator: &mut Orchestrator) {
    tracing::debug!(">>> [SCANNER] reset");
    orchestrator.clear_result();
}

pub fn handle_resize(orchestrator: &mut Orchestrator, display_size: DisplaySize) {
    tracing::debug!(
        ">>> [SCANNER] display resized to {}x{}",
        display_size.width,
        display_size.height
    );
    orchestrator.state.display_size = display_size;
    orchestrator.recompute_overlay();
}
