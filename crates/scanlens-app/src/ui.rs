use scanlens_types::SessionState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::orchestrator::ScannerHandle;

/// Console display surface, logs whatever changed in each snapshot
pub async fn ui_loop(
    mut snapshot: watch::Receiver<SessionState>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut previous = snapshot.borrow_and_update().clone();
    render(&SessionState::default(), &previous);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = snapshot.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = snapshot.borrow_and_update().clone();
                render(&previous, &state);
                previous = state;
            }
        }
    }

    tracing::debug!("[UI] display surface stopped");
    Ok(())
}

fn render(previous: &SessionState, state: &SessionState) {
    if state.devices != previous.devices || state.selected_device_id != previous.selected_device_id
    {
        if state.show_device_selector() {
            for device in &state.devices {
                let marker = if state.is_selected(device) { "*" } else { " " };
                tracing::info!("[UI] {marker} {} ({})", device.display_label(), device.id);
            }
        } else if let Some(device) = state.devices.first() {
            tracing::info!("[UI] camera: {}", device.display_label());
        }
    }

    if state.overlay != previous.overlay {
        match state.overlay {
            Some(rect) => tracing::info!(
                "[UI] highlight x={:.1} y={:.1} w={:.1} h={:.1} on {}x{}",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                state.display_size.width,
                state.display_size.height
            ),
            None => tracing::debug!("[UI] highlight cleared"),
        }
    }

    if state.error != previous.error {
        if let Some(error) = &state.error {
            tracing::warn!("[UI] error: {error}");
        }
    }

    if state.scanned_text != previous.scanned_text {
        if let Some(text) = &state.scanned_text {
            tracing::info!("[UI] content: {text}");
        }
    }

    if state.hint() != previous.hint() {
        if let Some(hint) = state.hint() {
            tracing::info!("[UI] {}", hint.message());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Switch(String),
    Reset,
    Devices,
    Resize(f64, f64),
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "switch" => Command::Switch(parts.next()?.to_string()),
        "reset" => Command::Reset,
        "devices" => Command::Devices,
        "resize" => {
            let (w, h) = parts.next()?.split_once('x')?;
            Command::Resize(w.parse().ok()?, h.parse().ok()?)
        }
        "quit" | "exit" => Command::Quit,
        _ => return None,
    };

    if parts.next().is_some() {
        return None;
    }
    Some(command)
}

/// Reads commands from stdin until `quit` or shutdown
pub async fn command_loop(handle: ScannerHandle, cancel: CancellationToken) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::debug!("[UI] stdin closed");
            break;
        };

        match parse_command(&line) {
            Some(Command::Switch(id)) => handle.switch_device(id).await?,
            Some(Command::Reset) => handle.reset().await?,
            Some(Command::Devices) => handle.refresh_devices().await?,
            Some(Command::Resize(w, h)) => handle.resize(w, h).await?,
            Some(Command::Quit) => {
                tracing::info!("[UI] quit requested");
                cancel.cancel();
                break;
            }
            None if line.trim().is_empty() => {}
            None => tracing::warn!(
                "[UI] unknown command '{}' (switch <id>, reset, devices, resize <w>x<h>, quit)",
                line.trim()
            ),
        }
    }

    Ok(())
}
