//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{AppState, StatusMessage};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Marks the command's action in flight and queues it. Returns false when
/// the action was already in flight or could not be queued.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    state: &mut AppState,
) -> bool {
    let action = cmd.action();
    let cmd_name = cmd.name();
    if !state.begin(action) {
        return false;
    }

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, action = %action, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            state.cancel(&action);
            state.set_status(StatusMessage::error("UI command queue is full; please retry"));
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            state.cancel(&action);
            state.set_status(StatusMessage::error(
                "Backend command processor disconnected (possible startup/runtime failure); restart the app",
            ));
            tracing::warn!(command = cmd_name, "backend command processor disconnected");
            false
        }
    }
}
