//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{execute, ClientSettings, HttpCharacterApi};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let api = match HttpCharacterApi::new(&settings) {
            Ok(api) => api,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err}"),
                )));
                tracing::error!(error = %err, "failed to build character client");
                return;
            }
        };
        let features = settings.features;
        tracing::info!(server_url = %settings.server_url, "backend worker ready");

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Perform(action) => {
                        let report = execute(&api, action, &features).await;
                        if ui_tx.send(UiEvent::Report(report)).is_err() {
                            tracing::debug!("ui event receiver dropped; stopping backend worker");
                            break;
                        }
                    }
                }
            }
        });
    });
}
