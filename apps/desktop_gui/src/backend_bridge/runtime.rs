//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{execute, VenueStore};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Spawns the worker thread. It owns a tokio runtime and answers each
/// store command with exactly one `UiEvent::Store`.
pub fn launch(
    store: Arc<dyn VenueStore>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
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
                tracing::error!("backend: failed to build runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            tracing::debug!("backend: worker started");
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Store(command) => {
                        let name = command.name();
                        let outcome = execute(store.as_ref(), command).await;
                        if ui_tx.send(UiEvent::Store(outcome)).is_err() {
                            tracing::debug!(command = name, "backend: ui gone; dropping outcome");
                            break;
                        }
                    }
                    BackendCommand::Shutdown => break,
                }
            }
            tracing::debug!("backend: worker stopped");
        });
    })
}
