//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{
    spawn_refresh, submission::send_submission, ApiGateway, ClientSettings, HttpApiGateway,
};
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

        let gateway: Arc<dyn ApiGateway> = match HttpApiGateway::new(&settings) {
            Ok(gateway) => gateway.into_shared(),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {err:#}"),
                )));
                tracing::error!("failed to build API gateway: {err:#}");
                return;
            }
        };

        tracing::info!(api_base_url = %settings.api_base_url, "backend worker ready");
        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Connected to {}",
            settings.api_base_url
        )));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                run_command(Arc::clone(&gateway), cmd, ui_tx.clone());
            }
            tracing::info!("UI command queue closed; backend worker exiting");
        });
    });
}

/// Every command runs on its own task so a slow request never holds up the
/// queue.
fn run_command(gateway: Arc<dyn ApiGateway>, cmd: BackendCommand, ui_tx: Sender<UiEvent>) {
    match cmd {
        BackendCommand::SubmitReview { request } => {
            tokio::spawn(async move {
                let outcome = send_submission(gateway.as_ref(), request).await;
                let _ = ui_tx.try_send(UiEvent::Submission(outcome));
            });
        }
        BackendCommand::RefreshDashboard { request } => {
            let _ = spawn_refresh(gateway, request, move |update| {
                let _ = ui_tx.try_send(UiEvent::Dashboard(update));
            });
        }
        BackendCommand::CheckHealth => {
            tokio::spawn(async move {
                let result = gateway.health().await;
                if let Err(err) = &result {
                    tracing::warn!("health check failed: {err}");
                }
                let _ = ui_tx.try_send(UiEvent::Health(result));
            });
        }
    }
}
