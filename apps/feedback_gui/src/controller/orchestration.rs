//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{DashboardController, GatewayError, RefreshRequest, SubmissionController};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), UiError> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(UiError::from_message(
            UiErrorContext::CommandQueue,
            "UI command queue is full; please retry",
        )),
        Err(TrySendError::Disconnected(_)) => Err(UiError::from_message(
            UiErrorContext::CommandQueue,
            "Backend command processor disconnected (possible startup failure); restart the app",
        )),
    }
}

/// Validates the draft and queues the create request. A request that cannot
/// be queued is settled immediately as a network failure so the form never
/// stays locked.
pub fn submit_review(
    submission: &mut SubmissionController,
    cmd_tx: &Sender<BackendCommand>,
) -> Result<(), UiError> {
    let request = match submission.submit() {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!("submission not sent: {err}");
            return Ok(());
        }
    };

    dispatch_backend_command(cmd_tx, BackendCommand::SubmitReview { request }).inspect_err(|err| {
        submission.complete(Err(GatewayError::network(err.message())));
    })
}

/// Queues both dashboard reads. Shared by the timer and the Refresh button.
pub fn refresh_dashboard(
    request: RefreshRequest,
    cmd_tx: &Sender<BackendCommand>,
) -> Result<(), UiError> {
    dispatch_backend_command(cmd_tx, BackendCommand::RefreshDashboard { request })
}

pub fn manual_refresh(
    dashboard: &mut DashboardController,
    cmd_tx: &Sender<BackendCommand>,
) -> Result<(), UiError> {
    refresh_dashboard(dashboard.refresh(), cmd_tx)
}
