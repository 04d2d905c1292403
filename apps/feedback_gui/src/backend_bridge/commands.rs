//! Backend commands queued from UI to backend worker.

use client_core::RefreshRequest;
use shared::protocol::CreateReviewRequest;

#[derive(Debug)]
pub enum BackendCommand {
    SubmitReview { request: CreateReviewRequest },
    RefreshDashboard { request: RefreshRequest },
    CheckHealth,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitReview { .. } => "submit_review",
            Self::RefreshDashboard { .. } => "refresh_dashboard",
            Self::CheckHealth => "check_health",
        }
    }
}
