//! UI/backend events and error modeling for the feedback GUI controller.

use client_core::{DashboardUpdate, GatewayError, SubmissionOutcome, API_UNREACHABLE_MESSAGE};
use shared::protocol::HealthResponse;

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    Error(UiError),
    Submission(SubmissionOutcome),
    Dashboard(DashboardUpdate),
    Health(Result<HealthResponse, GatewayError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Server,
    Network,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    CommandQueue,
    HealthCheck,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("disconnected")
            || lower.contains("connection")
            || lower.contains("network")
            || lower.contains("timed out")
        {
            UiErrorCategory::Network
        } else {
            UiErrorCategory::Internal
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_gateway(context: UiErrorContext, err: &GatewayError, fallback: &str) -> Self {
        let category = if err.is_network() {
            UiErrorCategory::Network
        } else {
            UiErrorCategory::Server
        };
        Self {
            category,
            context,
            message: err.user_message(fallback),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Status bar state derived from the last health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiHealth {
    Unknown,
    Online,
    Unreachable(String),
}

impl ApiHealth {
    pub fn from_result(result: &Result<HealthResponse, GatewayError>) -> Self {
        match result {
            Ok(health) if health.is_ok() => Self::Online,
            Ok(health) => Self::Unreachable(
                health
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("API reported status '{}'", health.status)),
            ),
            Err(err) => Self::Unreachable(
                UiError::from_gateway(UiErrorContext::HealthCheck, err, API_UNREACHABLE_MESSAGE)
                    .message()
                    .to_string(),
            ),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Unknown => "Checking API...",
            Self::Online => "API online",
            Self::Unreachable(_) => API_UNREACHABLE_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_keep_their_kind() {
        let network = UiError::from_gateway(
            UiErrorContext::HealthCheck,
            &GatewayError::network("connection refused"),
            API_UNREACHABLE_MESSAGE,
        );
        assert_eq!(network.category(), UiErrorCategory::Network);
        assert_eq!(network.context(), UiErrorContext::HealthCheck);

        let server = UiError::from_gateway(
            UiErrorContext::HealthCheck,
            &GatewayError::server(Some(503), None),
            API_UNREACHABLE_MESSAGE,
        );
        assert_eq!(server.category(), UiErrorCategory::Server);
        assert_eq!(server.message(), API_UNREACHABLE_MESSAGE);
    }

    #[test]
    fn classifies_command_processor_disconnect_as_network_error() {
        let err = UiError::from_message(
            UiErrorContext::CommandQueue,
            "Backend command processor disconnected",
        );
        assert_eq!(err.category(), UiErrorCategory::Network);
    }

    #[test]
    fn startup_failures_are_internal() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "backend worker startup failure: invalid api base url",
        );
        assert_eq!(err.category(), UiErrorCategory::Internal);
    }

    #[test]
    fn health_status_reflects_probe() {
        let ok = Ok(HealthResponse {
            status: "ok".into(),
            message: Some("API is running".into()),
        });
        assert_eq!(ApiHealth::from_result(&ok), ApiHealth::Online);

        let down: Result<HealthResponse, GatewayError> =
            Err(GatewayError::network("connection refused"));
        let health = ApiHealth::from_result(&down);
        assert!(matches!(health, ApiHealth::Unreachable(_)));
        assert_eq!(health.label(), API_UNREACHABLE_MESSAGE);
    }
}
