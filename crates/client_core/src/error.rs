use shared::error::ApiError;
use thiserror::Error;

/// Shown for any request that never reached the backend, timeouts included.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Shown when the health probe gets no usable answer.
pub const API_UNREACHABLE_MESSAGE: &str = "API is not reachable";

/// Failure of a single gateway call.
///
/// `Server` means the backend answered but did not produce a usable success
/// payload. `Network` means no answer arrived at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(
        "server rejected request ({}): {}",
        .status.map_or_else(|| "no status".to_string(), |code| format!("status {code}")),
        .message.as_deref().unwrap_or("no message")
    )]
    Server {
        status: Option<u16>,
        message: Option<String>,
    },
    #[error("network unavailable: {0}")]
    Network(String),
}

impl GatewayError {
    pub fn server(status: Option<u16>, message: Option<String>) -> Self {
        Self::Server { status, message }
    }

    pub fn from_api_error(status: u16, body: &ApiError) -> Self {
        Self::Server {
            status: Some(status),
            message: body.message().map(str::to_string),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network(detail.into())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Message to put in front of the user. Server messages are surfaced
    /// verbatim; `fallback` covers servers that reject without one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Server { message: None, .. } => fallback.to_string(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|status| status.as_u16());
        if err.is_decode() || status.is_some() {
            Self::Server {
                status,
                message: None,
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}
