use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{
        CreateReviewRequest, CreateReviewResponse, HealthResponse, ListReviewsResponse, Review,
        StatsSnapshot,
    },
};
use tracing::{info, warn};

pub mod config;
pub mod dashboard;
pub mod error;
pub mod submission;

pub use config::{load_settings, ClientSettings};
pub use dashboard::{
    spawn_refresh, DashboardController, DashboardUpdate, RatingBucket, RatingFilter,
    RefreshRequest, StatsPanel,
};
pub use error::{GatewayError, API_UNREACHABLE_MESSAGE, NETWORK_ERROR_MESSAGE};
pub use submission::{
    SubmissionController, SubmissionOutcome, SubmissionStatus, SubmitError, ValidationError,
};

/// Everything the two views need from the review backend.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn create_review(
        &self,
        request: &CreateReviewRequest,
    ) -> Result<CreateReviewResponse, GatewayError>;
    async fn list_reviews(&self) -> Result<Vec<Review>, GatewayError>;
    async fn get_stats(&self) -> Result<StatsSnapshot, GatewayError>;
    async fn health(&self) -> Result<HealthResponse, GatewayError>;
}

pub struct HttpApiGateway {
    http: Client,
    base_url: String,
}

impl HttpApiGateway {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let base_url = config::normalize_base_url(&settings.api_base_url)?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn into_shared(self) -> Arc<dyn ApiGateway> {
        Arc::new(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.json::<ApiError>().await.unwrap_or_default();
        return Err(GatewayError::from_api_error(status.as_u16(), &body));
    }
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl ApiGateway for HttpApiGateway {
    async fn create_review(
        &self,
        request: &CreateReviewRequest,
    ) -> Result<CreateReviewResponse, GatewayError> {
        let response = self
            .http
            .post(format!("{}/api/reviews", self.base_url))
            .json(request)
            .send()
            .await?;
        let created: CreateReviewResponse = read_json(response).await.inspect_err(|err| {
            warn!(rating = request.user_rating.value(), "review submission failed: {err}");
        })?;
        info!(review_id = %created.review_id, "review submitted");
        Ok(created)
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, GatewayError> {
        let body: ListReviewsResponse = self.get_json("/api/admin/reviews").await?;
        Ok(body.reviews)
    }

    async fn get_stats(&self) -> Result<StatsSnapshot, GatewayError> {
        self.get_json("/api/admin/stats").await
    }

    async fn health(&self) -> Result<HealthResponse, GatewayError> {
        self.get_json("/api/health").await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
