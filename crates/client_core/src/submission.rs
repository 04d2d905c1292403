//! Review submission workflow: draft fields, local validation and the
//! lifecycle of the single create request.

use shared::{
    domain::{Rating, MAX_REVIEW_CHARS},
    protocol::{CreateReviewRequest, CreateReviewResponse},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{error::GatewayError, ApiGateway};

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit review";

pub type SubmissionOutcome = Result<CreateReviewResponse, GatewayError>;

/// Local rejection raised before any request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a rating")]
    RatingRequired,
    #[error("Please select a rating between 1 and 5")]
    InvalidRating(u8),
    #[error("Please write a review")]
    ReviewTextRequired,
    #[error("Review is too long. Maximum 5000 characters.")]
    ReviewTooLong,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("operation not allowed while submission is {0:?}")]
    NotAllowed(SubmissionStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Editing,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Fields of the review being composed. `rating == 0` means unselected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub rating: u8,
    pub review_text: String,
}

impl SubmissionDraft {
    /// Checks run in order; the first failure wins.
    pub fn validate(&self) -> Result<CreateReviewRequest, ValidationError> {
        let rating = Rating::new(self.rating).map_err(|_| ValidationError::RatingRequired)?;
        if self.review_text.trim().is_empty() {
            return Err(ValidationError::ReviewTextRequired);
        }
        if self.review_text.chars().count() > MAX_REVIEW_CHARS {
            return Err(ValidationError::ReviewTooLong);
        }
        Ok(CreateReviewRequest {
            user_rating: rating,
            user_review: self.review_text.clone(),
        })
    }
}

#[derive(Debug)]
pub struct SubmissionController {
    draft: SubmissionDraft,
    status: SubmissionStatus,
    ai_response: Option<String>,
    error_message: Option<String>,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionController {
    pub fn new() -> Self {
        Self {
            draft: SubmissionDraft::default(),
            status: SubmissionStatus::Editing,
            ai_response: None,
            error_message: None,
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    pub fn rating(&self) -> u8 {
        self.draft.rating
    }

    pub fn review_text(&self) -> &str {
        &self.draft.review_text
    }

    pub fn char_count(&self) -> usize {
        self.draft.review_text.chars().count()
    }

    pub fn ai_response(&self) -> Option<&str> {
        self.ai_response.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// False while a request is in flight; every input control is disabled then.
    pub fn is_interactive(&self) -> bool {
        self.status != SubmissionStatus::Submitting
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        matches!(
            self.status,
            SubmissionStatus::Editing | SubmissionStatus::Failed
        ) && self.draft.rating != 0
            && !self.draft.review_text.trim().is_empty()
    }

    pub fn set_rating(&mut self, value: u8) -> Result<(), SubmitError> {
        self.ensure_editable()?;
        match Rating::new(value) {
            Ok(rating) => {
                self.draft.rating = rating.value();
                self.error_message = None;
                Ok(())
            }
            Err(_) => {
                let err = ValidationError::InvalidRating(value);
                self.draft.rating = 0;
                self.error_message = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Stores the text as given. Input controls cap length at the boundary;
    /// `submit` still rejects anything longer.
    pub fn set_review_text(&mut self, text: impl Into<String>) -> Result<(), SubmitError> {
        self.ensure_editable()?;
        self.draft.review_text = text.into();
        Ok(())
    }

    /// Validates the draft and, on success, moves to `Submitting` and returns
    /// the one request to send.
    pub fn submit(&mut self) -> Result<CreateReviewRequest, SubmitError> {
        match self.status {
            SubmissionStatus::Editing | SubmissionStatus::Failed => {}
            other => {
                warn!(status = ?other, "submit ignored");
                return Err(SubmitError::NotAllowed(other));
            }
        }

        self.status = SubmissionStatus::Validating;
        self.error_message = None;
        self.ai_response = None;

        match self.draft.validate() {
            Ok(request) => {
                debug!(rating = request.user_rating.value(), "submission validated");
                self.status = SubmissionStatus::Submitting;
                Ok(request)
            }
            Err(err) => {
                debug!("submission rejected locally: {err}");
                self.status = SubmissionStatus::Editing;
                self.error_message = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Applies the result of the request returned by `submit`. Returns false
    /// when no request was outstanding.
    pub fn complete(&mut self, outcome: SubmissionOutcome) -> bool {
        if self.status != SubmissionStatus::Submitting {
            warn!(status = ?self.status, "dropping submission outcome with no request in flight");
            return false;
        }

        match outcome {
            Ok(response) => {
                info!(review_id = %response.review_id, "review accepted");
                self.status = SubmissionStatus::Succeeded;
                self.ai_response = Some(response.ai_response);
                self.error_message = None;
                self.draft = SubmissionDraft::default();
            }
            Err(err) => {
                warn!("review submission failed: {err}");
                self.status = SubmissionStatus::Failed;
                self.error_message = Some(err.user_message(SUBMIT_FAILED_MESSAGE));
            }
        }
        true
    }

    /// "Submit another review": only valid after a success.
    pub fn reset(&mut self) -> Result<(), SubmitError> {
        if self.status != SubmissionStatus::Succeeded {
            return Err(SubmitError::NotAllowed(self.status));
        }
        *self = Self::new();
        Ok(())
    }

    fn ensure_editable(&mut self) -> Result<(), SubmitError> {
        match self.status {
            SubmissionStatus::Editing => Ok(()),
            SubmissionStatus::Failed => {
                self.status = SubmissionStatus::Editing;
                self.error_message = None;
                Ok(())
            }
            other => Err(SubmitError::NotAllowed(other)),
        }
    }
}

/// Sends a validated request. Transport failures come back as values so the
/// caller can hand them straight to [`SubmissionController::complete`].
pub async fn send_submission(
    gateway: &dyn ApiGateway,
    request: CreateReviewRequest,
) -> SubmissionOutcome {
    gateway.create_review(&request).await
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
