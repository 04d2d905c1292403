use super::*;
use shared::domain::ReviewId;

fn accepted(ai_response: &str) -> SubmissionOutcome {
    Ok(CreateReviewResponse {
        review_id: ReviewId(1),
        user_rating: None,
        user_review: None,
        ai_response: ai_response.to_string(),
        created_at: None,
    })
}

fn filled(rating: u8, text: &str) -> SubmissionController {
    let mut controller = SubmissionController::new();
    controller.set_rating(rating).expect("rating");
    controller.set_review_text(text).expect("text");
    controller
}

#[test]
fn successful_submission_shows_response_and_clears_draft() {
    let mut controller = filled(5, "Great service, fast delivery");

    let request = controller.submit().expect("valid draft");
    assert_eq!(request.user_rating.value(), 5);
    assert_eq!(request.user_review, "Great service, fast delivery");
    assert_eq!(controller.status(), SubmissionStatus::Submitting);
    assert!(!controller.is_interactive());

    assert!(controller.complete(accepted("Thanks for the kind words!")));
    assert_eq!(controller.status(), SubmissionStatus::Succeeded);
    assert_eq!(controller.ai_response(), Some("Thanks for the kind words!"));
    assert_eq!(controller.rating(), 0);
    assert_eq!(controller.review_text(), "");
    assert_eq!(controller.error_message(), None);
}

#[test]
fn unselected_rating_is_rejected_without_a_request() {
    let mut controller = SubmissionController::new();
    controller.set_review_text("anything").expect("text");

    let err = controller.submit().expect_err("rating missing");
    assert_eq!(err, SubmitError::Validation(ValidationError::RatingRequired));
    assert_eq!(controller.status(), SubmissionStatus::Editing);
    assert_eq!(controller.error_message(), Some("Please select a rating"));
}

#[test]
fn out_of_range_ratings_never_produce_a_request() {
    for value in [0u8, 6, 7, 42, u8::MAX] {
        let mut controller = filled(3, "Decent");
        let _ = controller.set_rating(value);
        assert!(controller.submit().is_err(), "rating {value} must be rejected");
        assert_eq!(controller.status(), SubmissionStatus::Editing);
        assert!(controller.error_message().is_some());
    }
}

#[test]
fn setting_invalid_rating_reports_error_and_unselects() {
    let mut controller = filled(4, "Fine");
    let err = controller.set_rating(9).expect_err("out of range");
    assert_eq!(err, SubmitError::Validation(ValidationError::InvalidRating(9)));
    assert_eq!(controller.rating(), 0);
    assert_eq!(
        controller.error_message(),
        Some("Please select a rating between 1 and 5")
    );
}

#[test]
fn blank_text_is_rejected_locally() {
    for text in ["", "   ", "\n\t  \n"] {
        let mut controller = filled(4, text);
        let err = controller.submit().expect_err("blank text");
        assert_eq!(err, SubmitError::Validation(ValidationError::ReviewTextRequired));
        assert_eq!(controller.error_message(), Some("Please write a review"));
    }
}

#[test]
fn overlong_text_is_rejected_even_without_input_truncation() {
    let mut controller = filled(2, &"a".repeat(MAX_REVIEW_CHARS + 1));
    let err = controller.submit().expect_err("too long");
    assert_eq!(err, SubmitError::Validation(ValidationError::ReviewTooLong));
    assert_eq!(controller.status(), SubmissionStatus::Editing);
}

#[test]
fn length_limit_counts_characters_not_bytes() {
    let mut controller = filled(5, &"é".repeat(MAX_REVIEW_CHARS));
    assert_eq!(controller.char_count(), MAX_REVIEW_CHARS);
    assert!(controller.submit().is_ok());
}

#[test]
fn rating_check_runs_before_text_checks() {
    let mut controller = SubmissionController::new();
    controller.set_review_text("   ").expect("text");
    assert_eq!(
        controller.submit(),
        Err(SubmitError::Validation(ValidationError::RatingRequired))
    );
}

#[test]
fn selecting_a_rating_clears_validation_error() {
    let mut controller = SubmissionController::new();
    let _ = controller.submit();
    assert!(controller.error_message().is_some());

    controller.set_rating(3).expect("rating");
    assert_eq!(controller.error_message(), None);
}

#[test]
fn server_rejection_keeps_draft_and_surfaces_message() {
    let mut controller = filled(1, "Cold food");
    let _request = controller.submit().expect("valid");

    controller.complete(Err(GatewayError::server(
        Some(400),
        Some("user_review cannot be empty".to_string()),
    )));
    assert_eq!(controller.status(), SubmissionStatus::Failed);
    assert_eq!(controller.error_message(), Some("user_review cannot be empty"));
    assert_eq!(controller.rating(), 1);
    assert_eq!(controller.review_text(), "Cold food");
}

#[test]
fn server_rejection_without_message_uses_default() {
    let mut controller = filled(2, "Slow");
    let _request = controller.submit().expect("valid");
    controller.complete(Err(GatewayError::server(Some(500), None)));
    assert_eq!(controller.error_message(), Some(SUBMIT_FAILED_MESSAGE));
}

#[test]
fn network_failure_keeps_draft_and_allows_manual_retry() {
    let mut controller = filled(4, "Nice place");
    let _request = controller.submit().expect("valid");
    controller.complete(Err(GatewayError::network("connection refused")));

    assert_eq!(controller.status(), SubmissionStatus::Failed);
    assert_eq!(
        controller.error_message(),
        Some(crate::error::NETWORK_ERROR_MESSAGE)
    );
    assert!(controller.can_submit());

    let retry = controller.submit().expect("retry");
    assert_eq!(retry.user_review, "Nice place");
    assert_eq!(controller.status(), SubmissionStatus::Submitting);
}

#[test]
fn editing_after_failure_returns_to_editing() {
    let mut controller = filled(4, "Nice place");
    let _request = controller.submit().expect("valid");
    controller.complete(Err(GatewayError::network("timeout")));

    controller.set_review_text("Nice place, friendly staff").expect("edit");
    assert_eq!(controller.status(), SubmissionStatus::Editing);
    assert_eq!(controller.error_message(), None);
}

#[test]
fn double_submit_while_in_flight_is_refused() {
    let mut controller = filled(5, "Great");
    let _request = controller.submit().expect("valid");

    assert_eq!(
        controller.submit(),
        Err(SubmitError::NotAllowed(SubmissionStatus::Submitting))
    );
    assert!(controller.set_rating(1).is_err());
    assert!(controller.set_review_text("changed").is_err());
    assert_eq!(controller.review_text(), "Great");
}

#[test]
fn outcome_without_pending_request_is_ignored() {
    let mut controller = SubmissionController::new();
    assert!(!controller.complete(accepted("late")));
    assert_eq!(controller.status(), SubmissionStatus::Editing);
    assert_eq!(controller.ai_response(), None);
}

#[test]
fn reset_is_only_allowed_after_success() {
    let mut controller = filled(5, "Great");
    assert_eq!(
        controller.reset(),
        Err(SubmitError::NotAllowed(SubmissionStatus::Editing))
    );

    let _request = controller.submit().expect("valid");
    controller.complete(accepted("Thank you"));
    assert!(controller.set_rating(3).is_err());

    controller.reset().expect("reset");
    assert_eq!(controller.status(), SubmissionStatus::Editing);
    assert_eq!(controller.ai_response(), None);
    assert_eq!(controller.error_message(), None);
    assert_eq!(controller.draft(), &SubmissionDraft::default());
}

#[test]
fn submit_button_enablement_follows_draft() {
    let mut controller = SubmissionController::new();
    assert!(!controller.can_submit());
    controller.set_rating(3).expect("rating");
    assert!(!controller.can_submit());
    controller.set_review_text("  ok ").expect("text");
    assert!(controller.can_submit());
}
