use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Rating, ReviewId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub user_rating: Rating,
    pub user_review: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewResponse {
    pub review_id: ReviewId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_review: Option<String>,
    pub ai_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: ReviewId,
    pub user_rating: Rating,
    pub user_review: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_actions: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Review {
    /// The generated summary, treating an empty string as absent.
    pub fn ai_summary(&self) -> Option<&str> {
        non_blank(self.ai_summary.as_deref())
    }

    pub fn recommended_actions(&self) -> Option<&str> {
        non_blank(self.recommended_actions.as_deref())
    }

    /// Creation time parsed from RFC 3339, or from a naive ISO-8601 timestamp
    /// interpreted as UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListReviewsResponse {
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_reviews: u64,
    #[serde(default)]
    pub rating_distribution: BTreeMap<u8, u64>,
}

impl StatsSnapshot {
    pub fn count_for(&self, rating: Rating) -> u64 {
        self.rating_distribution
            .get(&rating.value())
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_distribution_reads_string_keys_and_defaults_missing_to_zero() {
        let stats: StatsSnapshot = serde_json::from_str(
            r#"{"total_reviews": 3, "rating_distribution": {"5": 2, "3": 1}}"#,
        )
        .expect("stats");

        assert_eq!(stats.count_for(Rating::new(5).expect("rating")), 2);
        assert_eq!(stats.count_for(Rating::new(3).expect("rating")), 1);
        assert_eq!(stats.count_for(Rating::new(1).expect("rating")), 0);
    }

    #[test]
    fn review_treats_empty_generated_fields_as_absent() {
        let review: Review = serde_json::from_str(
            r#"{
                "review_id": 7,
                "user_rating": 4,
                "user_review": "Friendly staff",
                "ai_summary": "",
                "recommended_actions": "Keep it up",
                "created_at": "2024-05-01T10:30:00.123456"
            }"#,
        )
        .expect("review");

        assert_eq!(review.review_id, ReviewId(7));
        assert_eq!(review.ai_summary(), None);
        assert_eq!(review.recommended_actions(), Some("Keep it up"));
        assert!(review.created_at_utc().is_some());
    }

    #[test]
    fn parses_offset_and_naive_timestamps() {
        let with_offset = parse_timestamp("2024-05-01T10:30:00+02:00").expect("offset");
        let naive = parse_timestamp("2024-05-01T08:30:00").expect("naive");
        assert_eq!(with_offset, naive);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn create_request_uses_backend_field_names() {
        let request = CreateReviewRequest {
            user_rating: Rating::new(5).expect("rating"),
            user_review: "Great service".to_string(),
        };
        let value = serde_json::to_value(&request).expect("json");
        assert_eq!(value["user_rating"], 5);
        assert_eq!(value["user_review"], "Great service");
    }
}
