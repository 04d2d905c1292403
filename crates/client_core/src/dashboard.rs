//! Admin dashboard state: cached reviews and stats, refresh scheduling,
//! filtering and derived display values.

use std::{
    fmt,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Local;
use shared::{
    domain::Rating,
    protocol::{parse_timestamp, Review, StatsSnapshot},
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{error::GatewayError, ApiGateway};

pub const REVIEWS_FAILED_MESSAGE: &str = "Failed to fetch reviews";
pub const STATS_FAILED_MESSAGE: &str = "Failed to fetch stats";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingFilter {
    #[default]
    All,
    Rating(Rating),
}

impl RatingFilter {
    pub fn matches(&self, review: &Review) -> bool {
        match self {
            Self::All => true,
            Self::Rating(rating) => review.user_rating == *rating,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => "All Ratings".to_string(),
            Self::Rating(rating) if rating.value() == 1 => "1 Star".to_string(),
            Self::Rating(rating) => format!("{rating} Stars"),
        }
    }

    /// The filter choices in the order a picker presents them.
    pub fn options() -> impl Iterator<Item = RatingFilter> {
        std::iter::once(Self::All).chain(Rating::descending().map(Self::Rating))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid rating filter '{0}': expected \"all\" or 1-5")]
pub struct ParseRatingFilterError(String);

impl FromStr for RatingFilter {
    type Err = ParseRatingFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(|value| Rating::new(value).ok())
            .map(Self::Rating)
            .ok_or_else(|| ParseRatingFilterError(s.to_string()))
    }
}

impl fmt::Display for RatingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Rating(rating) => write!(f, "{rating}"),
        }
    }
}

/// Token for one refresh cycle. Timer ticks and the manual refresh action
/// both obtain it from [`DashboardController::refresh`].
#[must_use = "a refresh request does nothing until it is handed to the gateway"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest {
    pub sequence: u64,
}

/// Completion of one of the two reads a refresh issues.
#[derive(Debug, Clone)]
pub enum DashboardUpdate {
    Reviews(Result<Vec<Review>, GatewayError>),
    Stats(Result<StatsSnapshot, GatewayError>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingBucket {
    pub rating: Rating,
    pub count: u64,
    pub percentage: f64,
}

impl RatingBucket {
    pub fn label(&self) -> String {
        star_label(self.rating.value(), self.count)
    }
}

/// What the stats section should show. Loading and failed are distinct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsPanel<'a> {
    Loading,
    Unavailable {
        message: &'a str,
    },
    Ready {
        snapshot: &'a StatsSnapshot,
        error: Option<&'a str>,
    },
}

#[derive(Debug)]
struct RefreshSchedule {
    next_due: Instant,
}

#[derive(Debug, Default)]
struct InitialLoad {
    reviews_settled: bool,
    stats_settled: bool,
}

#[derive(Debug)]
pub struct DashboardController {
    reviews: Vec<Review>,
    stats: Option<StatsSnapshot>,
    reviews_error: Option<String>,
    stats_error: Option<String>,
    filter: RatingFilter,
    initial_load: InitialLoad,
    interval: Duration,
    schedule: Option<RefreshSchedule>,
    refreshes_issued: u64,
}

impl Default for DashboardController {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

impl DashboardController {
    pub fn new(interval: Duration) -> Self {
        Self {
            reviews: Vec::new(),
            stats: None,
            reviews_error: None,
            stats_error: None,
            filter: RatingFilter::All,
            initial_load: InitialLoad::default(),
            interval,
            schedule: None,
            refreshes_issued: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True until both reads of the first refresh have settled.
    pub fn is_loading(&self) -> bool {
        !(self.initial_load.reviews_settled && self.initial_load.stats_settled)
    }

    pub fn refreshes_issued(&self) -> u64 {
        self.refreshes_issued
    }

    pub fn refresh(&mut self) -> RefreshRequest {
        self.refreshes_issued += 1;
        debug!(sequence = self.refreshes_issued, "dashboard refresh requested");
        RefreshRequest {
            sequence: self.refreshes_issued,
        }
    }

    /// Starts the recurring schedule and returns the immediate refresh.
    /// Returns `None` if the schedule is already running.
    pub fn activate(&mut self, now: Instant) -> Option<RefreshRequest> {
        if self.schedule.is_some() {
            return None;
        }
        self.schedule = Some(RefreshSchedule {
            next_due: now + self.interval,
        });
        Some(self.refresh())
    }

    /// Tears the schedule down. Returns whether one was running.
    pub fn deactivate(&mut self) -> bool {
        let was_active = self.schedule.take().is_some();
        if was_active {
            debug!("dashboard refresh schedule cancelled");
        }
        was_active
    }

    pub fn is_active(&self) -> bool {
        self.schedule.is_some()
    }

    /// Fires at most one refresh when the interval has elapsed. Missed ticks
    /// are not replayed.
    pub fn poll_schedule(&mut self, now: Instant) -> Option<RefreshRequest> {
        let interval = self.interval;
        let schedule = self.schedule.as_mut()?;
        if now < schedule.next_due {
            return None;
        }
        schedule.next_due = now + interval;
        Some(self.refresh())
    }

    pub fn time_until_next_refresh(&self, now: Instant) -> Option<Duration> {
        self.schedule
            .as_ref()
            .map(|schedule| schedule.next_due.saturating_duration_since(now))
    }

    /// Applies one slice as soon as it arrives; the other slice is untouched.
    pub fn apply(&mut self, update: DashboardUpdate) {
        match update {
            DashboardUpdate::Reviews(Ok(reviews)) => {
                debug!(count = reviews.len(), "reviews loaded");
                self.reviews = reviews;
                self.reviews_error = None;
                self.initial_load.reviews_settled = true;
            }
            DashboardUpdate::Reviews(Err(err)) => {
                warn!("failed to load reviews: {err}");
                self.reviews_error = Some(err.user_message(REVIEWS_FAILED_MESSAGE));
                self.initial_load.reviews_settled = true;
            }
            DashboardUpdate::Stats(Ok(stats)) => {
                debug!(total = stats.total_reviews, "stats loaded");
                self.stats = Some(stats);
                self.stats_error = None;
                self.initial_load.stats_settled = true;
            }
            DashboardUpdate::Stats(Err(err)) => {
                warn!("failed to load stats: {err}");
                self.stats_error = Some(err.user_message(STATS_FAILED_MESSAGE));
                self.initial_load.stats_settled = true;
            }
        }
    }

    pub fn filter(&self) -> RatingFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: RatingFilter) {
        self.filter = filter;
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Cached reviews passing the filter, in backend order.
    pub fn visible_reviews(&self) -> Vec<&Review> {
        self.reviews
            .iter()
            .filter(|review| self.filter.matches(review))
            .collect()
    }

    pub fn stats(&self) -> Option<&StatsSnapshot> {
        self.stats.as_ref()
    }

    pub fn reviews_error(&self) -> Option<&str> {
        self.reviews_error.as_deref()
    }

    pub fn stats_error(&self) -> Option<&str> {
        self.stats_error.as_deref()
    }

    pub fn stats_panel(&self) -> StatsPanel<'_> {
        match (&self.stats, self.stats_error.as_deref()) {
            (Some(snapshot), error) => StatsPanel::Ready { snapshot, error },
            (None, Some(message)) => StatsPanel::Unavailable { message },
            (None, None) => StatsPanel::Loading,
        }
    }

    /// Per-rating counts and percentages, five stars first. Empty until stats
    /// have loaded.
    pub fn rating_breakdown(&self) -> Vec<RatingBucket> {
        let Some(stats) = &self.stats else {
            return Vec::new();
        };
        Rating::descending()
            .map(|rating| {
                let count = stats.count_for(rating);
                RatingBucket {
                    rating,
                    count,
                    percentage: bucket_percentage(count, stats.total_reviews),
                }
            })
            .collect()
    }
}

/// `count / total * 100` rounded to one decimal place; zero when `total` is zero.
pub fn bucket_percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Local-time rendering of a review timestamp: "N/A" when missing, the raw
/// value when it cannot be parsed.
pub fn display_date(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "N/A".to_string();
    }
    match parse_timestamp(raw) {
        Some(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}

fn star_label(stars: u8, count: u64) -> String {
    if count == 1 {
        format!("{stars} Star")
    } else {
        format!("{stars} Stars")
    }
}

/// Issues both reads of a refresh concurrently. Each completion is delivered
/// to `on_update` on its own, without waiting for its sibling.
pub fn spawn_refresh<F>(
    gateway: Arc<dyn ApiGateway>,
    request: RefreshRequest,
    on_update: F,
) -> (JoinHandle<()>, JoinHandle<()>)
where
    F: Fn(DashboardUpdate) + Clone + Send + Sync + 'static,
{
    debug!(sequence = request.sequence, "dispatching dashboard refresh");

    let reviews_gateway = Arc::clone(&gateway);
    let reviews_sink = on_update.clone();
    let reviews = tokio::spawn(async move {
        let result = reviews_gateway.list_reviews().await;
        reviews_sink(DashboardUpdate::Reviews(result));
    });

    let stats = tokio::spawn(async move {
        let result = gateway.get_stats().await;
        on_update(DashboardUpdate::Stats(result));
    });

    (reviews, stats)
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
