use std::{collections::HashMap, sync::Arc, time::Instant};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    dashboard::display_date, load_settings, spawn_refresh, submission::send_submission,
    ApiGateway, DashboardController, DashboardUpdate, GatewayError, HttpApiGateway, RatingBucket,
    RatingFilter, RefreshRequest, StatsPanel, SubmissionController, API_UNREACHABLE_MESSAGE,
};
use shared::protocol::{Review, StatsSnapshot};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(about = "Command-line client for the customer feedback API")]
struct Cli {
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a review and print the generated response.
    Submit {
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        text: String,
    },
    /// List submitted reviews in backend order.
    Reviews {
        #[arg(long, default_value_t = RatingFilter::All)]
        rating: RatingFilter,
    },
    /// Show review totals and the per-rating breakdown.
    Stats,
    /// Probe the API health endpoint.
    Health,
    /// Keep the admin dashboard refreshing until interrupted.
    Watch {
        #[arg(long, default_value_t = RatingFilter::All)]
        rating: RatingFilter,
        /// Stop after this many completed refresh cycles.
        #[arg(long)]
        cycles: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(url) = cli.api_url.as_deref() {
        settings = settings.with_api_base_url(url)?;
    }
    let refresh_interval = settings.dashboard_refresh_interval();
    let gateway = HttpApiGateway::new(&settings)?.into_shared();

    match cli.command {
        Command::Submit { rating, text } => submit(gateway.as_ref(), rating, text).await,
        Command::Reviews { rating } => {
            let mut dashboard = DashboardController::new(refresh_interval);
            dashboard.set_filter(rating);
            let request = dashboard.refresh();
            load_once(&gateway, &mut dashboard, request).await;
            if let Some(message) = dashboard.reviews_error() {
                bail!("{message}");
            }
            print!("{}", render_reviews(&dashboard));
            Ok(())
        }
        Command::Stats => {
            let mut dashboard = DashboardController::new(refresh_interval);
            let request = dashboard.refresh();
            load_once(&gateway, &mut dashboard, request).await;
            match dashboard.stats_panel() {
                StatsPanel::Ready { snapshot, .. } => {
                    print!("{}", render_stats(snapshot, &dashboard.rating_breakdown()));
                    Ok(())
                }
                StatsPanel::Unavailable { message } => bail!("{message}"),
                StatsPanel::Loading => bail!("stats did not load"),
            }
        }
        Command::Health => {
            let health = match gateway.health().await {
                Ok(health) => health,
                Err(err) => bail!("{}", health_failure_message(&err)),
            };
            match &health.message {
                Some(message) => println!("{}: {message}", health.status),
                None => println!("{}", health.status),
            }
            if !health.is_ok() {
                bail!("API reported status '{}'", health.status);
            }
            Ok(())
        }
        Command::Watch { rating, cycles } => {
            let mut dashboard = DashboardController::new(refresh_interval);
            dashboard.set_filter(rating);
            watch(gateway, dashboard, cycles).await
        }
    }
}

async fn submit(gateway: &dyn ApiGateway, rating: u8, text: String) -> Result<()> {
    let mut controller = SubmissionController::new();
    controller.set_rating(rating)?;
    controller.set_review_text(text)?;
    let request = controller.submit()?;

    let outcome = send_submission(gateway, request).await;
    controller.complete(outcome);

    match (controller.ai_response(), controller.error_message()) {
        (Some(response), _) => {
            println!("Thank You for Your Feedback!");
            println!();
            println!("{response}");
            Ok(())
        }
        (None, Some(message)) => bail!("{message}"),
        (None, None) => bail!("submission ended in state {:?}", controller.status()),
    }
}

/// Runs one refresh cycle to completion.
async fn load_once(
    gateway: &Arc<dyn ApiGateway>,
    dashboard: &mut DashboardController,
    request: RefreshRequest,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _ = spawn_refresh(Arc::clone(gateway), request, move |update| {
        let _ = tx.send(update);
    });
    while let Some(update) = rx.recv().await {
        dashboard.apply(update);
    }
}

async fn watch(
    gateway: Arc<dyn ApiGateway>,
    mut dashboard: DashboardController,
    cycles: Option<u64>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<(u64, DashboardUpdate)>();
    let dispatch = |request: RefreshRequest| {
        let tx = tx.clone();
        let _ = spawn_refresh(Arc::clone(&gateway), request, move |update| {
            let _ = tx.send((request.sequence, update));
        });
    };

    if let Some(request) = dashboard.activate(Instant::now()) {
        dispatch(request);
    }

    let mut tracker = CycleTracker::default();
    let mut completed = 0u64;
    loop {
        let wait = dashboard
            .time_until_next_refresh(Instant::now())
            .unwrap_or_else(|| dashboard.interval());
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted; stopping dashboard refresh");
                break;
            }
            Some((sequence, update)) = rx.recv() => {
                dashboard.apply(update);
                if tracker.settle(sequence) {
                    completed += 1;
                    println!("{}", render_dashboard(&dashboard));
                    if cycles.is_some_and(|limit| completed >= limit) {
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(wait) => {
                if let Some(request) = dashboard.poll_schedule(Instant::now()) {
                    dispatch(request);
                }
            }
        }
    }

    dashboard.deactivate();
    Ok(())
}

/// Counts settled slices per refresh so overlapping refreshes are never
/// mixed into one cycle.
#[derive(Debug, Default)]
struct CycleTracker {
    pending: HashMap<u64, u8>,
}

impl CycleTracker {
    const SLICES_PER_REFRESH: u8 = 2;

    /// Records one settled slice. Returns true when it completes its refresh.
    fn settle(&mut self, sequence: u64) -> bool {
        let settled = self.pending.entry(sequence).or_default();
        *settled += 1;
        if *settled < Self::SLICES_PER_REFRESH {
            return false;
        }
        self.pending.remove(&sequence);
        true
    }
}

fn health_failure_message(err: &GatewayError) -> String {
    err.user_message(API_UNREACHABLE_MESSAGE)
}

fn render_dashboard(dashboard: &DashboardController) -> String {
    let mut out = String::from("== Admin Dashboard ==\n");
    if let Some(message) = dashboard.reviews_error() {
        out.push_str(&format!("! {message}\n"));
    }
    match dashboard.stats_panel() {
        StatsPanel::Ready { snapshot, error } => {
            if let Some(message) = error {
                out.push_str(&format!("! {message}\n"));
            }
            out.push_str(&render_stats(snapshot, &dashboard.rating_breakdown()));
        }
        StatsPanel::Unavailable { message } => out.push_str(&format!("! {message}\n")),
        StatsPanel::Loading => out.push_str("Loading stats...\n"),
    }
    out.push('\n');
    out.push_str(&render_reviews(dashboard));
    out
}

fn render_stats(snapshot: &StatsSnapshot, breakdown: &[RatingBucket]) -> String {
    let mut out = format!("Total Reviews: {}\n", snapshot.total_reviews);
    for bucket in breakdown {
        out.push_str(&format!(
            "  {:<8} {:>5}  {:>5.1}%\n",
            bucket.label(),
            bucket.count,
            bucket.percentage
        ));
    }
    out
}

fn render_reviews(dashboard: &DashboardController) -> String {
    let reviews = dashboard.visible_reviews();
    let mut out = format!(
        "All Submissions ({}) [{}]\n",
        reviews.len(),
        dashboard.filter().label()
    );
    if reviews.is_empty() {
        out.push_str("No reviews found\n");
        return out;
    }
    for review in reviews {
        out.push_str(&render_review(review));
    }
    out
}

fn render_review(review: &Review) -> String {
    let mut out = format!(
        "#{} {}/5  {}\n  {}\n",
        review.review_id,
        review.user_rating,
        display_date(&review.created_at),
        review.user_review
    );
    if let Some(summary) = review.ai_summary() {
        out.push_str(&format!("  AI Summary: {summary}\n"));
    }
    if let Some(actions) = review.recommended_actions() {
        out.push_str(&format!("  Recommended Actions: {actions}\n"));
    }
    out
}
