use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::load_settings;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{ActiveView, FeedbackApp};

#[derive(Parser, Debug)]
#[command(about = "Customer feedback desktop client")]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_url: Option<String>,
    /// Open the admin dashboard instead of the review form.
    #[arg(long)]
    admin: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(url) = args.api_url.as_deref() {
        settings = settings.with_api_base_url(url)?;
    }
    tracing::info!(api_base_url = %settings.api_base_url, "starting feedback gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings.clone(), cmd_rx, ui_tx);

    let initial_view = if args.admin {
        ActiveView::Admin
    } else {
        ActiveView::User
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Customer Feedback")
            .with_inner_size([1024.0, 760.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Customer Feedback",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(FeedbackApp::new(
                cmd_tx,
                ui_rx,
                &settings,
                initial_view,
            )))
        }),
    )
    .map_err(|err| anyhow!("gui exited with error: {err}"))
}
