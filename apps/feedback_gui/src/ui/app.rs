use std::time::{Duration, Instant};

use client_core::{ClientSettings, DashboardController, SubmissionController};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{ApiHealth, UiError, UiEvent};
use crate::controller::orchestration::{dispatch_backend_command, refresh_dashboard};

const IDLE_REPAINT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    User,
    Admin,
}

pub struct FeedbackApp {
    pub(super) cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    pub(super) submission: SubmissionController,
    pub(super) dashboard: DashboardController,
    active_view: ActiveView,
    api_health: ApiHealth,
    pub(super) banner: Option<UiError>,
    status: String,
}

impl FeedbackApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &ClientSettings,
        initial_view: ActiveView,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            submission: SubmissionController::new(),
            dashboard: DashboardController::new(settings.dashboard_refresh_interval()),
            active_view: ActiveView::User,
            api_health: ApiHealth::Unknown,
            banner: None,
            status: format!("Backend: {}", settings.api_base_url),
        };
        app.report(dispatch_backend_command(&app.cmd_tx, BackendCommand::CheckHealth));
        app.set_active_view(initial_view, Instant::now());
        app
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    /// Leaving the admin view cancels its refresh schedule; entering it
    /// starts one and refreshes immediately. Leaving the user view discards
    /// the draft; a late outcome for it is dropped by `complete`.
    pub fn set_active_view(&mut self, view: ActiveView, now: Instant) {
        let previous = std::mem::replace(&mut self.active_view, view);
        if previous == ActiveView::User && view != ActiveView::User {
            self.submission = SubmissionController::new();
        }
        match view {
            ActiveView::Admin => {
                if let Some(request) = self.dashboard.activate(now) {
                    let result = refresh_dashboard(request, &self.cmd_tx);
                    self.report(result);
                }
            }
            ActiveView::User => {
                self.dashboard.deactivate();
            }
        }
    }

    /// Fires the dashboard timer when due.
    pub fn tick(&mut self, now: Instant) {
        if let Some(request) = self.dashboard.poll_schedule(now) {
            let result = refresh_dashboard(request, &self.cmd_tx);
            self.report(result);
        }
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        category = ?err.category(),
                        context = ?err.context(),
                        "{}",
                        err.message()
                    );
                    self.banner = Some(err);
                }
                UiEvent::Submission(outcome) => {
                    self.submission.complete(outcome);
                }
                UiEvent::Dashboard(update) => {
                    self.dashboard.apply(update);
                }
                UiEvent::Health(result) => {
                    self.api_health = ApiHealth::from_result(&result);
                }
            }
        }
    }

    pub(super) fn report(&mut self, result: Result<(), UiError>) {
        if let Err(err) = result {
            tracing::warn!(
                category = ?err.category(),
                context = ?err.context(),
                "{}",
                err.message()
            );
            self.banner = Some(err);
        }
    }

    fn show_nav_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("app_nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut selected = self.active_view;
                ui.selectable_value(&mut selected, ActiveView::User, "User Dashboard");
                ui.selectable_value(&mut selected, ActiveView::Admin, "Admin Dashboard");
                if selected != self.active_view {
                    self.set_active_view(selected, Instant::now());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let color = match &self.api_health {
                        ApiHealth::Online => egui::Color32::from_rgb(67, 181, 129),
                        ApiHealth::Unreachable(_) => egui::Color32::from_rgb(220, 80, 80),
                        ApiHealth::Unknown => egui::Color32::GRAY,
                    };
                    let response =
                        ui.label(egui::RichText::new(self.api_health.label()).color(color));
                    if let ApiHealth::Unreachable(detail) = &self.api_health {
                        response.on_hover_text(detail.as_str());
                    }
                    ui.small(egui::RichText::new(&self.status).weak());
                });
            });
        });
    }

    fn show_banner(&mut self, ctx: &egui::Context) {
        let Some(banner) = &self.banner else {
            return;
        };
        let message = banner.message().to_string();
        let mut dismissed = false;
        egui::TopBottomPanel::top("error_banner").show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(150, 40, 40))
                .inner_margin(egui::Margin::same(6))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&message).color(egui::Color32::WHITE));
                        if ui.small_button("Dismiss").clicked() {
                            dismissed = true;
                        }
                    });
                });
        });
        if dismissed {
            self.banner = None;
        }
    }
}

impl eframe::App for FeedbackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        let now = Instant::now();
        self.tick(now);

        self.show_nav_bar(ctx);
        self.show_banner(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.active_view {
            ActiveView::User => self.show_user_dashboard(ui),
            ActiveView::Admin => self.show_admin_dashboard(ui),
        });

        let next_refresh = self
            .dashboard
            .time_until_next_refresh(now)
            .unwrap_or(IDLE_REPAINT);
        ctx.request_repaint_after(next_refresh.min(IDLE_REPAINT));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{DashboardUpdate, GatewayError, SubmissionStatus};
    use crossbeam_channel::bounded;
    use shared::{
        domain::{Rating, ReviewId},
        protocol::{CreateReviewResponse, Review},
    };

    fn app_with_channels(
        initial: ActiveView,
    ) -> (FeedbackApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (cmd_tx, cmd_rx) = bounded(16);
        let (ui_tx, ui_rx) = bounded(16);
        let app = FeedbackApp::new(cmd_tx, ui_rx, &ClientSettings::default(), initial);
        (app, cmd_rx, ui_tx)
    }

    fn drain(cmd_rx: &Receiver<BackendCommand>) -> Vec<&'static str> {
        cmd_rx.try_iter().map(|cmd| cmd.name()).collect()
    }

    #[test]
    fn startup_on_user_view_only_probes_health() {
        let (app, cmd_rx, _ui_tx) = app_with_channels(ActiveView::User);
        assert_eq!(drain(&cmd_rx), vec!["check_health"]);
        assert!(!app.dashboard.is_active());
    }

    #[test]
    fn opening_admin_view_refreshes_and_leaving_cancels_timer() {
        let (mut app, cmd_rx, _ui_tx) = app_with_channels(ActiveView::User);
        let _ = drain(&cmd_rx);
        let start = Instant::now();

        app.set_active_view(ActiveView::Admin, start);
        assert_eq!(app.active_view(), ActiveView::Admin);
        assert_eq!(drain(&cmd_rx), vec!["refresh_dashboard"]);

        app.tick(start + Duration::from_secs(10));
        assert_eq!(drain(&cmd_rx), vec!["refresh_dashboard"]);

        app.set_active_view(ActiveView::User, start + Duration::from_secs(11));
        app.tick(start + Duration::from_secs(60));
        assert!(drain(&cmd_rx).is_empty());
    }

    #[test]
    fn reselecting_admin_view_does_not_stack_timers() {
        let (mut app, cmd_rx, _ui_tx) = app_with_channels(ActiveView::Admin);
        let start = Instant::now();
        app.set_active_view(ActiveView::Admin, start);
        assert_eq!(drain(&cmd_rx), vec!["check_health", "refresh_dashboard"]);
    }

    #[test]
    fn backend_events_reach_the_controllers() {
        let (mut app, _cmd_rx, ui_tx) = app_with_channels(ActiveView::Admin);
        app.submission.set_rating(5).expect("rating");
        app.submission.set_review_text("Great").expect("text");
        let _request = app.submission.submit().expect("valid");

        ui_tx
            .send(UiEvent::Submission(Ok(CreateReviewResponse {
                review_id: ReviewId(10),
                user_rating: None,
                user_review: None,
                ai_response: "Thanks!".to_string(),
                created_at: None,
            })))
            .expect("send");
        ui_tx
            .send(UiEvent::Dashboard(DashboardUpdate::Reviews(Ok(vec![Review {
                review_id: ReviewId(10),
                user_rating: Rating::new(5).expect("rating"),
                user_review: "Great".to_string(),
                ai_summary: None,
                recommended_actions: None,
                created_at: String::new(),
            }]))))
            .expect("send");
        ui_tx
            .send(UiEvent::Dashboard(DashboardUpdate::Stats(Err(
                GatewayError::network("down"),
            ))))
            .expect("send");

        app.process_ui_events();

        assert_eq!(app.submission.status(), SubmissionStatus::Succeeded);
        assert_eq!(app.submission.ai_response(), Some("Thanks!"));
        assert_eq!(app.dashboard.visible_reviews().len(), 1);
        assert!(app.dashboard.stats_error().is_some());
        assert!(!app.dashboard.is_loading());
    }

    #[test]
    fn leaving_user_view_discards_the_draft() {
        let (mut app, _cmd_rx, _ui_tx) = app_with_channels(ActiveView::User);
        let start = Instant::now();
        app.submission.set_rating(4).expect("rating");
        app.submission.set_review_text("half-written").expect("text");

        app.set_active_view(ActiveView::User, start);
        assert_eq!(app.submission.rating(), 4);

        app.set_active_view(ActiveView::Admin, start);
        app.set_active_view(ActiveView::User, start);

        assert_eq!(app.submission.rating(), 0);
        assert_eq!(app.submission.review_text(), "");
        assert_eq!(app.submission.status(), SubmissionStatus::Editing);
    }

    #[test]
    fn outcome_for_abandoned_submission_is_ignored() {
        let (mut app, cmd_rx, ui_tx) = app_with_channels(ActiveView::User);
        let start = Instant::now();
        app.submission.set_rating(5).expect("rating");
        app.submission.set_review_text("Great").expect("text");
        crate::controller::orchestration::submit_review(&mut app.submission, &app.cmd_tx)
            .expect("queued");
        assert!(drain(&cmd_rx).contains(&"submit_review"));

        app.set_active_view(ActiveView::Admin, start);
        app.set_active_view(ActiveView::User, start);
        ui_tx
            .send(UiEvent::Submission(Ok(CreateReviewResponse {
                review_id: ReviewId(11),
                user_rating: None,
                user_review: None,
                ai_response: "Thanks!".to_string(),
                created_at: None,
            })))
            .expect("send");
        app.process_ui_events();

        assert_eq!(app.submission.status(), SubmissionStatus::Editing);
        assert_eq!(app.submission.ai_response(), None);
    }

    #[test]
    fn startup_errors_become_banner() {
        let (mut app, _cmd_rx, ui_tx) = app_with_channels(ActiveView::User);
        ui_tx
            .send(UiEvent::Error(UiError::from_message(
                crate::controller::events::UiErrorContext::BackendStartup,
                "backend worker startup failure",
            )))
            .expect("send");
        app.process_ui_events();
        assert!(app.banner.is_some());
    }
}
