use client_core::{dashboard::display_date, RatingBucket, RatingFilter, StatsPanel};
use eframe::egui;
use shared::protocol::{Review, StatsSnapshot};

use super::app::FeedbackApp;
use crate::controller::orchestration::manual_refresh;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);
const CARD_WIDTH: f32 = 120.0;

impl FeedbackApp {
    pub(super) fn show_admin_dashboard(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Admin Dashboard");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    let result = manual_refresh(&mut self.dashboard, &self.cmd_tx);
                    self.report(result);
                }
                if self.dashboard.is_loading() {
                    ui.spinner();
                }
            });
        });
        ui.small(
            egui::RichText::new(format!(
                "Refreshes every {}s",
                self.dashboard.interval().as_secs()
            ))
            .weak(),
        );
        ui.separator();

        if self.dashboard.is_loading() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
                ui.label("Loading dashboard...");
            });
            return;
        }

        if let Some(message) = self.dashboard.reviews_error() {
            ui.colored_label(ERROR_COLOR, message);
            ui.add_space(6.0);
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            self.show_stats(ui);
            ui.add_space(12.0);
            self.show_review_list(ui);
        });
    }

    fn show_stats(&self, ui: &mut egui::Ui) {
        match self.dashboard.stats_panel() {
            StatsPanel::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading stats...");
                });
            }
            StatsPanel::Unavailable { message } => {
                ui.colored_label(ERROR_COLOR, message);
            }
            StatsPanel::Ready { snapshot, error } => {
                if let Some(message) = error {
                    ui.colored_label(ERROR_COLOR, message);
                }
                ui.horizontal_wrapped(|ui| {
                    total_card(ui, snapshot);
                    for bucket in self.dashboard.rating_breakdown() {
                        bucket_card(ui, &bucket);
                    }
                });
            }
        }
    }

    fn show_review_list(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let visible = self.dashboard.visible_reviews().len();
            ui.heading(format!("All Submissions ({visible})"));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut filter = self.dashboard.filter();
                egui::ComboBox::from_id_salt("rating_filter")
                    .selected_text(filter.label())
                    .show_ui(ui, |ui| {
                        for option in RatingFilter::options() {
                            ui.selectable_value(&mut filter, option, option.label());
                        }
                    });
                if filter != self.dashboard.filter() {
                    self.dashboard.set_filter(filter);
                }
                ui.label("Filter by Rating:");
            });
        });
        ui.add_space(6.0);

        let reviews = self.dashboard.visible_reviews();
        if reviews.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(egui::RichText::new("No reviews found").weak());
            });
            return;
        }
        for review in reviews {
            review_card(ui, review);
            ui.add_space(6.0);
        }
    }
}

fn total_card(ui: &mut egui::Ui, snapshot: &StatsSnapshot) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(CARD_WIDTH);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(snapshot.total_reviews.to_string()).size(24.0).strong());
            ui.small("Total Reviews");
        });
    });
}

fn bucket_card(ui: &mut egui::Ui, bucket: &RatingBucket) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(CARD_WIDTH);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(bucket.count.to_string()).size(24.0).strong());
            ui.small(bucket.label());
            ui.small(egui::RichText::new(format!("{:.1}%", bucket.percentage)).weak());
        });
    });
}

fn review_card(ui: &mut egui::Ui, review: &Review) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(rating_badge(review))
                    .color(egui::Color32::from_rgb(250, 190, 40))
                    .strong(),
            );
            ui.small(format!("#{}", review.review_id));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(display_date(&review.created_at));
            });
        });
        ui.label(&review.user_review);

        if let Some(summary) = review.ai_summary() {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("AI Summary").strong());
            ui.label(summary);
        }
        if let Some(actions) = review.recommended_actions() {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Recommended Actions").strong());
            ui.label(actions);
        }
    });
}

fn rating_badge(review: &Review) -> String {
    let stars = usize::from(review.user_rating.value());
    format!("{}{} {}/5", "★".repeat(stars), "☆".repeat(5 - stars), stars)
}
