use client_core::SubmissionStatus;
use eframe::egui;
use shared::domain::{Rating, MAX_REVIEW_CHARS};

use super::app::FeedbackApp;
use crate::controller::orchestration::submit_review;

const STAR_COLOR: egui::Color32 = egui::Color32::from_rgb(250, 190, 40);
const SUCCESS_TIP: &str =
    "Your feedback helps us improve. Our team reviews every submission.";

impl FeedbackApp {
    pub(super) fn show_user_dashboard(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Share Your Experience");
                ui.label("We'd love to hear your feedback about our service");
            });
            ui.add_space(12.0);

            if self.submission.status() == SubmissionStatus::Succeeded {
                self.show_success_panel(ui);
            } else {
                self.show_review_form(ui);
            }
        });
    }

    fn show_review_form(&mut self, ui: &mut egui::Ui) {
        let interactive = self.submission.is_interactive();

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.label(egui::RichText::new("Rating").strong());
            ui.horizontal(|ui| {
                let selected = self.submission.rating();
                for value in Rating::MIN..=Rating::MAX {
                    let filled = value <= selected;
                    let star = egui::RichText::new(if filled { "★" } else { "☆" })
                        .size(28.0)
                        .color(if filled { STAR_COLOR } else { egui::Color32::GRAY });
                    let clicked = ui
                        .add_enabled(interactive, egui::Button::new(star).frame(false))
                        .on_hover_text(star_hint(value))
                        .clicked();
                    if clicked {
                        if let Err(err) = self.submission.set_rating(value) {
                            tracing::debug!("rating not applied: {err}");
                        }
                    }
                }
            });

            ui.add_space(8.0);
            ui.label(egui::RichText::new("Your Review").strong());
            let mut text = self.submission.review_text().to_string();
            let edited = ui
                .add_enabled(
                    interactive,
                    egui::TextEdit::multiline(&mut text)
                        .hint_text("Tell us about your experience...")
                        .desired_rows(6)
                        .desired_width(f32::INFINITY)
                        .char_limit(MAX_REVIEW_CHARS),
                )
                .changed();
            if edited {
                if let Err(err) = self.submission.set_review_text(text) {
                    tracing::debug!("review text not applied: {err}");
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                ui.small(character_counter(self.submission.char_count()));
            });

            if let Some(message) = self.submission.error_message() {
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), message);
            }

            ui.add_space(8.0);
            let label = if interactive {
                "Submit Review"
            } else {
                "Submitting..."
            };
            let button = egui::Button::new(egui::RichText::new(label).strong().size(16.0));
            if ui.add_enabled(self.submission.can_submit(), button).clicked() {
                let result = submit_review(&mut self.submission, &self.cmd_tx);
                self.report(result);
            }
        });
    }

    fn show_success_panel(&mut self, ui: &mut egui::Ui) {
        let response = self.submission.ai_response().unwrap_or_default().to_string();
        let mut reset = false;

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("✔")
                        .size(32.0)
                        .color(egui::Color32::from_rgb(67, 181, 129)),
                );
                ui.heading("Thank You for Your Feedback!");
            });
            ui.add_space(8.0);
            ui.label(egui::RichText::new("Our Response").strong());
            ui.label(response);
            ui.add_space(8.0);
            ui.small(egui::RichText::new(SUCCESS_TIP).weak());
            ui.add_space(8.0);
            reset = ui.button("Submit another review").clicked();
        });

        if reset {
            if let Err(err) = self.submission.reset() {
                tracing::debug!("reset ignored: {err}");
            }
        }
    }
}

fn star_hint(value: u8) -> String {
    if value == 1 {
        "1 star".to_string()
    } else {
        format!("{value} stars")
    }
}

fn character_counter(count: usize) -> String {
    format!("{count} / {MAX_REVIEW_CHARS}")
}
