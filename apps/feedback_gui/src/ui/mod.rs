//! UI layer: app shell plus the user and admin views.

pub mod app;
mod admin_view;
mod user_view;

pub use app::{ActiveView, FeedbackApp};
