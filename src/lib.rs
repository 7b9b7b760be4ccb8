pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod render;
pub mod state;
pub mod ui;

pub use app::router;
pub use client::{HttpStatisticsSource, StatisticsSource};
pub use config::Settings;
pub use controller::{Action, DashboardController, ViewState};
pub use state::AppState;
