use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/dashboard/action", post(handlers::dispatch_action))
        .route("/dashboard/prev", post(handlers::prev_month))
        .route("/dashboard/next", post(handlers::next_month))
        .route("/dashboard/refresh", post(handlers::refresh))
        .route("/dashboard/job-type", post(handlers::select_job_type))
        .route("/dashboard/timesheet", post(handlers::select_timesheet))
        .route("/dashboard/sort", post(handlers::sort))
        .with_state(state)
}
