use crate::controller::{action_for_event, Action};
use crate::errors::AppError;
use crate::models::{ActionRequest, DashboardView, JobTypeForm, SortForm, TimesheetForm};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.controller.view().await;
    Html(render_index(&view))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.controller.view().await)
}

pub async fn dispatch_action(
    State(state): State<AppState>,
    Json(payload): Json<ActionRequest>,
) -> Result<Json<DashboardView>, AppError> {
    let action = action_for_event(payload.action.trim(), payload.value.as_deref())?;
    Ok(Json(state.controller.dispatch(action).await))
}

pub async fn prev_month(State(state): State<AppState>) -> Redirect {
    state.controller.dispatch(Action::PrevMonth).await;
    Redirect::to("/")
}

pub async fn next_month(State(state): State<AppState>) -> Redirect {
    state.controller.dispatch(Action::NextMonth).await;
    Redirect::to("/")
}

pub async fn refresh(State(state): State<AppState>) -> Redirect {
    state.controller.dispatch(Action::Refresh).await;
    Redirect::to("/")
}

pub async fn select_job_type(
    State(state): State<AppState>,
    Form(form): Form<JobTypeForm>,
) -> Result<Redirect, AppError> {
    form_action(&state, "select_job_type", &form.job_type).await
}

pub async fn select_timesheet(
    State(state): State<AppState>,
    Form(form): Form<TimesheetForm>,
) -> Result<Redirect, AppError> {
    form_action(&state, "select_timesheet", &form.timesheet_file).await
}

pub async fn sort(
    State(state): State<AppState>,
    Form(form): Form<SortForm>,
) -> Result<Redirect, AppError> {
    form_action(&state, "sort", &form.criteria).await
}

async fn form_action(state: &AppState, event: &str, value: &str) -> Result<Redirect, AppError> {
    let action = action_for_event(event, Some(value))?;
    state.controller.dispatch(action).await;
    Ok(Redirect::to("/"))
}
