//! Dashboard view-state controller.
//!
//! The controller owns the current view parameters, the last accepted
//! snapshot and the regions rendered from it. Actions either mutate the view
//! and refetch, or reorder the rendered project rows in place.

use crate::client::StatisticsSource;
use crate::errors::{ActionError, FetchError};
use crate::models::{
    DEFAULT_TIMESHEET, DashboardView, JobType, ProjectRecord, RenderedRegions, SortCriteria,
    StatisticsQuery, StatisticsSnapshot,
};
use crate::render::{render_project_rows, render_regions};
use icu_collator::{Collator, CollatorOptions};
use std::cmp::Ordering;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub year: i32,
    pub month: u32,
    pub job_type: JobType,
    pub timesheet_file: String,
}

impl ViewState {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
            job_type: JobType::default(),
            timesheet_file: DEFAULT_TIMESHEET.to_string(),
        }
    }

    pub fn prev_month(&mut self) {
        if self.month <= 1 {
            self.month = 12;
            self.year = self.year.saturating_sub(1);
        } else {
            self.month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.month >= 12 {
            self.month = 1;
            self.year = self.year.saturating_add(1);
        } else {
            self.month += 1;
        }
    }

    pub fn label(&self) -> String {
        format!("{} {:02}", self.year, self.month)
    }

    pub fn query(&self) -> StatisticsQuery {
        StatisticsQuery {
            year: self.year,
            month: self.month,
            job_type: self.job_type,
            timesheet_file: self.timesheet_file.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PrevMonth,
    NextMonth,
    Refresh,
    SelectTimesheet(String),
    SelectJobType(JobType),
    Sort(SortCriteria),
}

/// Event name to action binding.
pub fn action_for_event(event: &str, value: Option<&str>) -> Result<Action, ActionError> {
    let required = |action: &'static str, what: &'static str| {
        value.ok_or(ActionError::MissingValue { action, what })
    };
    match event {
        "prev_month" => Ok(Action::PrevMonth),
        "next_month" => Ok(Action::NextMonth),
        "refresh" => Ok(Action::Refresh),
        "select_timesheet" => {
            let name = required("select_timesheet", "timesheet")?.trim();
            if name.is_empty() {
                return Err(ActionError::EmptyTimesheet);
            }
            Ok(Action::SelectTimesheet(name.to_string()))
        }
        "select_job_type" => {
            let raw = required("select_job_type", "job type")?;
            JobType::parse(raw)
                .map(Action::SelectJobType)
                .ok_or_else(|| ActionError::UnsupportedJobType(raw.to_string()))
        }
        "sort" => {
            let raw = required("sort", "criteria")?;
            SortCriteria::parse(raw)
                .map(Action::Sort)
                .ok_or_else(|| ActionError::UnsupportedSort(raw.to_string()))
        }
        other => Err(ActionError::UnknownAction(other.to_string())),
    }
}

/// Reorders rows in place. The sort is stable so ties keep their order.
pub fn sort_projects(rows: &mut [ProjectRecord], criteria: SortCriteria) {
    match criteria {
        SortCriteria::Alpha => {
            let names = NameOrder::new();
            rows.sort_by(|a, b| names.compare(customer_name(a), customer_name(b)));
        }
        SortCriteria::Percentage => rows.sort_by(|a, b| {
            let a = a.percentage.unwrap_or(f64::NEG_INFINITY);
            let b = b.percentage.unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        }),
    }
}

fn customer_name(row: &ProjectRecord) -> &str {
    row.customer.as_deref().unwrap_or_default()
}

/// Root-locale collation for customer names: accents and case are secondary
/// to the base letters, and lowercase sorts ahead of uppercase on a tie.
struct NameOrder {
    collator: Option<Collator>,
}

impl NameOrder {
    fn new() -> Self {
        let collator = match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(err) => {
                debug!(error = %err, "root collator unavailable; comparing case-folded names");
                None
            }
        };
        Self { collator }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
        }
    }
}

#[derive(Debug, Default)]
struct Session {
    generation: u64,
    snapshot: Option<StatisticsSnapshot>,
    rows: Vec<ProjectRecord>,
    regions: Option<RenderedRegions>,
    status: Option<String>,
}

pub struct DashboardController<S> {
    source: S,
    inner: Mutex<(ViewState, Session)>,
}

impl<S: StatisticsSource> DashboardController<S> {
    pub fn new(source: S, view: ViewState) -> Self {
        Self {
            source,
            inner: Mutex::new((view, Session::default())),
        }
    }

    /// Applies an action and, unless it only reorders rows, refetches for the
    /// resulting view. Returns the view as it stands afterwards.
    pub async fn dispatch(&self, action: Action) -> DashboardView {
        let (generation, query) = {
            let mut guard = self.inner.lock().await;
            let (view, session) = &mut *guard;
            match action {
                Action::PrevMonth => view.prev_month(),
                Action::NextMonth => view.next_month(),
                Action::Refresh => {}
                Action::SelectTimesheet(name) => view.timesheet_file = name,
                Action::SelectJobType(job_type) => view.job_type = job_type,
                Action::Sort(criteria) => {
                    sort_rendered_rows(session, criteria);
                    return snapshot_view(view, session);
                }
            }
            session.generation += 1;
            (session.generation, view.query())
        };

        let result = self.source.fetch(&query).await;

        let mut guard = self.inner.lock().await;
        let (view, session) = &mut *guard;
        apply_fetch(session, generation, &query, result);
        snapshot_view(view, session)
    }

    pub async fn view(&self) -> DashboardView {
        let guard = self.inner.lock().await;
        snapshot_view(&guard.0, &guard.1)
    }
}

#[cfg(test)]
impl<S: StatisticsSource> DashboardController<S> {
    async fn view_state(&self) -> ViewState {
        self.inner.lock().await.0.clone()
    }

    async fn snapshot(&self) -> Option<StatisticsSnapshot> {
        self.inner.lock().await.1.snapshot.clone()
    }

    /// Project rows in their current presentation order.
    async fn project_rows(&self) -> Vec<ProjectRecord> {
        self.inner.lock().await.1.rows.clone()
    }
}

fn sort_rendered_rows(session: &mut Session, criteria: SortCriteria) {
    let Some(regions) = session.regions.as_mut() else {
        return;
    };
    sort_projects(&mut session.rows, criteria);
    regions.projects = render_project_rows(&session.rows);
}

fn apply_fetch(
    session: &mut Session,
    generation: u64,
    query: &StatisticsQuery,
    result: Result<StatisticsSnapshot, FetchError>,
) {
    if generation != session.generation {
        debug!(
            generation,
            latest = session.generation,
            year = query.year,
            month = query.month,
            "discarding superseded statistics response"
        );
        return;
    }

    match result {
        Ok(snapshot) => {
            info!(
                first_load = session.snapshot.is_none(),
                year = query.year,
                month = query.month,
                job_type = %query.job_type,
                timesheet_file = %query.timesheet_file,
                projects = snapshot.monthly_projects.len(),
                "statistics refreshed"
            );
            session.regions = Some(render_regions(
                &snapshot,
                query.job_type,
                &query.timesheet_file,
            ));
            session.rows = snapshot.monthly_projects.clone();
            session.snapshot = Some(snapshot);
            session.status = None;
        }
        Err(err) => {
            error!(
                error = %err,
                year = query.year,
                month = query.month,
                timesheet_file = %query.timesheet_file,
                "error fetching statistics"
            );
            session.status = Some(err.to_string());
        }
    }
}

fn snapshot_view(view: &ViewState, session: &Session) -> DashboardView {
    DashboardView {
        year: view.year,
        month: view.month,
        label: view.label(),
        job_type: view.job_type,
        timesheet_file: view.timesheet_file.clone(),
        status: session.status.clone(),
        regions: session.regions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    /// In-memory source that records queries and answers from a closure.
    struct FakeSource {
        queries: StdMutex<Vec<StatisticsQuery>>,
        respond: Box<dyn Fn(&StatisticsQuery) -> Result<StatisticsSnapshot, FetchError> + Send + Sync>,
    }

    impl FakeSource {
        fn new(
            respond: impl Fn(&StatisticsQuery) -> Result<StatisticsSnapshot, FetchError>
            + Send
            + Sync
            + 'static,
        ) -> Self {
            Self {
                queries: StdMutex::new(Vec::new()),
                respond: Box::new(respond),
            }
        }

        fn queries(&self) -> Vec<StatisticsQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatisticsSource for FakeSource {
        async fn fetch(&self, query: &StatisticsQuery) -> Result<StatisticsSnapshot, FetchError> {
            self.queries.lock().unwrap().push(query.clone());
            (self.respond)(query)
        }
    }

    #[async_trait]
    impl<T: StatisticsSource> StatisticsSource for Arc<T> {
        async fn fetch(&self, query: &StatisticsQuery) -> Result<StatisticsSnapshot, FetchError> {
            (**self).fetch(query).await
        }
    }

    fn sample_snapshot() -> StatisticsSnapshot {
        serde_json::from_value(json!({
            "timesheet_files": ["Leave Team"],
            "onsite_percentage": 62.5,
            "office_percentage": 37.5,
            "timesheet_count": 8,
            "off": { "AL": 2, "CL": 1, "SL": 0, "Public Holiday": 3 },
            "ps_percentage": 50.0,
            "ma_percentage": 25.0,
            "internal_percentage": 15.0,
            "presales_percentage": 10.0,
            "customer_data": { "THU": { "PS": 1, "MA": 2 }, "TBC": { "MA": 3 } },
            "monthly_projects": [
                { "customer": "Beta", "name": "B", "so": "SO-2", "frequency": 1, "percentage": 10 },
                { "customer": "Alpha", "name": "A", "so": "SO-1", "frequency": 9, "percentage": 90 }
            ]
        }))
        .unwrap()
    }

    fn project(customer: &str, percentage: f64) -> ProjectRecord {
        ProjectRecord {
            customer: Some(customer.into()),
            percentage: Some(percentage),
            ..ProjectRecord::default()
        }
    }

    fn customers(rows: &[ProjectRecord]) -> Vec<&str> {
        rows.iter().map(customer_name).collect()
    }

    #[test]
    fn prev_month_wraps_into_previous_year() {
        let mut view = ViewState::new(2024, 1);
        view.prev_month();
        assert_eq!((view.year, view.month), (2023, 12));
    }

    #[test]
    fn next_month_wraps_into_next_year() {
        let mut view = ViewState::new(2024, 12);
        view.next_month();
        assert_eq!((view.year, view.month), (2025, 1));
    }

    #[test]
    fn twelve_steps_return_to_start() {
        for month in 1..=12 {
            let mut view = ViewState::new(2024, month);
            for _ in 0..12 {
                view.prev_month();
                assert!((1..=12).contains(&view.month));
            }
            assert_eq!((view.year, view.month), (2024, month));
            for _ in 0..12 {
                view.next_month();
            }
            assert_eq!((view.year, view.month), (2024, month));
        }
    }

    #[test]
    fn year_is_unbounded_below_zero() {
        let mut view = ViewState::new(0, 1);
        view.prev_month();
        assert_eq!((view.year, view.month), (-1, 12));
    }

    #[test]
    fn label_pads_month() {
        assert_eq!(ViewState::new(2024, 3).label(), "2024 03");
        assert_eq!(ViewState::new(2024, 11).label(), "2024 11");
    }

    #[test]
    fn events_map_to_actions() {
        assert_eq!(action_for_event("prev_month", None), Ok(Action::PrevMonth));
        assert_eq!(action_for_event("next_month", None), Ok(Action::NextMonth));
        assert_eq!(
            action_for_event("select_job_type", Some("Pre-Sales")),
            Ok(Action::SelectJobType(JobType::PreSales))
        );
        assert_eq!(
            action_for_event("select_timesheet", Some("Leave_Team")),
            Ok(Action::SelectTimesheet("Leave_Team".into()))
        );
        assert_eq!(
            action_for_event("sort", Some("percentage")),
            Ok(Action::Sort(SortCriteria::Percentage))
        );
        assert_eq!(
            action_for_event("select_job_type", Some("Internal")),
            Err(ActionError::UnsupportedJobType("Internal".into()))
        );
        assert_eq!(
            action_for_event("select_job_type", None),
            Err(ActionError::MissingValue {
                action: "select_job_type",
                what: "job type"
            })
        );
        assert_eq!(
            action_for_event("select_timesheet", Some("  ")),
            Err(ActionError::EmptyTimesheet)
        );
        assert_eq!(
            action_for_event("sort", Some("date")),
            Err(ActionError::UnsupportedSort("date".into()))
        );
        assert_eq!(
            action_for_event("jump", None),
            Err(ActionError::UnknownAction("jump".into()))
        );
    }

    #[test]
    fn action_errors_read_as_messages() {
        let err = action_for_event("sort", None).unwrap_err();
        assert_eq!(err.to_string(), "sort requires a criteria value");
        let err = action_for_event("select_job_type", Some("Internal")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "job type must be one of PS, Pre-Sales, MA; got 'Internal'"
        );
    }

    #[test]
    fn alpha_sort_orders_customers() {
        let mut rows = vec![project("Beta", 10.0), project("Alpha", 90.0)];
        sort_projects(&mut rows, SortCriteria::Alpha);
        assert_eq!(customers(&rows), ["Alpha", "Beta"]);
    }

    #[test]
    fn alpha_sort_ignores_case() {
        let mut rows = vec![project("beta", 1.0), project("Alpha", 2.0), project("alpha", 3.0)];
        sort_projects(&mut rows, SortCriteria::Alpha);
        assert_eq!(customers(&rows), ["alpha", "Alpha", "beta"]);
    }

    #[test]
    fn alpha_sort_places_accented_names_by_base_letter() {
        let mut rows = vec![
            project("Zeta", 1.0),
            project("Émile", 2.0),
            project("Delta", 3.0),
            project("Eve", 4.0),
        ];
        sort_projects(&mut rows, SortCriteria::Alpha);
        assert_eq!(customers(&rows), ["Delta", "Émile", "Eve", "Zeta"]);
    }

    #[test]
    fn alpha_sort_puts_unnamed_rows_first() {
        let mut rows = vec![project("Beta", 1.0), ProjectRecord::default(), project("Alpha", 2.0)];
        sort_projects(&mut rows, SortCriteria::Alpha);
        assert_eq!(customers(&rows), ["", "Alpha", "Beta"]);
    }

    #[test]
    fn percentage_sort_is_descending() {
        let mut rows = vec![project("Beta", 10.0), project("Alpha", 90.0)];
        sort_projects(&mut rows, SortCriteria::Percentage);
        assert_eq!(customers(&rows), ["Alpha", "Beta"]);
    }

    #[test]
    fn sorts_are_idempotent_and_ordered() {
        let mut rows = vec![
            project("Gamma", 33.0),
            project("alpha", 5.0),
            project("Delta", 33.0),
            project("Beta", 61.5),
        ];

        sort_projects(&mut rows, SortCriteria::Alpha);
        let once = rows.clone();
        sort_projects(&mut rows, SortCriteria::Alpha);
        assert_eq!(rows, once);
        let names = NameOrder::new();
        assert!(rows.windows(2).all(|pair| {
            names.compare(customer_name(&pair[0]), customer_name(&pair[1])) != Ordering::Greater
        }));

        sort_projects(&mut rows, SortCriteria::Percentage);
        let once = rows.clone();
        sort_projects(&mut rows, SortCriteria::Percentage);
        assert_eq!(rows, once);
        assert!(rows.windows(2).all(|pair| pair[0].percentage >= pair[1].percentage));
    }

    #[tokio::test]
    async fn refresh_renders_all_regions() {
        let source = FakeSource::new(|_| Ok(sample_snapshot()));
        let controller = DashboardController::new(source, ViewState::new(2024, 3));

        let view = controller.dispatch(Action::Refresh).await;
        let regions = view.regions.expect("regions rendered");
        assert_eq!(view.label, "2024 03");
        assert!(regions.onsite_office.contains("Onsite: 62.50%"));
        assert!(regions.submission_or_off_days.contains("this month: 8"));
        assert!(regions.role_percentages.contains("Pre-Sales: 10.00%"));
        assert_eq!(regions.customer_job_type, "PS");
        assert!(!regions.customer_types.contains("TBC"));
        assert!(regions.timesheet_options.contains(r#"value="Leave_Team""#));
        assert!(regions.projects.find("Beta").unwrap() < regions.projects.find("Alpha").unwrap());
        assert!(view.status.is_none());
    }

    #[tokio::test]
    async fn state_changes_refetch_with_new_parameters() {
        let source = Arc::new(FakeSource::new(|_| Ok(sample_snapshot())));
        let controller = DashboardController::new(Arc::clone(&source), ViewState::new(2024, 1));

        controller.dispatch(Action::PrevMonth).await;
        controller.dispatch(Action::SelectJobType(JobType::Ma)).await;
        let view = controller
            .dispatch(Action::SelectTimesheet("Leave_Team".into()))
            .await;

        let queries = source.queries();
        assert_eq!(queries.len(), 3);
        assert_eq!((queries[0].year, queries[0].month), (2023, 12));
        assert_eq!(queries[1].job_type, JobType::Ma);
        assert_eq!(queries[2].timesheet_file, "Leave_Team");
        assert_eq!(queries[2].job_type, JobType::Ma);

        let regions = view.regions.unwrap();
        assert!(regions.submission_or_off_days.contains("Off Days"));
        assert!(regions.submission_or_off_days.contains("Public Holiday: 3"));
        assert!(!regions.submission_or_off_days.contains("Timesheet Submission"));
        assert!(regions.customer_types.contains("TBC: 3"));
        assert!(regions.timesheet_options.contains(r#"value="Leave_Team" selected"#));
    }

    #[tokio::test]
    async fn sort_reorders_rows_without_refetch() {
        let source = Arc::new(FakeSource::new(|_| Ok(sample_snapshot())));
        let controller = DashboardController::new(Arc::clone(&source), ViewState::new(2024, 3));
        controller.dispatch(Action::Refresh).await;

        let view = controller.dispatch(Action::Sort(SortCriteria::Alpha)).await;
        assert_eq!(source.queries().len(), 1);
        assert_eq!(customers(&controller.project_rows().await), ["Alpha", "Beta"]);
        let projects = view.regions.unwrap().projects;
        assert!(projects.find("Alpha").unwrap() < projects.find("Beta").unwrap());

        controller.dispatch(Action::Sort(SortCriteria::Percentage)).await;
        assert_eq!(customers(&controller.project_rows().await), ["Alpha", "Beta"]);

        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(customers(&snapshot.monthly_projects), ["Beta", "Alpha"]);
        assert_eq!(controller.view_state().await, ViewState::new(2024, 3));
    }

    #[tokio::test]
    async fn sort_before_first_render_is_noop() {
        let source = FakeSource::new(|_| Ok(sample_snapshot()));
        let controller = DashboardController::new(source, ViewState::new(2024, 3));
        let view = controller.dispatch(Action::Sort(SortCriteria::Alpha)).await;
        assert!(view.regions.is_none());
    }

    #[tokio::test]
    async fn refetch_resets_sorted_order() {
        let source = FakeSource::new(|_| Ok(sample_snapshot()));
        let controller = DashboardController::new(source, ViewState::new(2024, 3));
        controller.dispatch(Action::Refresh).await;
        controller.dispatch(Action::Sort(SortCriteria::Alpha)).await;

        controller.dispatch(Action::NextMonth).await;
        assert_eq!(customers(&controller.project_rows().await), ["Beta", "Alpha"]);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_rendered_regions() {
        let source = FakeSource::new(|query| {
            if query.month == 3 {
                Ok(sample_snapshot())
            } else {
                Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY))
            }
        });
        let controller = DashboardController::new(source, ViewState::new(2024, 3));
        let before = controller.dispatch(Action::Refresh).await.regions;

        let after = controller.dispatch(Action::NextMonth).await;
        assert_eq!(after.label, "2024 04");
        assert_eq!(after.regions, before);
        assert!(after.status.unwrap().contains("502"));

        let recovered = controller.dispatch(Action::PrevMonth).await;
        assert!(recovered.status.is_none());
    }

    /// Month 2 answers only after the gate opens, so the month 3 request
    /// issued later resolves first. With `fail_slow` the month 2 answer is an
    /// error.
    struct GatedSource {
        started: Arc<Notify>,
        gate: Arc<Notify>,
        fail_slow: bool,
    }

    #[async_trait]
    impl StatisticsSource for GatedSource {
        async fn fetch(&self, query: &StatisticsQuery) -> Result<StatisticsSnapshot, FetchError> {
            if query.month == 2 {
                self.started.notify_one();
                self.gate.notified().await;
                if self.fail_slow {
                    return Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY));
                }
            }
            Ok(StatisticsSnapshot {
                onsite_percentage: Some(f64::from(query.month)),
                ..StatisticsSnapshot::default()
            })
        }
    }

    #[tokio::test]
    async fn superseded_response_is_discarded() {
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let controller = Arc::new(DashboardController::new(
            GatedSource {
                started: Arc::clone(&started),
                gate: Arc::clone(&gate),
                fail_slow: false,
            },
            ViewState::new(2024, 1),
        ));

        let slow = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.dispatch(Action::NextMonth).await }
        });
        started.notified().await;

        let fast_view = controller.dispatch(Action::NextMonth).await;
        assert_eq!(fast_view.month, 3);
        gate.notify_one();

        let slow_view = slow.await.unwrap();
        assert_eq!(slow_view.label, "2024 03");

        let view = controller.view().await;
        assert_eq!(view.label, "2024 03");
        assert!(view.regions.unwrap().onsite_office.contains("Onsite: 3.00%"));
        assert_eq!(controller.snapshot().await.unwrap().onsite_percentage, Some(3.0));
    }

    #[tokio::test]
    async fn superseded_failure_leaves_newer_render_alone() {
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let controller = Arc::new(DashboardController::new(
            GatedSource {
                started: Arc::clone(&started),
                gate: Arc::clone(&gate),
                fail_slow: true,
            },
            ViewState::new(2024, 1),
        ));

        let slow = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.dispatch(Action::NextMonth).await }
        });
        started.notified().await;

        let fast_view = controller.dispatch(Action::NextMonth).await;
        assert!(fast_view.status.is_none());
        let fast_regions = fast_view.regions.expect("month 3 rendered");
        gate.notify_one();

        let slow_view = slow.await.unwrap();
        assert!(slow_view.status.is_none());

        let view = controller.view().await;
        assert_eq!(view.label, "2024 03");
        assert!(view.status.is_none());
        assert_eq!(view.regions, Some(fast_regions));
        assert_eq!(controller.snapshot().await.unwrap().onsite_percentage, Some(3.0));
    }
}
