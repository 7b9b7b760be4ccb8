//! Region renderers. Each takes the snapshot plus the view parameters it was
//! fetched for and returns an HTML fragment; nothing here touches shared state.

use crate::models::{
    DEFAULT_TIMESHEET, JobType, OffDays, ProjectRecord, RenderedRegions, StatisticsSnapshot,
};
use std::fmt::Write;

/// Customer bucket that only carries maintenance work.
pub const TBC_CUSTOMER: &str = "TBC";

const MISSING: &str = "--";

/// Which panel occupies the submission/off-days slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SidePanel {
    Submission { count: Option<u64> },
    OffDays(OffDays),
}

impl SidePanel {
    pub fn select(timesheet_file: &str, snapshot: &StatisticsSnapshot) -> Self {
        if timesheet_file == DEFAULT_TIMESHEET {
            SidePanel::Submission {
                count: snapshot.timesheet_count,
            }
        } else {
            SidePanel::OffDays(snapshot.off.clone().unwrap_or_default())
        }
    }
}

pub fn render_regions(
    snapshot: &StatisticsSnapshot,
    job_type: JobType,
    timesheet_file: &str,
) -> RenderedRegions {
    RenderedRegions {
        timesheet_options: render_timesheet_options(&snapshot.timesheet_files, timesheet_file),
        onsite_office: render_onsite_office(snapshot),
        submission_or_off_days: render_side_panel(&SidePanel::select(timesheet_file, snapshot)),
        role_percentages: render_role_percentages(snapshot),
        customer_job_type: job_type.as_str().to_string(),
        customer_types: render_customer_types(snapshot, job_type),
        projects: render_project_rows(&snapshot.monthly_projects),
    }
}

/// Option value for a timesheet display name. Only the first space is
/// replaced, matching how the API names its files.
pub fn timesheet_id(display_name: &str) -> String {
    display_name.replacen(' ', "_", 1)
}

pub fn render_timesheet_options(files: &[String], selected: &str) -> String {
    let mut html = String::from(r#"<option value="SSS_Team">SSS Team</option>"#);
    for file in files {
        let id = timesheet_id(file);
        let marker = if id == selected { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{}"{marker}>{}</option>"#,
            escape_html(&id),
            escape_html(file)
        );
    }
    html
}

pub fn render_onsite_office(snapshot: &StatisticsSnapshot) -> String {
    format!(
        "<p>Onsite: {}</p><p>Office: {}</p>",
        format_percent(snapshot.onsite_percentage),
        format_percent(snapshot.office_percentage)
    )
}

pub fn render_side_panel(panel: &SidePanel) -> String {
    match panel {
        SidePanel::Submission { count } => format!(
            r#"<h3>Timesheet Submission</h3><div id="timesheet-submission"><p>Number of people who have included their timesheet this month: {}</p></div>"#,
            count.map_or_else(|| MISSING.to_string(), |count| count.to_string())
        ),
        SidePanel::OffDays(off) => format!(
            r#"<h3>Off Days</h3><div id="off-days"><p>Annual Leave (AL): {}</p><p>Casual Leave (CL): {}</p><p>Sick Leave (SL): {}</p><p>Public Holiday: {}</p></div>"#,
            format_number(off.annual),
            format_number(off.casual),
            format_number(off.sick),
            format_number(off.public_holiday)
        ),
    }
}

pub fn render_role_percentages(snapshot: &StatisticsSnapshot) -> String {
    format!(
        "<p>PS: {}</p><p>MA: {}</p><p>Internal: {}</p><p>Pre-Sales: {}</p>",
        format_percent(snapshot.ps_percentage),
        format_percent(snapshot.ma_percentage),
        format_percent(snapshot.internal_percentage),
        format_percent(snapshot.presales_percentage)
    )
}

/// Customer names in display order for a job type. TBC only counts for MA.
pub fn visible_customers(snapshot: &StatisticsSnapshot, job_type: JobType) -> Vec<&str> {
    snapshot
        .customer_data
        .keys()
        .map(String::as_str)
        .filter(|customer| *customer != TBC_CUSTOMER || job_type == JobType::Ma)
        .collect()
}

pub fn render_customer_types(snapshot: &StatisticsSnapshot, job_type: JobType) -> String {
    let mut html = String::new();
    for customer in visible_customers(snapshot, job_type) {
        let value = snapshot
            .customer_data
            .get(customer)
            .and_then(|types| types.get(job_type.as_str()))
            .and_then(serde_json::Value::as_f64);
        let _ = write!(
            html,
            r#"<div class="customer-type-item"><p>{}: {}</p></div>"#,
            escape_html(customer),
            format_number(value)
        );
    }
    html
}

pub fn render_project_rows(projects: &[ProjectRecord]) -> String {
    let mut html = String::new();
    for project in projects {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            format_text(project.customer.as_deref()),
            format_text(project.name.as_deref()),
            format_text(project.so.as_deref()),
            format_number(project.frequency),
            format_percent(project.percentage)
        );
    }
    html
}

fn format_text(value: Option<&str>) -> String {
    value.map_or_else(|| MISSING.to_string(), escape_html)
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.2}%"),
        _ => MISSING.to_string(),
    }
}

/// Plain number as the page shows counts: `2`, `2.5`.
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => value.to_string(),
        _ => MISSING.to_string(),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
