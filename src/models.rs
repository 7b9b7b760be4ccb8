use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Timesheet source that aggregates every team member's sheet.
pub const DEFAULT_TIMESHEET: &str = "SSS_Team";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobType {
    #[default]
    #[serde(rename = "PS")]
    Ps,
    #[serde(rename = "Pre-Sales")]
    PreSales,
    #[serde(rename = "MA")]
    Ma,
}

impl JobType {
    pub const ALL: [JobType; 3] = [JobType::Ps, JobType::PreSales, JobType::Ma];

    pub fn as_str(self) -> &'static str {
        match self {
            JobType::Ps => "PS",
            JobType::PreSales => "Pre-Sales",
            JobType::Ma => "MA",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|job| job.as_str() == value)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriteria {
    Alpha,
    Percentage,
}

impl SortCriteria {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "alpha" => Some(SortCriteria::Alpha),
            "percentage" => Some(SortCriteria::Percentage),
            _ => None,
        }
    }
}

/// Query string sent to `GET /api/statistics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsQuery {
    pub year: i32,
    pub month: u32,
    pub job_type: JobType,
    pub timesheet_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffDays {
    #[serde(rename = "AL")]
    pub annual: Option<f64>,
    #[serde(rename = "CL")]
    pub casual: Option<f64>,
    #[serde(rename = "SL")]
    pub sick: Option<f64>,
    #[serde(rename = "Public Holiday")]
    pub public_holiday: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub customer: Option<String>,
    pub name: Option<String>,
    pub so: Option<String>,
    pub frequency: Option<f64>,
    pub percentage: Option<f64>,
}

/// One statistics payload for a (year, month, job type, timesheet) tuple.
///
/// Every field defaults when the API leaves it out so a partial payload still
/// renders; fields the dashboard never shows are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub timesheet_files: Vec<String>,
    pub onsite_percentage: Option<f64>,
    pub office_percentage: Option<f64>,
    pub timesheet_count: Option<u64>,
    pub off: Option<OffDays>,
    pub ps_percentage: Option<f64>,
    pub ma_percentage: Option<f64>,
    pub internal_percentage: Option<f64>,
    pub presales_percentage: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_data: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub monthly_projects: Vec<ProjectRecord>,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobTypeForm {
    pub job_type: String,
}

#[derive(Debug, Deserialize)]
pub struct TimesheetForm {
    pub timesheet_file: String,
}

#[derive(Debug, Deserialize)]
pub struct SortForm {
    pub criteria: String,
}

/// HTML fragments for each display region, produced by one successful render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedRegions {
    pub timesheet_options: String,
    pub onsite_office: String,
    pub submission_or_off_days: String,
    pub role_percentages: String,
    pub customer_job_type: String,
    pub customer_types: String,
    pub projects: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub job_type: JobType,
    pub timesheet_file: String,
    pub status: Option<String>,
    pub regions: Option<RenderedRegions>,
}
