use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ActionError> for AppError {
    fn from(err: ActionError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure to obtain a statistics snapshot. None of these touch rendered state.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("statistics request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("statistics API returned {0}")]
    Status(reqwest::StatusCode),
    #[error("statistics payload could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} value '{value}'")]
    Invalid { name: &'static str, value: String },
    #[error("DASHBOARD_MONTH must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A UI event that cannot be turned into a dashboard action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("{action} requires a {what} value")]
    MissingValue {
        action: &'static str,
        what: &'static str,
    },
    #[error("timesheet value must not be empty")]
    EmptyTimesheet,
    #[error("job type must be one of PS, Pre-Sales, MA; got '{0}'")]
    UnsupportedJobType(String),
    #[error("sort criteria must be 'alpha' or 'percentage'; got '{0}'")]
    UnsupportedSort(String),
}
