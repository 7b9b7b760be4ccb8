//! Access to the remote statistics API.

use crate::config::Settings;
use crate::errors::{ConfigError, FetchError};
use crate::models::{StatisticsQuery, StatisticsSnapshot};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

/// Anything that can produce a statistics snapshot for a query.
#[async_trait]
pub trait StatisticsSource: Send + Sync {
    async fn fetch(&self, query: &StatisticsQuery) -> Result<StatisticsSnapshot, FetchError>;
}

#[derive(Clone)]
pub struct HttpStatisticsSource {
    client: Client,
    endpoint: Url,
}

impl HttpStatisticsSource {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(ConfigError::Client)?;
        let endpoint = settings
            .api_base_url
            .join("api/statistics")
            .map_err(|_| ConfigError::Invalid {
                name: "STATS_API_URL",
                value: settings.api_base_url.to_string(),
            })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl StatisticsSource for HttpStatisticsSource {
    async fn fetch(&self, query: &StatisticsQuery) -> Result<StatisticsSnapshot, FetchError> {
        debug!(
            year = query.year,
            month = query.month,
            job_type = %query.job_type,
            timesheet_file = %query.timesheet_file,
            "fetching statistics"
        );

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(query)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response.json().await.map_err(FetchError::Decode)
    }
}
