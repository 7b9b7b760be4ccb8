use crate::client::HttpStatisticsSource;
use crate::controller::{DashboardController, ViewState};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DashboardController<HttpStatisticsSource>>,
}

impl AppState {
    pub fn new(source: HttpStatisticsSource, view: ViewState) -> Self {
        Self {
            controller: Arc::new(DashboardController::new(source, view)),
        }
    }
}
