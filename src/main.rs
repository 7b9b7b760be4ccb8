use std::net::SocketAddr;
use timesheet_dashboard::{router, Action, AppState, HttpStatisticsSource, Settings, ViewState};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::from_env()?;
    let source = HttpStatisticsSource::new(&settings)?;
    info!(endpoint = %source.endpoint(), "using statistics API");

    let state = AppState::new(
        source,
        ViewState::new(settings.initial_year, settings.initial_month),
    );
    state.controller.dispatch(Action::Refresh).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
