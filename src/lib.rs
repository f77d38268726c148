pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::domain::error::AppError;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::store::postgrest::PostgrestStore;
use crate::interfaces::http::{start_server, HttpState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn into_io(err: AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

pub async fn run() -> std::io::Result<()> {
    init_tracing();

    let config = AppConfig::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        into_io(e)
    })?;
    let credentials = config.credentials().map_err(|e| {
        error!(error = %e, "Backend credentials missing");
        into_io(e)
    })?;
    let store = PostgrestStore::new(&credentials).map_err(into_io)?;

    info!(
        backend = %credentials.url,
        table = %credentials.table,
        "Curriculum store configured"
    );

    let state = HttpState::new(Arc::new(store), &config);
    start_server(state, &config)?.await
}
