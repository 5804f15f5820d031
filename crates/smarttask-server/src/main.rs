#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use smarttask_server::{build_router, validate_startup_config, ApiConfig, AppState};
use smarttask_store::{SqliteTaskStore, TaskStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("SMARTTASK_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => return,
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(_) => return,
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("SMARTTASK_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let db_path = env::var("SMARTTASK_DB").unwrap_or_else(|_| "smarttask.sqlite".to_string());

    let api = ApiConfig {
        max_body_bytes: env_usize("SMARTTASK_MAX_BODY_BYTES", 16 * 1024),
        identity_header: env::var("SMARTTASK_IDENTITY_HEADER")
            .unwrap_or_else(|_| "x-user-id".to_string()),
    };
    validate_startup_config(&api)?;

    let store: Arc<dyn TaskStore> = if db_path == ":memory:" {
        Arc::new(
            SqliteTaskStore::open_in_memory().map_err(|e| format!("open store failed: {e}"))?,
        )
    } else {
        let path = PathBuf::from(&db_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("create {} failed: {e}", parent.display()))?;
        }
        Arc::new(SqliteTaskStore::open(&path).map_err(|e| format!("open store failed: {e}"))?)
    };

    let state = AppState::with_config(store, api);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("smarttask-server listening on {bind_addr}, db at {db_path}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
