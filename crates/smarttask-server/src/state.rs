use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use smarttask_store::TaskStore;

use crate::config::ApiConfig;
use crate::http::handlers;
use crate::middleware::identity::identity_middleware;
use crate::middleware::request_span::request_span_middleware;
use crate::service::TaskService;

#[derive(Clone)]
pub struct AppState {
    pub service: TaskService,
    pub api: Arc<ApiConfig>,
    pub request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_config(store, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(store: Arc<dyn TaskStore>, api: ApiConfig) -> Self {
        Self {
            service: TaskService::new(store),
            api: Arc::new(api),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Identity resolution guards every /api route; /health stays open.
    let api_routes = Router::new()
        .route(
            "/api/tasks",
            get(handlers::list_tasks_handler).post(handlers::create_task_handler),
        )
        .route(
            "/api/tasks/subtasks/:subtask_id",
            put(handlers::update_subtask_handler).delete(handlers::delete_subtask_handler),
        )
        .route(
            "/api/tasks/:task_id",
            get(handlers::get_task_handler)
                .put(handlers::update_task_handler)
                .delete(handlers::delete_task_handler),
        )
        .route(
            "/api/tasks/:task_id/subtasks",
            post(handlers::create_subtask_handler),
        )
        .layer(from_fn_with_state(state.clone(), identity_middleware));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(api_routes)
        .fallback(handlers::fallback_handler)
        .layer(from_fn_with_state(state.clone(), request_span_middleware))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
