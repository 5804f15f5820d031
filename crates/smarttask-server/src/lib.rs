#![forbid(unsafe_code)]

//! HTTP backend for SmartTask: ownership-enforcing service layer, request
//! handlers, identity-resolution middleware, and the router wiring them up.

pub mod config;
pub mod http;
pub mod middleware;
pub mod service;

mod state;

pub use config::{validate_startup_config, ApiConfig};
pub use middleware::identity::Identity;
pub use service::{ServiceError, TaskService};
pub use state::{build_router, AppState};
