pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observability;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, ServerBuilder, SessionwardServer, build_app, build_state};
