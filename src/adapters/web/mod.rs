//! Web dashboard adapter.
//!
//! Axum server with an htmx-enhanced HTML frontend: pages compose REST
//! calls to the platform, run the indicator/statistics engine over the
//! fetched data and render chart specs to inline SVG.

pub mod chart_svg;
mod error;
mod handlers;
mod templates;

pub use error::WebError;
pub use handlers::*;
pub use templates::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::domain::session::SessionManager;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::platform_port::PlatformPort;

pub struct AppState {
    pub market: Arc<dyn MarketDataPort + Send + Sync>,
    pub platform: Arc<dyn PlatformPort + Send + Sync>,
    pub sessions: Arc<SessionManager>,
    pub config: Arc<dyn ConfigPort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/fragments/monitoring", get(handlers::monitoring_fragment))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/experiments", get(handlers::experiments))
        .route("/experiments/{id}", get(handlers::experiment_detail))
        .route("/backtest", get(handlers::backtest_form))
        .route("/backtest/run", post(handlers::run_backtest))
        .route("/data", get(handlers::data_browser))
        .route("/models", get(handlers::models))
        .route("/models/{id}", get(handlers::model_detail))
        .route("/configs", get(handlers::configs))
        .route("/configs/validate", post(handlers::validate_config))
        .route("/factors", get(handlers::factors))
        .route("/risk", get(handlers::risk))
        .route("/admin", get(handlers::admin))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
