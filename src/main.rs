//! School Portal
//!
//! A backend-for-frontend for the school management platform: role menus,
//! dashboards, health-record editing and exam grading, backed by the school
//! REST backend and a SQLite session store.

mod api;
mod auth;
mod backend;
mod children;
mod config;
mod db;
mod errors;
mod grading;
mod health;
mod menu;
mod models;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backend::BackendClient;
use config::Config;
use db::SessionStore;
use grading::ExamTable;

/// Open grading tables keyed by exam id.
pub type ExamTables = RwLock<HashMap<String, ExamTable>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub backend: Arc<BackendClient>,
    pub tables: Arc<ExamTables>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting School Portal");
    tracing::info!("Session store: {:?}", config.db_path);
    tracing::info!("School backend: {}", config.backend_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No portal key configured (PORTAL_API_PSK). Authentication is disabled!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let store = Arc::new(SessionStore::new(pool));
    let backend = Arc::new(BackendClient::new(
        &config.backend_url,
        config.backend_timeout,
    )?);

    let state = AppState {
        store,
        backend,
        tables: Arc::new(RwLock::new(HashMap::new())),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        // Session
        .route("/session/login", post(api::login))
        .route(
            "/session",
            get(api::get_session)
                .put(api::adopt_session)
                .delete(api::logout),
        )
        // Navigation and dashboards
        .route("/menu", get(api::get_menu))
        .route("/dashboard", get(api::get_dashboard))
        .route("/parent/dashboard", get(api::get_parent_dashboard))
        .route("/children", get(api::list_children))
        .route("/children/selected", put(api::select_child))
        .route("/teachers", get(api::list_teachers))
        .route("/subjects", get(api::list_subjects))
        // Health records
        .route("/health-records", get(api::list_health_records))
        .route(
            "/health-records/form/{admission_number}",
            get(api::get_health_form).post(api::submit_health_form),
        )
        .route("/health-records/slots", post(api::edit_health_slots))
        .route(
            "/health-records/{id}",
            axum::routing::delete(api::delete_health_record),
        )
        // Exams
        .route("/exams", get(api::list_exams).post(api::create_exam))
        .route("/exams/{id}", axum::routing::delete(api::delete_exam))
        .route(
            "/exams/{id}/table",
            get(api::get_exam_table).post(api::open_exam_table),
        )
        .route(
            "/exams/{id}/table/{student_id}/submit",
            post(api::submit_exam_row),
        )
        .route(
            "/exams/{id}/table/{student_id}/{subject}",
            put(api::set_exam_mark),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
