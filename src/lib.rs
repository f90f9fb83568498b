pub mod auth;
pub mod availability;
pub mod booking;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod pricing;
pub mod requests;
pub mod responses;
pub mod seed;
pub mod settings;
pub mod store;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use handlers::{
    bookings, coaches, courts, equipment, healthz_live, healthz_ready, pricing_rules, root,
};
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::openapi::ApiDoc;
use crate::settings::Settings;
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn Store>) -> Self {
        Self { settings, store }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let store: Arc<dyn Store> = match &settings.database_url {
        Some(url) => {
            info!("Using PostgreSQL store");
            Arc::new(PgStore::connect(url, settings.database_max_connections).await?)
        }
        None => {
            info!("No database configured, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    if settings.seed_demo_data {
        seed::seed_demo_data(store.as_ref()).await?;
    }

    let state = AppState::new(settings, store);
    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!(timezone = %state.settings.timezone, "Starting Court Booking API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/courts", get(courts::list_courts))
        .route("/courts/{id}", get(courts::get_court))
        .route(
            "/admin/courts",
            get(courts::list_all_courts).post(courts::create_court),
        )
        .route(
            "/admin/courts/{id}",
            patch(courts::update_court).delete(courts::delete_court),
        )
        .route("/coaches", get(coaches::list_coaches))
        .route("/coaches/{id}", get(coaches::get_coach))
        .route("/admin/coaches", post(coaches::create_coach))
        .route("/admin/coaches/{id}", patch(coaches::update_coach))
        .route("/equipment", get(equipment::list_equipment))
        .route("/equipment/{id}", get(equipment::get_equipment))
        .route("/admin/equipment", post(equipment::create_equipment))
        .route("/admin/equipment/{id}", patch(equipment::update_equipment))
        .route("/pricing-rules", get(pricing_rules::list_pricing_rules))
        .route("/pricing-rules/{id}", get(pricing_rules::get_pricing_rule))
        .route(
            "/admin/pricing-rules",
            post(pricing_rules::create_pricing_rule),
        )
        .route(
            "/admin/pricing-rules/{id}",
            patch(pricing_rules::update_pricing_rule).delete(pricing_rules::delete_pricing_rule),
        )
        .route("/pricing/estimate", post(handlers::pricing::estimate))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/user", get(bookings::user_bookings))
        .route("/bookings/admin", get(bookings::all_bookings))
        .route("/bookings/{id}/cancel", patch(bookings::cancel_booking))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer).layer(CorsLayer::permissive())
}
