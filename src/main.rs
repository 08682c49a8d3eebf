// Training Planner API v0.1
use axum::{routing::get, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use routes::suggestions::AppState;
use services::weather::OpenMeteoClient;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;

/// Training Planner API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Training Planner API",
        version = "0.1.0",
        description = "Weather-aware running training planner. Tracks progress against \
            a multi-week training plan and proposes when and what kind of run to do next \
            from a multi-day weather forecast, the week's distance targets, and \
            per-run-type weather tolerances.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Suggestions", description = "Weather-aware run proposals"),
        (name = "Plan", description = "Training plan and week targets"),
        (name = "Stats", description = "Progress statistics over the run log"),
    ),
    paths(
        routes::health::health_check,
        routes::suggestions::generate_suggestions,
        routes::plan::get_current_week,
        routes::stats::get_weekly_mileage,
        routes::stats::get_pace_progression,
        routes::stats::get_long_run_progression,
        routes::stats::get_completion_rate,
        routes::stats::get_summary,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            services::weather::ForecastDay,
            services::scoring::RunType,
            services::scheduler::RunSuggestion,
            services::plan::TrainingPhase,
            services::plan::TrainingWeekTarget,
            services::stats::WeeklyMileagePoint,
            services::stats::PaceProgressionPoint,
            services::stats::LongRunPoint,
            services::stats::PhaseCompletion,
            services::stats::CompletionRate,
            services::stats::StatsSummary,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "training_planner_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Set up database connection pool
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("DATABASE_URL must be a valid SQLite URL")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .connect_with(connect_options)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Seed the training plan from the environment, if configured
    if let Some(start_date) = config.plan_start_date {
        match db::queries::upsert_training_plan(&pool, start_date).await {
            Ok(()) => tracing::info!("Seeded training plan starting {}", start_date),
            Err(e) => tracing::error!("Failed to seed training plan: {}", e),
        }
    }

    // Create the forecast provider client
    let provider = Arc::new(OpenMeteoClient::new(
        &config.weather_base_url,
        config.latitude,
        config.longitude,
    ));

    // Build shared application state
    let app_state = AppState {
        pool: pool.clone(),
        provider,
        location_name: config.location_name.clone(),
        utc_offset_hours: config.utc_offset_hours,
    };

    // CORS — read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    // Build router
    // Planner routes share AppState; the health check uses the pool directly.
    let planner_routes = Router::new()
        .route(
            "/api/v1/suggestions",
            get(routes::suggestions::generate_suggestions),
        )
        .route(
            "/api/v1/plan/current-week",
            get(routes::plan::get_current_week),
        )
        .route(
            "/api/v1/stats/weekly-mileage",
            get(routes::stats::get_weekly_mileage),
        )
        .route(
            "/api/v1/stats/pace-progression",
            get(routes::stats::get_pace_progression),
        )
        .route(
            "/api/v1/stats/long-run-progression",
            get(routes::stats::get_long_run_progression),
        )
        .route(
            "/api/v1/stats/completion-rate",
            get(routes::stats::get_completion_rate),
        )
        .route("/api/v1/stats/summary", get(routes::stats::get_summary))
        .with_state(app_state);

    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(pool);

    let app = Router::new()
        .merge(health_routes)
        .merge(planner_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
