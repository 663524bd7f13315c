use axum::{
    routing::{get, post},
    Router,
};
use event_bus::{EventBus, InMemoryBus, NatsBus};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use quiz_rs::{
    catalog::CatalogClient,
    config::Config,
    db::init_pool,
    events::publisher::EventPublisher,
    health::health,
    routes::{
        answers::record_answer,
        stats::{get_user_stats, get_wrong_questions},
        AppState,
    },
    saga::SagaCoordinator,
    stats_store::PgStatsStore,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting quiz service...");

    // Fail fast on a broken event-type/subject table
    event_bus::verify_subject_table().expect("Event subject table must be valid");

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration from environment");

    tracing::info!(
        "Configuration loaded: host={}, port={}, bus_type={}, service_id={}",
        config.host,
        config.port,
        config.bus_type,
        config.service_id
    );

    // Database connection
    tracing::info!("Connecting to database...");
    let pool = init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    sqlx::migrate!("./db/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Create event bus — the connection handle is acquired once here and
    // injected; nothing downstream re-acquires it
    let bus: Arc<dyn EventBus> = match config.bus_type.to_lowercase().as_str() {
        "inmemory" => {
            tracing::info!("Using InMemory event bus");
            Arc::new(InMemoryBus::new())
        }
        "nats" => {
            tracing::info!("Connecting to NATS at {}", config.nats_url);
            let nats = NatsBus::new();
            nats.connect(&config.nats_url)
                .await
                .expect("Failed to connect to NATS");
            Arc::new(nats)
        }
        _ => panic!(
            "Invalid BUS_TYPE: {}. Must be 'inmemory' or 'nats'",
            config.bus_type
        ),
    };

    // Wire up the saga coordinator
    let publisher = EventPublisher::new(bus.clone(), config.service_id.clone());
    let catalog = CatalogClient::new(config.question_catalog_url.clone(), config.catalog_timeout);
    let stats = Arc::new(PgStatsStore::new(pool.clone()));
    let saga = Arc::new(SagaCoordinator::new(stats, publisher, catalog));

    let state = AppState {
        pool: pool.clone(),
        saga,
    };

    // Build the application router
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/quiz/answers", post(record_answer))
        .route("/api/quiz/stats/{user_id}", get(get_user_stats))
        .route(
            "/api/quiz/stats/{user_id}/wrong-questions",
            get(get_wrong_questions),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    // Bind to the configured address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Quiz service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    // Start the server
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
