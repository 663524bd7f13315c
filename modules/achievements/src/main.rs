use axum::{routing::get, Router};
use event_bus::{EventBus, InMemoryBus, NatsBus, SubscriptionSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use achievements_rs::{
    config::Config,
    consumer_tasks::start_answer_submitted_consumer,
    db::init_pool,
    health::health,
    routes::{get_user_achievements, list_achievements},
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting achievements service...");

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

    // Create event bus
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

    // Start the answer submitted consumer; the subscription set must outlive
    // the server, dropping it would stop the consumer loops
    let subscriptions = SubscriptionSet::new(bus.clone());
    start_answer_submitted_consumer(
        &subscriptions,
        bus.clone(),
        pool.clone(),
        config.service_id.clone(),
    )
    .await
    .expect("Failed to subscribe to answer.submitted");

    // Build the application router
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/achievements", get(list_achievements))
        .route("/api/achievements/user/{user_id}", get(get_user_achievements))
        .with_state(pool.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    // Bind to the configured address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Achievements service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    // Start the server
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
