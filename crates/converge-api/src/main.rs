use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use converge_api::{
    config::Config,
    handlers::stream,
    middleware::logging,
    routes::{conversations, health, nodes},
    state::AppState,
};
use converge_engine::Orchestrator;
use converge_graph::GraphStore;
use converge_llm::{CompletionClient, OpenRouterClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting ConVerge API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Completion engine client
    let mut openrouter = OpenRouterClient::new(config.openrouter_api_key.clone())?;
    if let Some(base_url) = &config.llm.base_url {
        openrouter = openrouter.with_base_url(base_url.clone());
    }
    let client: Arc<dyn CompletionClient> = Arc::new(openrouter);

    // In-memory graph store; data is lost on restart.
    let store = Arc::new(GraphStore::new());
    let orchestrator = Orchestrator::new(Arc::clone(&store), client);

    let state = Arc::new(AppState::new(config.clone(), store, orchestrator));

    let app = build_router(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Conversations
        .route("/api/conversations", post(conversations::create_conversation))
        .route("/api/conversations", get(conversations::list_conversations))
        .route(
            "/api/conversations/:conversation_id",
            get(conversations::get_conversation),
        )
        .route(
            "/api/conversations/:conversation_id",
            delete(conversations::delete_conversation),
        )
        .route(
            "/api/conversations/:conversation_id/graph",
            get(conversations::get_conversation_graph),
        )
        .route(
            "/api/conversations/:conversation_id/select",
            post(conversations::select_node),
        )
        .route(
            "/api/conversations/:conversation_id/stream",
            get(stream::conversation_stream),
        )
        // Nodes
        .route("/api/nodes/:node_id", get(nodes::get_node))
        .route("/api/nodes/:node_id", delete(nodes::delete_node))
        .route("/api/nodes/:node_id/ancestors", get(nodes::get_ancestors))
        .route("/api/nodes/:node_id/children", get(nodes::get_children));

    Router::new()
        .merge(api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(300))) // 5 min for streaming
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            for origin in &config.cors.origins {
                if let Ok(parsed_origin) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed_origin);
                }
            }
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
