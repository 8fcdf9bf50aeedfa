use std::{net::SocketAddr, sync::Arc};

use backend::{
    create_router,
    database::Database,
    matching::MatchService,
    provider::{OsrmClient, OsrmConfig},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database = Database::new().await.expect("connect to database");
    database.migrate().await.expect("run database migrations");

    let routing_url =
        std::env::var("ROUTING_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let provider = OsrmClient::new(OsrmConfig {
        base_url: routing_url.clone(),
        ..OsrmConfig::default()
    })
    .expect("build routing client");
    tracing::info!("using routing provider at {routing_url}");

    let threshold = std::env::var("MATCH_THRESHOLD")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0.0);
    tracing::info!("similarity threshold set to {threshold}");

    let store = Arc::new(database);
    let state = AppState {
        matcher: MatchService::new(Arc::clone(&store), threshold),
        store,
        provider: Arc::new(provider),
    };
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()
        .expect("valid socket address");
    tracing::info!("starting backend on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}
