//! Gatehouse server entry point: configuration, store selection, and the
//! axum serve loop.

use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatehouse_core::{
    AuthService,
    store::{
        CredentialStore, SessionStore,
        memory::{InMemoryCredentialStore, InMemorySessionStore},
        postgres::{PostgresCredentialStore, PostgresSessionStore},
    },
};
use gatehouse_server::{AppState, Config, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (credentials, sessions): (Arc<dyn CredentialStore>, Arc<dyn SessionStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("failed to connect to PostgreSQL")?;

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("failed to run database migrations")?;

                info!("using PostgreSQL-backed stores");
                (
                    Arc::new(PostgresCredentialStore::new(pool.clone())),
                    Arc::new(PostgresSessionStore::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL not set; identities and sessions are in-memory only");
                (
                    Arc::new(InMemoryCredentialStore::new()),
                    Arc::new(InMemorySessionStore::new()),
                )
            }
        };

    let auth = Arc::new(AuthService::new(credentials, sessions, config.session_ttl())?);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::list(
            config
                .cors_allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        ))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let bind_addr = config.bind_addr();
    let app = routes::create_router(AppState::new(auth, config))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("listening on {bind_addr}");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
