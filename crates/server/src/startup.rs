use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::email::{http::HttpEmailSender, EmailSender};
use service::storage::local::LocalFileStorage;

use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr(cfg: &configs::AppConfig) -> anyhow::Result<SocketAddr> {
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| cfg.server.host.clone());
    let port = env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(cfg.server.port);
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: load config, wire up the state, and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config file unavailable, falling back to environment");
            let mut cfg = configs::AppConfig::default();
            cfg.database.normalize_from_env();
            cfg.auth.normalize_from_env();
            cfg.email.normalize_from_env();
            cfg.storage.normalize_from_env();
            cfg
        }
    };

    common::env::ensure_env(&cfg.storage.root_dir, "data").await?;

    let db = if cfg.database.url.trim().is_empty() {
        models::db::connect().await?
    } else {
        models::db::connect_with_config(&cfg.database).await?
    };

    let jwt_secret = if cfg.auth.jwt_secret.trim().is_empty() {
        warn!("JWT_SECRET not set, using a development-only secret");
        "dev-secret-change-me".to_string()
    } else {
        cfg.auth.jwt_secret.clone()
    };

    let signing_key = if cfg.storage.signing_key.trim().is_empty() {
        warn!("storage signing key not set, reusing the JWT secret");
        jwt_secret.clone()
    } else {
        cfg.storage.signing_key.clone()
    };

    let mailer: Option<Arc<dyn EmailSender>> = if cfg.email.is_enabled() {
        Some(Arc::new(HttpEmailSender::new(
            &cfg.email.endpoint,
            &cfg.email.api_key,
            &cfg.email.from,
        )))
    } else {
        warn!("email endpoint not configured, outbound mail disabled");
        None
    };

    let storage = Arc::new(LocalFileStorage::new(
        cfg.storage.root_dir.as_str(),
        &cfg.storage.base_url,
        signing_key.as_bytes(),
    ));

    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig {
            jwt_secret,
            access_ttl_minutes: cfg.auth.access_ttl_minutes,
            refresh_ttl_days: cfg.auth.refresh_ttl_days,
        },
        mailer,
        storage,
        presign_ttl_secs: cfg.storage.presign_ttl_secs,
    };

    let app: Router = routes::build_router(state, build_cors());

    let addr = load_bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
