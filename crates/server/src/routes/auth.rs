use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use service::auth::domain::{LoginInput, TokenPair};
use service::auth::errors::AuthError;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{decode_claims, AuthConfig, AuthService, TOKEN_TYPE_ACCESS};
use service::email::EmailSender;
use service::storage::local::LocalFileStorage;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub mailer: Option<Arc<dyn EmailSender>>,
    pub storage: Arc<LocalFileStorage>,
    pub presign_ttl_secs: i64,
}

/// Identity of the authenticated caller, injected by the bearer middleware.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub branch_id: Uuid,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: String,
}

fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    let repo = Arc::new(SeaOrmAuthRepository { db: state.db.clone() });
    AuthService::new(
        repo,
        AuthConfig {
            jwt_secret: state.auth.jwt_secret.clone(),
            access_ttl_minutes: state.auth.access_ttl_minutes,
            refresh_ttl_days: state.auth.refresh_ttl_days,
        },
    )
}

fn auth_error_response(e: AuthError) -> (StatusCode, String) {
    let status = match e {
        AuthError::Unauthorized | AuthError::TokenExpired | AuthError::TokenInvalid => {
            StatusCode::UNAUTHORIZED
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, format!("{} (code {})", e, e.code()))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequestDoc, responses((status = 200, description = "Token pair issued", body = crate::openapi::TokenPairDoc), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<TokenPair>, (StatusCode, String)> {
    let svc = auth_service(&state);
    let pair = svc.login(input).await.map_err(auth_error_response)?;
    Ok(Json(pair))
}

#[utoipa::path(post, path = "/auth/refresh", tag = "auth", request_body = crate::openapi::RefreshRequestDoc, responses((status = 200, description = "Token pair rotated", body = crate::openapi::TokenPairDoc), (status = 401, description = "Expired or invalid token")))]
pub async fn refresh(
    State(state): State<ServerState>,
    Json(input): Json<RefreshInput>,
) -> Result<Json<TokenPair>, (StatusCode, String)> {
    let svc = auth_service(&state);
    let pair = svc
        .refresh(&input.refresh_token)
        .await
        .map_err(auth_error_response)?;
    Ok(Json(pair))
}

/// Global middleware: outside the whitelist, every request needs
/// `Authorization: Bearer <access token>`. A missing token is 400,
/// an invalid or expired one is 401.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    // Whitelist: health, token issuance, Swagger docs, CORS preflight
    if path == "/health"
        || path == "/auth/login"
        || path == "/auth/refresh"
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || method == axum::http::Method::OPTIONS
    {
        return Ok(next.run(req).await);
    }

    let authz = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let Some(header) = authz else {
        tracing::warn!(path = %path, "missing Authorization header");
        return Err(StatusCode::BAD_REQUEST);
    };
    let Some(token) = header.strip_prefix("Bearer ") else {
        tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = match decode_claims(&state.auth.jwt_secret, token) {
        Ok(c) if c.typ == TOKEN_TYPE_ACCESS => c,
        Ok(_) => {
            tracing::warn!(path = %path, "refresh token presented where access token expected");
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let (Ok(user_id), Ok(branch_id)) = (claims.uid.parse(), claims.bid.parse()) else {
        tracing::warn!(path = %path, "token carries malformed ids");
        return Err(StatusCode::UNAUTHORIZED);
    };
    req.extensions_mut().insert(AuthContext {
        user_id,
        branch_id,
        role: claims.role,
    });
    Ok(next.run(req).await)
}
