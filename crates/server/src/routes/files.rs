use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use service::errors::ServiceError;
use service::storage::FileStorage;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct FileUrlBody {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PresignQuery {
    pub url: String,
    #[serde(default)]
    pub ttl_secs: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PresignResponse {
    pub url: String,
}

#[utoipa::path(post, path = "/files", tag = "files", params(("filename" = String, Query, description = "Original file name")), responses((status = 200, description = "File stored", body = crate::openapi::UploadResponseDoc), (status = 400, description = "Empty body")))]
pub async fn upload(
    State(state): State<ServerState>,
    Query(q): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if body.is_empty() {
        return Err(ServiceError::Validation("file body is empty".into()).into());
    }
    let url = state.storage.upload(&body, &q.filename).await?;
    let key = state.storage.extract_key(&url)?;
    Ok(Json(UploadResponse { url, key }))
}

#[utoipa::path(delete, path = "/files", tag = "files", request_body = crate::openapi::FileUrlDoc, responses((status = 204, description = "File removed"), (status = 404, description = "No such file")))]
pub async fn remove(
    State(state): State<ServerState>,
    Json(body): Json<FileUrlBody>,
) -> Result<StatusCode, ApiError> {
    state.storage.delete(&body.url).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/files/presign", tag = "files", params(("url" = String, Query, description = "Public file URL"), ("ttl_secs" = Option<i64>, Query, description = "Signature lifetime in seconds")), responses((status = 200, description = "Signed URL", body = crate::openapi::PresignResponseDoc), (status = 400, description = "URL not issued by this storage")))]
pub async fn presign(
    State(state): State<ServerState>,
    Query(q): Query<PresignQuery>,
) -> Result<Json<PresignResponse>, ApiError> {
    let ttl = q.ttl_secs.unwrap_or(state.presign_ttl_secs);
    let url = state.storage.presigned_url(&q.url, ttl)?;
    Ok(Json(PresignResponse { url }))
}
