use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use models::errors::ModelError;
use service::errors::ServiceError;
use service::storage::StorageError;

/// API-facing error wrapper mapping domain failures to HTTP statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
            // Entity-level validation is still caller error, not a server fault
            ApiError::Service(ServiceError::Model(ModelError::Validation(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Service(ServiceError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Storage(StorageError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(error = %msg, "request failed");
        }
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_validation_maps_to_bad_request() {
        let err = models::user::validate_email("not-an-email").expect_err("invalid email");
        let api: ApiError = ServiceError::from(err).into();
        assert_eq!(api.into_response().status(), StatusCode::BAD_REQUEST);

        let err = models::user::validate_name("   ").expect_err("blank name");
        let api: ApiError = ServiceError::from(err).into();
        assert_eq!(api.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn entity_db_errors_stay_internal() {
        let api: ApiError = ServiceError::from(ModelError::Db("connection reset".into())).into();
        assert_eq!(api.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn service_statuses() {
        let api: ApiError = ServiceError::Conflict("taken".into()).into();
        assert_eq!(api.into_response().status(), StatusCode::CONFLICT);
        let api: ApiError = ServiceError::not_found("branch").into();
        assert_eq!(api.into_response().status(), StatusCode::NOT_FOUND);
        let api: ApiError = StorageError::InvalidUrl("x".into()).into();
        assert_eq!(api.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
