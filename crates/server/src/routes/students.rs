use axum::{extract::State, Extension, Json};

use service::student_service::{self, CreateStudentRequest, CreatedStudentSummary};

use crate::errors::ApiError;
use crate::routes::auth::{AuthContext, ServerState};

#[utoipa::path(post, path = "/students", tag = "students", request_body = crate::openapi::CreateStudentDoc, responses((status = 200, description = "Student enrolled", body = crate::openapi::StudentSummaryDoc), (status = 400, description = "Bad Request"), (status = 404, description = "Unknown branch or class section"), (status = 409, description = "Email already registered")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<Json<CreatedStudentSummary>, ApiError> {
    let summary =
        student_service::create_student(&state.db, state.mailer.clone(), req, ctx.user_id).await?;
    Ok(Json(summary))
}
