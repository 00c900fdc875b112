use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequestDoc { pub email: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct RefreshRequestDoc { pub refresh_token: String }

#[derive(utoipa::ToSchema)]
pub struct TokenPairDoc { pub access_token: String, pub refresh_token: String }

#[derive(utoipa::ToSchema)]
pub struct CreateStudentDoc {
    pub branch_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub class_section_id: Option<Uuid>,
}

#[derive(utoipa::ToSchema)]
pub struct StudentSummaryDoc {
    pub student_id: Uuid,
    pub user_id: Uuid,
    pub student_code: String,
    pub email: String,
    pub full_name: String,
    pub branch_id: Uuid,
    pub temp_password: String,
    pub schedule_display: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct UploadResponseDoc { pub url: String, pub key: String }

#[derive(utoipa::ToSchema)]
pub struct FileUrlDoc { pub url: String }

#[derive(utoipa::ToSchema)]
pub struct PresignResponseDoc { pub url: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::students::create,
        crate::routes::files::upload,
        crate::routes::files::remove,
        crate::routes::files::presign,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequestDoc,
            RefreshRequestDoc,
            TokenPairDoc,
            CreateStudentDoc,
            StudentSummaryDoc,
            UploadResponseDoc,
            FileUrlDoc,
            PresignResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "students"),
        (name = "files")
    )
)]
pub struct ApiDoc;
