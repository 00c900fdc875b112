use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::{branch, class_section, student, user, user_credentials};

use crate::auth::service::hash_password;
use crate::email::sender::EmailSender;
use crate::email::template::{dispatch_new_student_credentials, NewStudentCredentials};
use crate::errors::ServiceError;
use crate::schedule;

/// Enrollment request as received from the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub branch_id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub class_section_id: Option<Uuid>,
}

/// What the caller gets back after a successful enrollment.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedStudentSummary {
    pub student_id: Uuid,
    pub user_id: Uuid,
    pub student_code: String,
    pub email: String,
    pub full_name: String,
    pub branch_id: Uuid,
    pub temp_password: String,
    pub schedule_display: Option<String>,
}

fn db_err(e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

/// Student codes are `HS` + two-digit year + six random digits.
pub fn generate_student_code(year: i32) -> String {
    let serial: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("HS{:02}{:06}", year.rem_euclid(100), serial)
}

/// Random alphanumeric temp password handed to the student on first login.
pub fn generate_temp_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

async fn unique_student_code(db: &DatabaseConnection) -> Result<String, ServiceError> {
    use chrono::Datelike;
    let year = chrono::Utc::now().year();
    // Random serials collide rarely; a handful of retries is plenty
    for _ in 0..5 {
        let code = generate_student_code(year);
        if student::find_by_code(db, &code).await?.is_none() {
            return Ok(code);
        }
    }
    Err(ServiceError::Conflict("could not allocate a unique student code".into()))
}

/// Enroll a new student: account, credentials, student record, and the
/// credentials email (dispatched without blocking; failures only log).
///
/// Fails with `Validation` for malformed input, `Conflict` for an email that
/// is already registered, and `NotFound` for a missing branch or class
/// section. `acting_user_id` is recorded as the creator.
#[instrument(skip(db, mailer, req), fields(branch_id = %req.branch_id, email = %req.email))]
pub async fn create_student(
    db: &DatabaseConnection,
    mailer: Option<Arc<dyn EmailSender>>,
    req: CreateStudentRequest,
    acting_user_id: Uuid,
) -> Result<CreatedStudentSummary, ServiceError> {
    user::validate_name(&req.full_name)?;
    user::validate_email(&req.email)?;

    let branch = branch::Entity::find_by_id(req.branch_id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("branch"))?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(req.email.clone()))
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(db_err)?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!("email {} already registered", req.email)));
    }

    let section = match req.class_section_id {
        Some(id) => {
            let s = class_section::Entity::find_by_id(id)
                .one(db)
                .await
                .map_err(db_err)?
                .ok_or_else(|| ServiceError::not_found("class section"))?;
            if s.branch_id != req.branch_id {
                return Err(ServiceError::Validation("class section belongs to another branch".into()));
            }
            Some(s)
        }
        None => None,
    };

    let student_code = unique_student_code(db).await?;
    let temp_password = generate_temp_password(12);
    let password_hash = hash_password(&temp_password).map_err(|e| ServiceError::Hash(e.to_string()))?;

    // The account, credentials, and student rows land together or not at all;
    // a partial insert would leave an orphaned user blocking the email forever
    let txn = db.begin().await.map_err(db_err)?;
    let account = user::create(&txn, req.branch_id, &req.email, &req.full_name, "student").await?;
    user_credentials::upsert_password(&txn, account.id, password_hash, "argon2").await?;
    let record = student::create(&txn, account.id, req.branch_id, &student_code, req.phone.as_deref(), acting_user_id).await?;
    txn.commit().await.map_err(db_err)?;

    let schedule_display = section
        .as_ref()
        .map(|s| schedule::format_schedule(Some(&s.schedule_days())));

    if let Some(mailer) = mailer {
        // Enrollment never waits on mail; the task logs delivery failures
        let _completion = dispatch_new_student_credentials(
            mailer,
            NewStudentCredentials {
                to: req.email.clone(),
                student_name: req.full_name.clone(),
                student_code: student_code.clone(),
                email: req.email.clone(),
                temp_password: temp_password.clone(),
                branch_name: branch.name.clone(),
                schedule_display: schedule_display.clone(),
            },
        );
    } else {
        warn!(student_code = %student_code, "email disabled; credentials were not sent");
    }

    info!(
        student_id = %record.id,
        user_id = %account.id,
        student_code = %student_code,
        created_by = %acting_user_id,
        "student_enrolled"
    );

    Ok(CreatedStudentSummary {
        student_id: record.id,
        user_id: account.id,
        student_code,
        email: account.email,
        full_name: account.name,
        branch_id: record.branch_id,
        temp_password,
        schedule_display,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::sender::mock::RecordingEmailSender;
    use crate::test_support::get_db;

    #[test]
    fn student_code_shape() {
        let code = generate_student_code(2024);
        assert_eq!(code.len(), 10);
        assert!(code.starts_with("HS24"));
        assert!(code[2..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn temp_password_is_alphanumeric() {
        let pw = generate_temp_password(12);
        assert_eq!(pw.len(), 12);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
        // Vanishingly unlikely to repeat
        assert_ne!(pw, generate_temp_password(12));
    }

    #[tokio::test]
    async fn enrollment_flow() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: no database: {}", e);
                return Ok(());
            }
        };
        let mailer = Arc::new(RecordingEmailSender::default());

        let b = branch::create(&db, &format!("branch_{}", Uuid::new_v4())).await?;
        let section = class_section::create(&db, b.id, &format!("Lop_{}", Uuid::new_v4()), &[1, 3, 5]).await?;
        let actor = user::create(&db, b.id, &format!("admin_{}@example.com", Uuid::new_v4()), "Admin", "staff").await?;

        let email = format!("hv_{}@example.com", Uuid::new_v4());
        let req = CreateStudentRequest {
            branch_id: b.id,
            full_name: "Nguyen Van A".into(),
            email: email.clone(),
            phone: Some("0901234567".into()),
            class_section_id: Some(section.id),
        };
        let summary = create_student(&db, Some(mailer.clone()), req.clone(), actor.id).await?;
        assert_eq!(summary.email, email);
        assert!(summary.student_code.starts_with("HS"));
        assert_eq!(summary.schedule_display.as_deref(), Some("T2, T4, T6"));
        assert_eq!(summary.temp_password.len(), 12);

        // The credentials email goes out on a detached task
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, email);
        assert_eq!(sent[0].data.get("schedule").map(String::as_str), Some("T2, T4, T6"));

        // Same email again is a conflict
        let err = create_student(&db, None, req, actor.id).await.expect_err("duplicate");
        assert!(matches!(err, ServiceError::Conflict(_)));
        Ok(())
    }

    #[tokio::test]
    async fn failed_enrollment_leaves_no_orphaned_account() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: no database: {}", e);
                return Ok(());
            }
        };
        let b = branch::create(&db, &format!("branch_{}", Uuid::new_v4())).await?;
        let actor = user::create(&db, b.id, &format!("admin_{}@example.com", Uuid::new_v4()), "Admin", "staff").await?;

        // A phone longer than the column allows makes the final insert fail
        let email = format!("hv_{}@example.com", Uuid::new_v4());
        let req = CreateStudentRequest {
            branch_id: b.id,
            full_name: "Nguyen Van B".into(),
            email: email.clone(),
            phone: Some("0".repeat(100)),
            class_section_id: None,
        };
        let err = create_student(&db, None, req.clone(), actor.id).await.expect_err("student insert fails");
        assert!(matches!(err, ServiceError::Model(_) | ServiceError::Db(_)));

        // The rolled-back user row must not block enrolling the same email again
        let mut retry = req;
        retry.phone = Some("0901234567".into());
        let summary = create_student(&db, None, retry, actor.id).await?;
        assert_eq!(summary.email, email);
        Ok(())
    }

    #[tokio::test]
    async fn enrollment_rejects_unknown_branch() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: no database: {}", e);
                return Ok(());
            }
        };
        let req = CreateStudentRequest {
            branch_id: Uuid::new_v4(),
            full_name: "Nguyen Van A".into(),
            email: format!("hv_{}@example.com", Uuid::new_v4()),
            phone: None,
            class_section_id: None,
        };
        let err = create_student(&db, None, req, Uuid::new_v4()).await.expect_err("no branch");
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }
}
