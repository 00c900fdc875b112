pub mod branch;
pub mod class_section;
pub mod db;
pub mod errors;
pub mod student;
pub mod user;
pub mod user_credentials;

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::EntityTrait;

    use crate::{branch, class_section, student, user, user_credentials};

    #[tokio::test]
    async fn entity_crud_round_trip() {
        // Integration-style check against a live database; skipped when none is reachable.
        let db = match crate::db::connect().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return;
            }
        };
        if let Err(e) = migration::Migrator::up(&db, None).await {
            eprintln!("skip: migrate up failed: {}", e);
            return;
        }

        let bname = format!("branch_{}", uuid::Uuid::new_v4());
        let b = branch::create(&db, &bname).await.expect("create branch");

        let email = format!("u_{}@example.com", uuid::Uuid::new_v4());
        let u = user::create(&db, b.id, &email, "Nguyen Van A", "student").await.expect("create user");
        assert_eq!(u.role, "student");

        let cred = user_credentials::upsert_password(&db, u.id, "hash0".into(), "argon2")
            .await
            .expect("upsert creds");
        assert_eq!(cred.password_hash, "hash0");
        let cred2 = user_credentials::upsert_password(&db, u.id, "hash1".into(), "argon2")
            .await
            .expect("re-upsert creds");
        assert_eq!(cred2.password_hash, "hash1");

        let code = format!("HS24{:06}", 1);
        let s = student::create(&db, u.id, b.id, &code, None, u.id).await.expect("create student");
        assert_eq!(s.student_code, code);
        let found = student::find_by_code(&db, &code).await.expect("find by code");
        assert!(found.is_some());

        let cs = class_section::create(&db, b.id, "Toan 6A", &[1, 3, 5]).await.expect("create section");
        assert_eq!(cs.schedule_days(), vec![1, 3, 5]);

        user::soft_delete(&db, u.id).await.expect("soft delete");
        user::hard_delete(&db, u.id).await.expect("hard delete");
        let _ = branch::Entity::delete_by_id(b.id).exec(&db).await;
    }
}
