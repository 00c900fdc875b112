//! Create `student` table with FKs to `user` and `branch`.
//!
//! `student_code` is the human-facing identifier printed on credentials.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(uuid(Student::Id).primary_key())
                    .col(uuid(Student::UserId).not_null())
                    .col(uuid(Student::BranchId).not_null())
                    .col(string_len(Student::StudentCode, 32).unique_key().not_null())
                    .col(
                        ColumnDef::new(Student::Phone)
                            .string_len(32)
                            .null(),
                    )
                    .col(string_len(Student::Status, 32).not_null())
                    .col(uuid(Student::CreatedBy).not_null())
                    .col(timestamp_with_time_zone(Student::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_user")
                            .from(Student::Table, Student::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_branch")
                            .from(Student::Table, Student::BranchId)
                            .to(Branch::Table, Branch::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Student::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Student { Table, Id, UserId, BranchId, StudentCode, Phone, Status, CreatedBy, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Branch { Table, Id }
