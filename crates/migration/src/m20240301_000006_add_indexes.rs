use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users: index on branch_id
        manager
            .create_index(
                Index::create()
                    .name("idx_user_branch")
                    .table(User::Table)
                    .col(User::BranchId)
                    .to_owned(),
            )
            .await?;

        // Students: index on branch_id and user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_student_branch")
                    .table(Student::Table)
                    .col(Student::BranchId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_student_user")
                    .table(Student::Table)
                    .col(Student::UserId)
                    .to_owned(),
            )
            .await?;

        // Class sections: composite unique (branch_id, name)
        manager
            .create_index(
                Index::create()
                    .name("uniq_class_section_branch_name")
                    .table(ClassSection::Table)
                    .col(ClassSection::BranchId)
                    .col(ClassSection::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_branch").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_student_branch").table(Student::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_student_user").table(Student::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_class_section_branch_name").table(ClassSection::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, BranchId }

#[derive(DeriveIden)]
enum Student { Table, BranchId, UserId }

#[derive(DeriveIden)]
enum ClassSection { Table, BranchId, Name }
