//! Create `class_section` table with FK to `branch`.
//!
//! `schedule_days` holds the raw weekday indices as a JSON array; rendering
//! to a display string happens in the service layer.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClassSection::Table)
                    .if_not_exists()
                    .col(uuid(ClassSection::Id).primary_key())
                    .col(uuid(ClassSection::BranchId).not_null())
                    .col(string_len(ClassSection::Name, 128).not_null())
                    .col(json(ClassSection::ScheduleDays).not_null())
                    .col(timestamp_with_time_zone(ClassSection::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_section_branch")
                            .from(ClassSection::Table, ClassSection::BranchId)
                            .to(Branch::Table, Branch::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ClassSection::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ClassSection { Table, Id, BranchId, Name, ScheduleDays, CreatedAt }

#[derive(DeriveIden)]
enum Branch { Table, Id }
