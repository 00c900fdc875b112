use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{branch, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class_section")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    /// Raw weekday indices as stored (JSON array); order is meaningful and
    /// values are not guaranteed to be in range.
    pub schedule_days: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Branch,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Branch => Entity::belongs_to(branch::Entity).from(Column::BranchId).to(branch::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode `schedule_days` into integer weekday indices, preserving order.
    /// Non-integer entries and values that do not fit an i32 are dropped;
    /// out-of-range weekday numbers are kept for the formatter to deal with.
    pub fn schedule_days(&self) -> Vec<i32> {
        match self.schedule_days.as_array() {
            Some(values) => values
                .iter()
                .filter_map(|v| v.as_i64().and_then(|n| i32::try_from(n).ok()))
                .collect(),
            None => Vec::new(),
        }
    }
}

pub async fn create(
    db: &DatabaseConnection,
    branch_id: Uuid,
    name: &str,
    schedule_days: &[i32],
) -> Result<Model, errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        branch_id: Set(branch_id),
        name: Set(name.to_string()),
        schedule_days: Set(serde_json::json!(schedule_days)),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
