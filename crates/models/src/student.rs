use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{branch, errors, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub branch_id: Uuid,
    pub student_code: String,
    pub phone: Option<String>,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Branch,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::Branch => Entity::belongs_to(branch::Entity).from(Column::BranchId).to(branch::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    branch_id: Uuid,
    student_code: &str,
    phone: Option<&str>,
    created_by: Uuid,
) -> Result<Model, errors::ModelError> {
    if student_code.trim().is_empty() {
        return Err(errors::ModelError::Validation("student code required".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        branch_id: Set(branch_id),
        student_code: Set(student_code.to_string()),
        phone: Set(phone.map(|p| p.to_string())),
        status: Set("enrolled".into()),
        created_by: Set(created_by),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_code(db: &DatabaseConnection, student_code: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::StudentCode.eq(student_code))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
