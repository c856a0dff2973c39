use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the users table
///
/// The email column carries a unique key; that index, not the
/// application-level pre-check, is what ultimately enforces uniqueness.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub age: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            age: model.age,
            created_at: model.created_at.into(),
        }
    }
}

impl From<&crate::models::User> for ActiveModel {
    fn from(user: &crate::models::User) -> Self {
        use sea_orm::ActiveValue::Set;

        ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            age: Set(user.age),
            created_at: Set(user.created_at.into()),
        }
    }
}
