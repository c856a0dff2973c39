use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionError, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    constraint, entity,
    error::{UserError, UserResult},
    models::User,
    repository::UserRepository,
};

/// PostgreSQL implementation of UserRepository
///
/// Owns an explicitly constructed connection handle. Each mutation runs in
/// a single transaction; write rejections from the unique email index are
/// translated by the constraint analyzer.
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let model = self
            .db
            .transaction::<_, entity::Model, UserError>(move |txn| {
                Box::pin(async move {
                    // Fast-path duplicate check. A concurrent writer can
                    // still insert between this read and the write below;
                    // the unique index decides, and its rejection maps to
                    // DuplicateEmail.
                    let existing = entity::Entity::find()
                        .filter(entity::Column::Email.eq(&user.email))
                        .one(txn)
                        .await
                        .map_err(|e| UserError::Storage(e.to_string()))?;
                    if existing.is_some() {
                        return Err(UserError::DuplicateEmail(user.email));
                    }

                    entity::ActiveModel::from(&user)
                        .insert(txn)
                        .await
                        .map_err(|e| constraint::map_write_error(e, &user.email))
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        tracing::info!(user_id = %model.id, email = %model.email, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| UserError::Storage(e.to_string()))?;

        Ok(model.map(|m| m.into()))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| UserError::Storage(e.to_string()))?;

        Ok(model.map(|m| m.into()))
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| UserError::Storage(e.to_string()))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let model = self
            .db
            .transaction::<_, entity::Model, UserError>(move |txn| {
                Box::pin(async move {
                    let existing = entity::Entity::find_by_id(user.id)
                        .one(txn)
                        .await
                        .map_err(|e| UserError::Storage(e.to_string()))?;
                    if existing.is_none() {
                        return Err(UserError::NotFound(user.id));
                    }

                    entity::ActiveModel::from(&user)
                        .update(txn)
                        .await
                        .map_err(|e| constraint::map_write_error(e, &user.email))
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        tracing::info!(user_id = %model.id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| UserError::Storage(e.to_string()))?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool> {
        let mut query = entity::Entity::find().filter(entity::Column::Email.eq(email));

        if let Some(id) = exclude {
            query = query.filter(entity::Column::Id.ne(id));
        }

        let exists = query
            .one(&self.db)
            .await
            .map_err(|e| UserError::Storage(e.to_string()))?
            .is_some();

        Ok(exists)
    }
}

fn flatten_transaction_error(err: TransactionError<UserError>) -> UserError {
    match err {
        TransactionError::Connection(db_err) => UserError::Storage(db_err.to_string()),
        TransactionError::Transaction(user_err) => user_err,
    }
}
