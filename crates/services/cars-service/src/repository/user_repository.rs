//! User repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    NotSet, QueryFilter, QueryOrder, QuerySelect, Set,
};

use common::{AppError, AppResult};
use domain::{NewUser, User};

use super::entities::participates::{self, Entity as ParticipatesEntity};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::unit_of_work::run_in_transaction;

/// User repository trait for dependency injection.
///
/// Lookups report a missing row as `Ok(None)`; mutations report it as
/// [`AppError::NotFound`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, the store assigns the id
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Overwrite login and password of the user with `user.id`
    async fn update(&self, user: &User) -> AppResult<()>;

    /// Delete a user and their post participations
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// All users, ascending by id
    async fn find_all_order_by_id(&self) -> AppResult<Vec<User>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Users whose login contains `key`, ascending by id.
    ///
    /// The key is not escaped: `%` and `_` in it match like SQL wildcards.
    async fn find_by_like_login(&self, key: &str) -> AppResult<Vec<User>>;

    /// Exact login lookup; more than one match is an integrity error
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;
}

/// Concrete implementation of UserRepository.
///
/// Each call opens its own transaction.
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxUserRepository::new(txn).create(user).await })
        })
        .await
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let user = user.clone();
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxUserRepository::new(txn).update(&user).await })
        })
        .await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxUserRepository::new(txn).delete(id).await })
        })
        .await
    }

    async fn find_all_order_by_id(&self) -> AppResult<Vec<User>> {
        run_in_transaction(&self.db, None, |txn| {
            Box::pin(async move { TxUserRepository::new(txn).find_all_order_by_id().await })
        })
        .await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxUserRepository::new(txn).find_by_id(id).await })
        })
        .await
    }

    async fn find_by_like_login(&self, key: &str) -> AppResult<Vec<User>> {
        let key = key.to_owned();
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxUserRepository::new(txn).find_by_like_login(&key).await })
        })
        .await
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let login = login.to_owned();
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxUserRepository::new(txn).find_by_login(&login).await })
        })
        .await
    }
}

/// Transaction-bound user repository.
///
/// Executes all operations within the borrowed transaction.
#[derive(Clone, Copy)]
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn create(&self, user: NewUser) -> AppResult<User> {
        let login = user.login.clone();
        let active_model = ActiveModel {
            id: NotSet,
            login: Set(user.login),
            password: Set(user.password.into_string()),
        };

        let model = active_model
            .insert(self.txn)
            .await
            .map_err(login_taken(login))?;

        tracing::debug!(user_id = model.id, "User created");
        Ok(User::from(model))
    }

    pub async fn update(&self, user: &User) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Login, Expr::value(user.login.clone()))
            .col_expr(
                user::Column::Password,
                Expr::value(user.password.as_str().to_owned()),
            )
            .filter(user::Column::Id.eq(user.id))
            .exec(self.txn)
            .await
            .map_err(login_taken(user.login.clone()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(user_id = user.id, "User updated");
        Ok(())
    }

    /// Posts owned by the user are kept, so a user who still owns posts
    /// fails with an integrity error and nothing is deleted.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        ParticipatesEntity::delete_many()
            .filter(participates::Column::UserId.eq(id))
            .exec(self.txn)
            .await?;

        let result = UserEntity::delete_by_id(id).exec(self.txn).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn find_all_order_by_id(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(self.txn)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(self.txn).await?;

        Ok(result.map(User::from))
    }

    pub async fn find_by_like_login(&self, key: &str) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::Login.contains(key))
            .order_by_asc(user::Column::Id)
            .all(self.txn)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        // Two rows are enough to tell a unique match from a duplicate
        let mut models = UserEntity::find()
            .filter(user::Column::Login.eq(login))
            .order_by_asc(user::Column::Id)
            .limit(2)
            .all(self.txn)
            .await?;

        match models.len() {
            0 | 1 => Ok(models.pop().map(User::from)),
            _ => {
                tracing::warn!(login = %login, "Multiple users share one login");
                Err(AppError::integrity(format!(
                    "more than one user has login '{}'",
                    login
                )))
            }
        }
    }
}

/// Turn a unique violation into a conflict naming the login.
fn login_taken(login: String) -> impl FnOnce(DbErr) -> AppError {
    move |err| match AppError::from(err) {
        AppError::Conflict(_) => AppError::conflict(format!("User with login '{}'", login)),
        other => other,
    }
}
