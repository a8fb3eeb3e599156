//! Post repository implementation.
//!
//! A post is loaded together with its price history. Deleting a post
//! removes its history and participation rows first, in the same
//! transaction, so the restrictive foreign keys never fire.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use common::{AppError, AppResult};
use domain::{NewPost, Post};

use super::entities::participates::{self, Entity as ParticipatesEntity};
use super::entities::post::{self, ActiveModel, Entity as PostEntity};
use super::price_history_repository::TxPriceHistoryRepository;
use super::unit_of_work::run_in_transaction;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post with its initial price history
    async fn create(&self, post: NewPost) -> AppResult<Post>;

    /// Overwrite description and owner of the post with `post.id`.
    /// The price history is left as is.
    async fn update(&self, post: &Post) -> AppResult<()>;

    /// Delete a post with its price history and participations
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// All posts, ascending by id
    async fn find_all_order_by_id(&self) -> AppResult<Vec<Post>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Post>>;

    /// Posts owned by a user
    async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<Post>>;

    async fn add_participant(&self, post_id: i32, user_id: i32) -> AppResult<()>;

    async fn remove_participant(&self, post_id: i32, user_id: i32) -> AppResult<()>;

    /// Posts a user takes part in
    async fn find_by_participant(&self, user_id: i32) -> AppResult<Vec<Post>>;
}

pub struct PostStore {
    db: Arc<DatabaseConnection>,
}

impl PostStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PostStore {
    async fn create(&self, post: NewPost) -> AppResult<Post> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPostRepository::new(txn).create(post).await })
        })
        .await
    }

    async fn update(&self, post: &Post) -> AppResult<()> {
        let post = post.clone();
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPostRepository::new(txn).update(&post).await })
        })
        .await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPostRepository::new(txn).delete(id).await })
        })
        .await
    }

    async fn find_all_order_by_id(&self) -> AppResult<Vec<Post>> {
        run_in_transaction(&self.db, None, |txn| {
            Box::pin(async move { TxPostRepository::new(txn).find_all_order_by_id().await })
        })
        .await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Post>> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPostRepository::new(txn).find_by_id(id).await })
        })
        .await
    }

    async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<Post>> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPostRepository::new(txn).find_by_user(user_id).await })
        })
        .await
    }

    async fn add_participant(&self, post_id: i32, user_id: i32) -> AppResult<()> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move {
                TxPostRepository::new(txn)
                    .add_participant(post_id, user_id)
                    .await
            })
        })
        .await
    }

    async fn remove_participant(&self, post_id: i32, user_id: i32) -> AppResult<()> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move {
                TxPostRepository::new(txn)
                    .remove_participant(post_id, user_id)
                    .await
            })
        })
        .await
    }

    async fn find_by_participant(&self, user_id: i32) -> AppResult<Vec<Post>> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPostRepository::new(txn).find_by_participant(user_id).await })
        })
        .await
    }
}

/// Transaction-bound post repository.
#[derive(Clone, Copy)]
pub struct TxPostRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxPostRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    fn histories(&self) -> TxPriceHistoryRepository<'a> {
        TxPriceHistoryRepository::new(self.txn)
    }

    /// A taken id is a conflict, an unknown owner an integrity error.
    pub async fn create(&self, post: NewPost) -> AppResult<Post> {
        let post_id = post.id;
        let active_model = ActiveModel {
            id: Set(post.id),
            description: Set(post.description),
            created: Set(post.created),
            auto_user_id: Set(post.user_id),
        };

        let model = active_model
            .insert(self.txn)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::conflict(format!("Post with id {}", post_id)),
                other => other,
            })?;

        let mut price_histories = Vec::with_capacity(post.price_histories.len());
        for entry in post.price_histories {
            price_histories.push(self.histories().create(model.id, entry).await?);
        }

        tracing::debug!(post_id, entries = price_histories.len(), "Post created");
        Ok(model.into_domain(price_histories))
    }

    pub async fn update(&self, post: &Post) -> AppResult<()> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Description, Expr::value(post.description.clone()))
            .col_expr(post::Column::AutoUserId, Expr::value(post.user_id))
            .filter(post::Column::Id.eq(post.id))
            .exec(self.txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(post_id = post.id, "Post updated");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let removed_entries = self.histories().delete_by_post(id).await?;

        ParticipatesEntity::delete_many()
            .filter(participates::Column::PostId.eq(id))
            .exec(self.txn)
            .await?;

        let result = PostEntity::delete_by_id(id).exec(self.txn).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(post_id = id, removed_entries, "Post deleted");
        Ok(())
    }

    pub async fn find_all_order_by_id(&self) -> AppResult<Vec<Post>> {
        let models = PostEntity::find()
            .order_by_asc(post::Column::Id)
            .all(self.txn)
            .await?;

        self.with_histories(models).await
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Post>> {
        let Some(model) = PostEntity::find_by_id(id).one(self.txn).await? else {
            return Ok(None);
        };

        let price_histories = self.histories().find_by_post(model.id).await?;
        Ok(Some(model.into_domain(price_histories)))
    }

    pub async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<Post>> {
        let models = PostEntity::find()
            .filter(post::Column::AutoUserId.eq(user_id))
            .order_by_asc(post::Column::Id)
            .all(self.txn)
            .await?;

        self.with_histories(models).await
    }

    /// Linking twice is a conflict, an unknown user or post an integrity error.
    pub async fn add_participant(&self, post_id: i32, user_id: i32) -> AppResult<()> {
        let link = participates::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
        };

        ParticipatesEntity::insert(link)
            .exec_without_returning(self.txn)
            .await
            .map_err(|e: DbErr| match AppError::from(e) {
                AppError::Conflict(_) => AppError::conflict(format!(
                    "Participation of user {} in post {}",
                    user_id, post_id
                )),
                other => other,
            })?;

        tracing::debug!(post_id, user_id, "Participant added");
        Ok(())
    }

    pub async fn remove_participant(&self, post_id: i32, user_id: i32) -> AppResult<()> {
        let result = ParticipatesEntity::delete_many()
            .filter(participates::Column::PostId.eq(post_id))
            .filter(participates::Column::UserId.eq(user_id))
            .exec(self.txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(post_id, user_id, "Participant removed");
        Ok(())
    }

    pub async fn find_by_participant(&self, user_id: i32) -> AppResult<Vec<Post>> {
        let models = PostEntity::find()
            .inner_join(ParticipatesEntity)
            .filter(participates::Column::UserId.eq(user_id))
            .order_by_asc(post::Column::Id)
            .all(self.txn)
            .await?;

        self.with_histories(models).await
    }

    async fn with_histories(&self, models: Vec<post::Model>) -> AppResult<Vec<Post>> {
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut histories = self.histories().find_by_posts(&ids).await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let entries = histories.remove(&model.id).unwrap_or_default();
                model.into_domain(entries)
            })
            .collect())
    }
}
