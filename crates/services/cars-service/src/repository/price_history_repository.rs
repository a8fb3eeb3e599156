//! Price history repository implementation.
//!
//! Entries have no lifecycle of their own: each one is created for an
//! existing post and goes away with it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set,
};

use common::{AppError, AppResult};
use domain::{NewPriceHistory, PriceHistory};

use super::entities::price_history::{self, ActiveModel, Entity as PriceHistoryEntity};
use super::unit_of_work::run_in_transaction;

/// Upper bound on post ids bound into one `IN (...)` list, well below the
/// bind parameter limits of Postgres and SQLite.
pub(crate) const POST_ID_BATCH_SIZE: usize = 1_000;

#[async_trait]
pub trait PriceHistoryRepository: Send + Sync {
    /// Append an entry to the post's history
    async fn create(&self, post_id: i32, entry: NewPriceHistory) -> AppResult<PriceHistory>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<PriceHistory>>;

    /// History of one post in insertion order
    async fn find_by_post(&self, post_id: i32) -> AppResult<Vec<PriceHistory>>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct PriceHistoryStore {
    db: Arc<DatabaseConnection>,
}

impl PriceHistoryStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PriceHistoryRepository for PriceHistoryStore {
    async fn create(&self, post_id: i32, entry: NewPriceHistory) -> AppResult<PriceHistory> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPriceHistoryRepository::new(txn).create(post_id, entry).await })
        })
        .await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<PriceHistory>> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPriceHistoryRepository::new(txn).find_by_id(id).await })
        })
        .await
    }

    async fn find_by_post(&self, post_id: i32) -> AppResult<Vec<PriceHistory>> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPriceHistoryRepository::new(txn).find_by_post(post_id).await })
        })
        .await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        run_in_transaction(&self.db, None, move |txn| {
            Box::pin(async move { TxPriceHistoryRepository::new(txn).delete(id).await })
        })
        .await
    }
}

/// Transaction-bound price history repository.
#[derive(Clone, Copy)]
pub struct TxPriceHistoryRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxPriceHistoryRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// An unknown post fails with an integrity error.
    pub async fn create(&self, post_id: i32, entry: NewPriceHistory) -> AppResult<PriceHistory> {
        let active_model = ActiveModel {
            id: NotSet,
            before: Set(entry.before),
            after: Set(entry.after),
            created: Set(entry.created),
            auto_post_id: Set(post_id),
        };

        let model = active_model.insert(self.txn).await?;

        tracing::debug!(post_id, price_history_id = model.id, "Price history added");
        Ok(PriceHistory::from(model))
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<PriceHistory>> {
        let result = PriceHistoryEntity::find_by_id(id).one(self.txn).await?;

        Ok(result.map(PriceHistory::from))
    }

    pub async fn find_by_post(&self, post_id: i32) -> AppResult<Vec<PriceHistory>> {
        let models = PriceHistoryEntity::find()
            .filter(price_history::Column::AutoPostId.eq(post_id))
            .order_by_asc(price_history::Column::Id)
            .all(self.txn)
            .await?;

        Ok(models.into_iter().map(PriceHistory::from).collect())
    }

    /// Histories of several posts keyed by post id, one query per
    /// [`POST_ID_BATCH_SIZE`] posts.
    pub(crate) async fn find_by_posts(
        &self,
        post_ids: &[i32],
    ) -> AppResult<HashMap<i32, Vec<PriceHistory>>> {
        let mut grouped: HashMap<i32, Vec<PriceHistory>> = HashMap::new();

        for batch in post_ids.chunks(POST_ID_BATCH_SIZE) {
            let models = PriceHistoryEntity::find()
                .filter(price_history::Column::AutoPostId.is_in(batch.iter().copied()))
                .order_by_asc(price_history::Column::Id)
                .all(self.txn)
                .await?;

            for model in models {
                grouped
                    .entry(model.auto_post_id)
                    .or_default()
                    .push(PriceHistory::from(model));
            }
        }

        Ok(grouped)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = PriceHistoryEntity::delete_by_id(id).exec(self.txn).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(price_history_id = id, "Price history deleted");
        Ok(())
    }

    /// Remove every entry of a post, returns the number of rows removed.
    pub(crate) async fn delete_by_post(&self, post_id: i32) -> AppResult<u64> {
        let result = PriceHistoryEntity::delete_many()
            .filter(price_history::Column::AutoPostId.eq(post_id))
            .exec(self.txn)
            .await?;

        Ok(result.rows_affected)
    }
}
