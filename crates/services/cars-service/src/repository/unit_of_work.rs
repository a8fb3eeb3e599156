//! Unit of Work and scoped transactions.
//!
//! Every repository call runs inside [`run_in_transaction`]: the transaction
//! is committed when the work succeeds and rolled back when it fails, and the
//! failure is always handed back to the caller. Callers that need several
//! operations to be atomic use [`UnitOfWork::transaction`] and the
//! transaction-bound repositories of [`TransactionContext`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};

use common::{AppError, AppResult};

use super::post_repository::{PostRepository, PostStore, TxPostRepository};
use super::price_history_repository::{
    PriceHistoryRepository, PriceHistoryStore, TxPriceHistoryRepository,
};
use super::user_repository::{TxUserRepository, UserRepository, UserStore};

/// Future produced by a unit of work closure, borrowing the transaction.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Run `f` inside a new transaction.
///
/// Commits on `Ok`, rolls back on `Err` and returns the original error.
/// A failed rollback is logged; the connection is released either way since
/// an uncommitted transaction rolls back when dropped.
pub async fn run_in_transaction<F, T>(
    db: &DatabaseConnection,
    isolation: Option<IsolationLevel>,
    f: F,
) -> AppResult<T>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
    T: Send,
{
    let txn = db
        .begin_with_config(isolation, None)
        .await
        .map_err(AppError::from)?;

    match f(&txn).await {
        Ok(result) => {
            txn.commit().await.map_err(AppError::from)?;
            Ok(result)
        }
        Err(e) => {
            tracing::debug!(error = %e, code = e.code(), "Rolling back transaction");
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Unit of Work trait for dependency injection.
///
/// Note: not object safe because of the generic transaction methods.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get post repository
    fn posts(&self) -> Arc<dyn PostRepository>;

    /// Get price history repository
    fn price_histories(&self) -> Arc<dyn PriceHistoryRepository>;

    /// Execute a closure within a ReadCommitted transaction.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;

    /// Execute a closure within a serializable transaction.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
#[derive(Clone, Copy)]
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'a> {
        TxUserRepository::new(self.txn)
    }

    pub fn posts(&self) -> TxPostRepository<'a> {
        TxPostRepository::new(self.txn)
    }

    pub fn price_histories(&self) -> TxPriceHistoryRepository<'a> {
        TxPriceHistoryRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    users: Arc<UserStore>,
    posts: Arc<PostStore>,
    price_histories: Arc<PriceHistoryStore>,
}

impl Persistence {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            users: Arc::new(UserStore::new(Arc::clone(&db))),
            posts: Arc::new(PostStore::new(Arc::clone(&db))),
            price_histories: Arc::new(PriceHistoryStore::new(Arc::clone(&db))),
            db,
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        run_in_transaction(&self.db, Some(isolation), move |txn| {
            f(TransactionContext::new(txn))
        })
        .await
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn posts(&self) -> Arc<dyn PostRepository> {
        self.posts.clone()
    }

    fn price_histories(&self) -> Arc<dyn PriceHistoryRepository> {
        self.price_histories.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f)
            .await
    }
}

/// Simpler API for executing transactional operations.
///
/// ```ignore
/// let post = with_transaction!(uow, |ctx| {
///     let user = ctx.users().create(new_user).await?;
///     ctx.posts().create(new_post_for(user.id)).await
/// })?;
/// ```
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
