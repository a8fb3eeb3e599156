//! Repository layer for data access.
//!
//! One repository per aggregate: users, posts (with their price history
//! and participants) and price history entries.

pub mod entities;
mod post_repository;
mod price_history_repository;
mod unit_of_work;
mod user_repository;

pub use post_repository::{PostRepository, PostStore, TxPostRepository};
pub use price_history_repository::{
    PriceHistoryRepository, PriceHistoryStore, TxPriceHistoryRepository,
};
pub use unit_of_work::{
    run_in_transaction, Persistence, TransactionContext, TxFuture, UnitOfWork,
};
pub use user_repository::{TxUserRepository, UserRepository, UserStore};
