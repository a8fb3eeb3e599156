//! Mock database helpers shared by the repository tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{DatabaseConnection, MockExecResult, Transaction};

use cars_service_lib::infra::Database;
use cars_service_lib::repository::entities::{post, price_history, user};
use common::DatabaseConfig;

pub fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn user_row(id: i32, login: &str, hash: &str) -> user::Model {
    user::Model {
        id,
        login: login.to_owned(),
        password: hash.to_owned(),
    }
}

pub fn post_row(id: i32, user_id: i32, description: &str) -> post::Model {
    post::Model {
        id,
        description: description.to_owned(),
        created: timestamp(0),
        auto_user_id: user_id,
    }
}

pub fn history_row(id: i32, post_id: i32, before: i32, after: i32) -> price_history::Model {
    price_history::Model {
        id,
        before,
        after,
        created: timestamp(i64::from(id)),
        auto_post_id: post_id,
    }
}

pub fn rows_affected(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

/// Transaction log of a mock connection; every store using it must be
/// dropped first.
pub fn transactions(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
    match Arc::try_unwrap(db) {
        Ok(db) => db.into_transaction_log(),
        Err(_) => panic!("mock connection is still shared"),
    }
}

/// Every statement the mock received, transaction markers included.
pub fn statements(db: Arc<DatabaseConnection>) -> Vec<String> {
    transactions(db)
        .iter()
        .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
        .collect()
}

/// Fresh in-memory SQLite store with every migration applied.
///
/// A single pooled connection keeps the in-memory database alive and shared.
pub async fn sqlite_store() -> Arc<DatabaseConnection> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_owned(),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };

    Database::connect(&config)
        .await
        .expect("in-memory store with migrations")
        .get_connection()
}

/// Index of the first statement starting with `prefix`.
pub fn position(log: &[String], prefix: &str) -> usize {
    log.iter()
        .position(|sql| sql.starts_with(prefix))
        .unwrap_or_else(|| panic!("no statement starting with {prefix:?} in {log:#?}"))
}
