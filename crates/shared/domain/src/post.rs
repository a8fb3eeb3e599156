//! Sale post domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_DESCRIPTION_LENGTH;
use crate::error::{DomainError, DomainResult};
use crate::price_history::{NewPriceHistory, PriceHistory};

/// Car sale post.
///
/// The id is chosen by the caller. Price history entries are kept in
/// insertion order and are deleted together with the post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub description: String,
    pub created: DateTime<Utc>,
    pub user_id: i32,
    pub price_histories: Vec<PriceHistory>,
}

impl Post {
    /// Current asking price, taken from the newest history entry
    pub fn latest_price(&self) -> Option<i32> {
        self.price_histories.last().map(|entry| entry.after)
    }

    /// Replace the description after validating it
    pub fn change_description(&mut self, description: impl Into<String>) -> DomainResult<()> {
        let description = description.into();
        validate_description(&description)?;
        self.description = description;
        Ok(())
    }
}

impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Post {}

/// Post creation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub id: i32,
    pub description: String,
    pub created: DateTime<Utc>,
    pub user_id: i32,
    pub price_histories: Vec<NewPriceHistory>,
}

impl NewPost {
    /// Create a post dated now with no price history.
    pub fn new(id: i32, description: impl Into<String>, user_id: i32) -> DomainResult<Self> {
        let description = description.into();
        validate_description(&description)?;
        Ok(Self {
            id,
            description,
            created: Utc::now(),
            user_id,
            price_histories: Vec::new(),
        })
    }

    /// Append an initial price history entry.
    pub fn with_price(mut self, entry: NewPriceHistory) -> Self {
        self.price_histories.push(entry);
        self
    }
}

fn validate_description(description: &str) -> DomainResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(DomainError::validation(format!(
            "Description must be at most {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i32, before: i32, after: i32) -> PriceHistory {
        NewPriceHistory::new(before, after).into_price_history(id)
    }

    #[test]
    fn test_latest_price_uses_last_entry() {
        let post = Post {
            id: 1,
            description: "Sedan".into(),
            created: Utc::now(),
            user_id: 1,
            price_histories: vec![entry(1, 0, 500), entry(2, 500, 450)],
        };

        assert_eq!(post.latest_price(), Some(450));
    }

    #[test]
    fn test_latest_price_empty() {
        let post = Post {
            id: 1,
            description: "Sedan".into(),
            created: Utc::now(),
            user_id: 1,
            price_histories: vec![],
        };

        assert_eq!(post.latest_price(), None);
    }

    #[test]
    fn test_new_post_with_prices_keeps_order() {
        let post = NewPost::new(10, "Hatchback", 3)
            .unwrap()
            .with_price(NewPriceHistory::new(0, 100))
            .with_price(NewPriceHistory::new(100, 90));

        let afters: Vec<i32> = post.price_histories.iter().map(|p| p.after).collect();
        assert_eq!(afters, vec![100, 90]);
    }

    #[test]
    fn test_new_post_rejects_long_description() {
        let description = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(NewPost::new(1, description, 1).is_err());
    }
}
