//! Price history entries attached to a post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One price change of a post.
///
/// Entries are owned by exactly one post and compare by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistory {
    pub id: i32,
    pub before: i32,
    pub after: i32,
    pub created: DateTime<Utc>,
}

impl PriceHistory {
    /// Signed price change of this entry
    pub fn delta(&self) -> i64 {
        i64::from(self.after) - i64::from(self.before)
    }
}

impl PartialEq for PriceHistory {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PriceHistory {}

/// Price history creation data, the id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPriceHistory {
    pub before: i32,
    pub after: i32,
    pub created: DateTime<Utc>,
}

impl NewPriceHistory {
    /// Record a price change happening now.
    pub fn new(before: i32, after: i32) -> Self {
        Self {
            before,
            after,
            created: Utc::now(),
        }
    }

    pub fn into_price_history(self, id: i32) -> PriceHistory {
        PriceHistory {
            id,
            before: self.before,
            after: self.after,
            created: self.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta() {
        let entry = NewPriceHistory::new(1_000_000, 950_000).into_price_history(1);
        assert_eq!(entry.delta(), -50_000);
    }

    #[test]
    fn test_delta_does_not_overflow() {
        let entry = NewPriceHistory::new(i32::MIN, i32::MAX).into_price_history(1);
        assert_eq!(entry.delta(), i64::from(i32::MAX) - i64::from(i32::MIN));
    }

    #[test]
    fn test_equality_by_id() {
        let a = NewPriceHistory::new(1, 2).into_price_history(5);
        let b = NewPriceHistory::new(3, 4).into_price_history(5);
        assert_eq!(a, b);
    }
}
