//! Domain layer - Listing entities and value objects.
//!
//! This crate contains the car listing model with no infrastructure dependencies.
//! Persistence concerns live in the service crate.

pub mod constants;
pub mod error;
pub mod password;
pub mod post;
pub mod price_history;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use post::{NewPost, Post};
pub use price_history::{NewPriceHistory, PriceHistory};
pub use user::{NewUser, User};
