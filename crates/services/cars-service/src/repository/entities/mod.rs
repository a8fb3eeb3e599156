//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod participates;
pub mod post;
pub mod price_history;
pub mod user;

// Re-exports for public API convenience
pub use participates::Entity as ParticipatesEntity;
pub use post::{ActiveModel as PostActiveModel, Entity as PostEntity, Model as PostModel};
pub use price_history::{
    ActiveModel as PriceHistoryActiveModel, Entity as PriceHistoryEntity,
    Model as PriceHistoryModel,
};
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
