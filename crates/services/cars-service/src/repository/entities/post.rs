//! Sale post database entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auto_post")]
pub struct Model {
    /// Assigned by the caller
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created: DateTimeUtc,
    pub auto_user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AutoUserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::price_history::Entity")]
    PriceHistory,
    #[sea_orm(has_many = "super::participates::Entity")]
    Participates,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl Related<super::participates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Combine the row with its already-loaded history entries
    pub fn into_domain(self, price_histories: Vec<domain::PriceHistory>) -> domain::Post {
        domain::Post {
            id: self.id,
            description: self.description,
            created: self.created,
            user_id: self.auto_user_id,
            price_histories,
        }
    }
}
