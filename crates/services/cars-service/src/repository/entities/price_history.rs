//! Price history database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::PriceHistory;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "price_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub before: i32,
    pub after: i32,
    pub created: DateTimeUtc,
    pub auto_post_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::AutoPostId",
        to = "super::post::Column::Id"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PriceHistory {
    fn from(model: Model) -> Self {
        PriceHistory {
            id: model.id,
            before: model.before,
            after: model.after,
            created: model.created,
        }
    }
}
