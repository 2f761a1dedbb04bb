use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A stored upload. `tweet_id` stays empty until a tweet claims the file.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "medias")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tweet_id: Option<i32>,
    #[sea_orm(unique)]
    pub path_url: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tweets::Entity",
        from = "Column::TweetId",
        to = "super::tweets::Column::Id",
        on_delete = "Cascade"
    )]
    Tweets,
}

impl Related<super::tweets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tweets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
