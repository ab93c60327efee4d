//! 视频推荐实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "video_recommendations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub topic_id: i64,
    pub video_url: String,
    pub title: Option<String>,
    pub added_by: i64,
    pub added_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recommendation_topics::Entity",
        from = "Column::TopicId",
        to = "super::recommendation_topics::Column::Id"
    )]
    Topic,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AddedBy",
        to = "super::users::Column::Id"
    )]
    Adder,
}

impl Related<super::recommendation_topics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Topic.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
