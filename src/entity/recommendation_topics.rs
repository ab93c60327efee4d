//! 视频推荐主题实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recommendation_topics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub topic_name: String,
    pub section_id: i64,
    pub created_by: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sections::Entity",
        from = "Column::SectionId",
        to = "super::sections::Column::Id"
    )]
    Section,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::video_recommendations::Entity")]
    VideoRecommendations,
}

impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::video_recommendations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoRecommendations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
