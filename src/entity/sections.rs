//! 班级实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub section_name: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::teacher_sections::Entity")]
    TeacherSections,
    #[sea_orm(has_many = "super::student_sections::Entity")]
    StudentSections,
    #[sea_orm(has_many = "super::files::Entity")]
    Files,
    #[sea_orm(has_many = "super::subjects::Entity")]
    Subjects,
}

impl Related<super::teacher_sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeacherSections.def()
    }
}

impl Related<super::student_sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentSections.def()
    }
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_section(self) -> crate::models::sections::entities::Section {
        use crate::models::sections::entities::Section;
        use chrono::{DateTime, Utc};

        Section {
            id: self.id,
            section_name: self.section_name,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
