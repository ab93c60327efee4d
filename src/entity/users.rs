//! 用户实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::teacher_sections::Entity")]
    TeacherSections,
    #[sea_orm(has_many = "super::student_sections::Entity")]
    StudentSections,
    #[sea_orm(has_many = "super::grades::Entity")]
    Grades,
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
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

impl Related<super::grades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grades.def()
    }
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    /// 角色列无法识别时返回错误
    pub fn into_user(self) -> crate::errors::Result<crate::models::users::entities::User> {
        use crate::errors::PortalError;
        use crate::models::users::entities::{User, UserRole};
        use chrono::{DateTime, Utc};

        let role = self.role.parse::<UserRole>().map_err(|e| {
            PortalError::database_operation(format!("用户 {} 的角色无效: {e}", self.id))
        })?;
        Ok(User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            role,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        })
    }
}
