use super::{SeaOrmStorage, settle};
use crate::entity::subjects::{ActiveModel, Column, Entity as Subjects};
use crate::errors::{PortalError, Result};
use crate::models::{WriteOutcome, subjects::entities::Subject};
use crate::utils::validate::validate_name;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, warn};

impl SeaOrmStorage {
    /// 在班级中创建科目，同一班级内科目名唯一
    pub async fn create_subject_impl(
        &self,
        subject_name: &str,
        section_id: i64,
        created_by: i64,
    ) -> WriteOutcome {
        let name = match validate_name("Subject name", subject_name) {
            Ok(name) => name,
            Err(msg) => return WriteOutcome::Invalid(msg),
        };
        settle(
            "创建科目",
            self.try_create_subject(name, section_id, created_by).await,
        )
    }

    async fn try_create_subject(
        &self,
        name: &str,
        section_id: i64,
        created_by: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        if !self.section_exists(section_id).await? {
            return Ok(WriteOutcome::NotFound);
        }

        let model = ActiveModel {
            subject_name: Set(name.to_string()),
            section_id: Set(section_id),
            created_by: Set(Some(created_by)),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("创建科目: {} (班级 {})", model.subject_name, section_id);
        Ok(WriteOutcome::Created(model.id))
    }

    pub async fn get_subject_impl(&self, subject_id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find_by_id(subject_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询科目失败: {e}")))?;

        Ok(result.map(|m| m.into_subject()))
    }

    /// 班级中的科目，按名称排序
    pub async fn list_section_subjects_impl(&self, section_id: i64) -> Result<Vec<Subject>> {
        let subjects = Subjects::find()
            .filter(Column::SectionId.eq(section_id))
            .order_by_asc(Column::SubjectName)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询科目列表失败: {e}")))?;

        Ok(subjects.into_iter().map(|m| m.into_subject()).collect())
    }

    /// 删除科目，只有创建者可以删除（级联删除该科目的成绩）
    pub async fn delete_subject_impl(&self, subject_id: i64, actor_id: i64) -> WriteOutcome {
        settle("删除科目", self.try_delete_subject(subject_id, actor_id).await)
    }

    async fn try_delete_subject(
        &self,
        subject_id: i64,
        actor_id: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some(subject) = Subjects::find_by_id(subject_id).one(&self.db).await? else {
            return Ok(WriteOutcome::NotFound);
        };
        if subject.created_by != Some(actor_id) {
            warn!("用户 {} 尝试删除非本人创建的科目 {}", actor_id, subject_id);
            return Ok(WriteOutcome::Forbidden);
        }

        Subjects::delete_by_id(subject_id).exec(&self.db).await?;
        info!("删除科目: {}", subject.subject_name);
        Ok(WriteOutcome::Deleted)
    }
}
