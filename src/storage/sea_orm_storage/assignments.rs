use super::{SeaOrmStorage, settle};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{PortalError, Result};
use crate::models::{
    WriteOutcome,
    assignments::entities::{Assignment, NewAssignment},
};
use crate::utils::validate::validate_name;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;

const DEFAULT_MAX_GRADE: f64 = 100.0;

impl SeaOrmStorage {
    /// 布置作业
    pub async fn create_assignment_impl(&self, assignment: NewAssignment) -> WriteOutcome {
        let title = match validate_name("Assignment title", &assignment.title) {
            Ok(title) => title.to_string(),
            Err(msg) => return WriteOutcome::Invalid(msg),
        };
        let max_grade = assignment.max_grade.unwrap_or(DEFAULT_MAX_GRADE);
        if !max_grade.is_finite() || max_grade <= 0.0 {
            return WriteOutcome::Invalid("Max grade must be positive".to_string());
        }

        settle(
            "布置作业",
            self.try_create_assignment(title, max_grade, assignment).await,
        )
    }

    async fn try_create_assignment(
        &self,
        title: String,
        max_grade: f64,
        assignment: NewAssignment,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        if !self.section_exists(assignment.section_id).await? {
            return Ok(WriteOutcome::NotFound);
        }

        let description = assignment
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let model = ActiveModel {
            title: Set(title),
            description: Set(description),
            due_date: Set(assignment.due_date.timestamp()),
            section_id: Set(assignment.section_id),
            max_grade: Set(max_grade),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("布置作业: {} (班级 {})", model.title, model.section_id);
        Ok(WriteOutcome::Created(model.id))
    }

    /// 班级作业，按截止时间排序
    pub async fn list_section_assignments_impl(&self, section_id: i64) -> Result<Vec<Assignment>> {
        let assignments = Assignments::find()
            .filter(Column::SectionId.eq(section_id))
            .order_by_asc(Column::DueDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(assignments.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 删除作业，操作者必须任教该班级
    pub async fn delete_assignment_impl(&self, assignment_id: i64, actor_id: i64) -> WriteOutcome {
        settle(
            "删除作业",
            self.try_delete_assignment(assignment_id, actor_id).await,
        )
    }

    async fn try_delete_assignment(
        &self,
        assignment_id: i64,
        actor_id: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some(assignment) = Assignments::find_by_id(assignment_id).one(&self.db).await? else {
            return Ok(WriteOutcome::NotFound);
        };
        if !self.teaches_section(actor_id, assignment.section_id).await? {
            return Ok(WriteOutcome::Forbidden);
        }

        Assignments::delete_by_id(assignment_id).exec(&self.db).await?;
        info!("删除作业: {}", assignment.title);
        Ok(WriteOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{section, storage, user};
    use super::*;
    use crate::models::users::entities::UserRole;
    use chrono::{Duration, Utc};

    fn homework(title: &str, section_id: i64, days: i64) -> NewAssignment {
        NewAssignment {
            title: title.to_string(),
            description: Some("  ".to_string()),
            due_date: Utc::now() + Duration::days(days),
            section_id,
            max_grade: None,
        }
    }

    #[tokio::test]
    async fn test_create_assignment_defaults() {
        let storage = storage().await;
        let a = section(&storage, "A").await;

        let id = storage
            .create_assignment_impl(homework("Essay", a, 3))
            .await
            .created_id()
            .unwrap();
        let list = storage.list_section_assignments_impl(a).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
        assert_eq!(list[0].max_grade, 100.0);
        assert_eq!(list[0].description, None);
    }

    #[tokio::test]
    async fn test_create_assignment_validation() {
        let storage = storage().await;
        let a = section(&storage, "A").await;

        let mut bad = homework("Quiz", a, 1);
        bad.max_grade = Some(0.0);
        assert!(matches!(
            storage.create_assignment_impl(bad).await,
            WriteOutcome::Invalid(_)
        ));
        assert!(matches!(
            storage.create_assignment_impl(homework(" ", a, 1)).await,
            WriteOutcome::Invalid(_)
        ));
        assert_eq!(
            storage.create_assignment_impl(homework("Quiz", 404, 1)).await,
            WriteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_assignments_ordered_by_due_date() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        storage.create_assignment_impl(homework("Later", a, 7)).await;
        storage.create_assignment_impl(homework("Sooner", a, 1)).await;

        let titles: Vec<_> = storage
            .list_section_assignments_impl(a)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }

    #[tokio::test]
    async fn test_delete_assignment_requires_section_teacher() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;
        let stranger = user(&storage, "stranger", UserRole::Teacher).await;
        storage
            .assign_to_section_impl(teacher, UserRole::Teacher, a)
            .await;
        let id = storage
            .create_assignment_impl(homework("Lab", a, 2))
            .await
            .created_id()
            .unwrap();

        assert_eq!(
            storage.delete_assignment_impl(id, stranger).await,
            WriteOutcome::Forbidden
        );
        assert_eq!(
            storage.delete_assignment_impl(id, teacher).await,
            WriteOutcome::Deleted
        );
        assert_eq!(
            storage.delete_assignment_impl(id, teacher).await,
            WriteOutcome::NotFound
        );
    }
}
