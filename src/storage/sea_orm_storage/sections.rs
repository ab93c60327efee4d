use super::{SeaOrmStorage, settle, write_failure};
use crate::entity::sections::{ActiveModel, Column, Entity as Sections, Relation};
use crate::entity::student_sections::{
    self, ActiveModel as StudentSectionActiveModel, Entity as StudentSections,
};
use crate::entity::teacher_sections::{
    self, ActiveModel as TeacherSectionActiveModel, Entity as TeacherSections,
};
use crate::entity::users::{self, Entity as Users};
use crate::errors::{PortalError, Result};
use crate::models::{
    WriteOutcome,
    sections::entities::{Section, SectionMember},
    users::entities::{UserRole, UserSummary},
};
use crate::utils::validate::validate_name;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::{info, warn};

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_section_impl(&self, section_name: &str) -> WriteOutcome {
        let name = match validate_name("Section name", section_name) {
            Ok(name) => name,
            Err(msg) => return WriteOutcome::Invalid(msg),
        };

        let model = ActiveModel {
            section_name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(section) => {
                info!("创建班级: {}", section.section_name);
                WriteOutcome::Created(section.id)
            }
            Err(e) => write_failure("创建班级", e),
        }
    }

    /// 通过 ID 获取班级
    pub async fn get_section_by_id_impl(&self, section_id: i64) -> Result<Option<Section>> {
        let result = Sections::find_by_id(section_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_section()))
    }

    /// 通过名称获取班级
    pub async fn get_section_by_name_impl(&self, section_name: &str) -> Result<Option<Section>> {
        let result = Sections::find()
            .filter(Column::SectionName.eq(section_name.trim()))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_section()))
    }

    /// 列出所有班级
    pub async fn list_sections_impl(&self) -> Result<Vec<Section>> {
        let sections = Sections::find()
            .order_by_asc(Column::SectionName)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok(sections.into_iter().map(|m| m.into_section()).collect())
    }

    /// 删除班级（级联删除班级内的所有内容）
    pub async fn delete_section_impl(&self, section_id: i64) -> WriteOutcome {
        let result = Sections::delete_by_id(section_id)
            .exec(&self.db)
            .await
            .map(|res| {
                if res.rows_affected > 0 {
                    info!("删除班级: {}", section_id);
                    WriteOutcome::Deleted
                } else {
                    WriteOutcome::NotFound
                }
            });
        settle("删除班级", result)
    }

    /// 将教师或学生分配到班级
    pub async fn assign_to_section_impl(
        &self,
        user_id: i64,
        role: UserRole,
        section_id: i64,
    ) -> WriteOutcome {
        settle(
            "分配班级",
            self.try_assign_to_section(user_id, role, section_id).await,
        )
    }

    async fn try_assign_to_section(
        &self,
        user_id: i64,
        role: UserRole,
        section_id: i64,
    ) -> std::result::Result<WriteOutcome, DbErr> {
        let Some(user) = Users::find_by_id(user_id).one(&self.db).await? else {
            return Ok(WriteOutcome::NotFound);
        };
        if Sections::find_by_id(section_id).one(&self.db).await?.is_none() {
            return Ok(WriteOutcome::NotFound);
        }
        if user.role != role.to_string() {
            return Ok(WriteOutcome::Invalid(format!(
                "用户 {} 不是{}",
                user.username, role
            )));
        }

        let id = match role {
            UserRole::Teacher => {
                TeacherSectionActiveModel {
                    teacher_id: Set(user_id),
                    section_id: Set(section_id),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
                .id
            }
            UserRole::Student => {
                StudentSectionActiveModel {
                    student_id: Set(user_id),
                    section_id: Set(section_id),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
                .id
            }
            UserRole::Admin => {
                return Ok(WriteOutcome::Invalid("管理员不属于任何班级".to_string()));
            }
        };

        info!("分配{} {} 到班级 {}", role, user.username, section_id);
        Ok(WriteOutcome::Created(id))
    }

    /// 教师任教的班级
    pub async fn list_teacher_sections_impl(&self, teacher_id: i64) -> Result<Vec<Section>> {
        let sections = Sections::find()
            .join(JoinType::InnerJoin, Relation::TeacherSections.def())
            .filter(teacher_sections::Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::SectionName)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询教师班级失败: {e}")))?;

        Ok(sections.into_iter().map(|m| m.into_section()).collect())
    }

    /// 学生所在的班级
    pub async fn list_student_sections_impl(&self, student_id: i64) -> Result<Vec<Section>> {
        let sections = Sections::find()
            .join(JoinType::InnerJoin, Relation::StudentSections.def())
            .filter(student_sections::Column::StudentId.eq(student_id))
            .order_by_asc(Column::SectionName)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生班级失败: {e}")))?;

        Ok(sections.into_iter().map(|m| m.into_section()).collect())
    }

    /// 班级中的学生
    pub async fn list_section_students_impl(&self, section_id: i64) -> Result<Vec<UserSummary>> {
        let students = Users::find()
            .join(JoinType::InnerJoin, users::Relation::StudentSections.def())
            .filter(student_sections::Column::SectionId.eq(section_id))
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级学生失败: {e}")))?;

        Ok(students
            .into_iter()
            .map(|m| UserSummary {
                id: m.id,
                username: m.username,
            })
            .collect())
    }

    /// 教师所有班级中的学生
    pub async fn list_teacher_section_students_impl(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<SectionMember>> {
        let taught_sections = Query::select()
            .column(teacher_sections::Column::SectionId)
            .from(TeacherSections)
            .and_where(teacher_sections::Column::TeacherId.eq(teacher_id))
            .to_owned();

        let rows = StudentSections::find()
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Username)
            .column(Column::Id)
            .column(Column::SectionName)
            .join(JoinType::InnerJoin, student_sections::Relation::Student.def())
            .join(JoinType::InnerJoin, student_sections::Relation::Section.def())
            .filter(student_sections::Column::SectionId.in_subquery(taught_sections))
            .order_by_asc(Column::SectionName)
            .order_by_asc(users::Column::Username)
            .into_tuple::<(i64, String, i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询教师学生失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(
                |(student_id, username, section_id, section_name)| SectionMember {
                    student_id,
                    username,
                    section_id,
                    section_name,
                },
            )
            .collect())
    }

    /// 用户是否属于班级
    pub async fn is_section_member_impl(
        &self,
        user_id: i64,
        role: UserRole,
        section_id: i64,
    ) -> Result<bool> {
        let count = match role {
            UserRole::Admin => return Ok(true),
            UserRole::Teacher => {
                TeacherSections::find()
                    .filter(teacher_sections::Column::TeacherId.eq(user_id))
                    .filter(teacher_sections::Column::SectionId.eq(section_id))
                    .count(&self.db)
                    .await
            }
            UserRole::Student => {
                StudentSections::find()
                    .filter(student_sections::Column::StudentId.eq(user_id))
                    .filter(student_sections::Column::SectionId.eq(section_id))
                    .count(&self.db)
                    .await
            }
        }
        .map_err(|e| PortalError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(count > 0)
    }

    /// 操作者是否任教该班级（写操作的权限校验）
    pub(super) async fn teaches_section(
        &self,
        teacher_id: i64,
        section_id: i64,
    ) -> std::result::Result<bool, DbErr> {
        let count = TeacherSections::find()
            .filter(teacher_sections::Column::TeacherId.eq(teacher_id))
            .filter(teacher_sections::Column::SectionId.eq(section_id))
            .count(&self.db)
            .await?;
        if count == 0 {
            warn!("用户 {} 未任教班级 {}", teacher_id, section_id);
        }
        Ok(count > 0)
    }

    /// 班级是否存在
    pub(super) async fn section_exists(&self, section_id: i64) -> std::result::Result<bool, DbErr> {
        Ok(Sections::find_by_id(section_id).one(&self.db).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{section, storage, user};
    use super::*;

    #[tokio::test]
    async fn test_section_name_unique() {
        let storage = storage().await;
        assert!(storage.create_section_impl("Grade 10").await.is_success());
        assert_eq!(
            storage.create_section_impl("Grade 10").await,
            WriteOutcome::AlreadyExists
        );
        assert!(matches!(
            storage.create_section_impl("  ").await,
            WriteOutcome::Invalid(_)
        ));

        let found = storage
            .get_section_by_name_impl("Grade 10")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.section_name, "Grade 10");
    }

    #[tokio::test]
    async fn test_duplicate_assignment_is_already_exists() {
        let storage = storage().await;
        let s = section(&storage, "A").await;
        let student = user(&storage, "stu", UserRole::Student).await;

        assert!(
            storage
                .assign_to_section_impl(student, UserRole::Student, s)
                .await
                .is_success()
        );
        assert_eq!(
            storage
                .assign_to_section_impl(student, UserRole::Student, s)
                .await,
            WriteOutcome::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_assign_checks_role_and_existence() {
        let storage = storage().await;
        let s = section(&storage, "A").await;
        let student = user(&storage, "stu", UserRole::Student).await;

        assert!(matches!(
            storage
                .assign_to_section_impl(student, UserRole::Teacher, s)
                .await,
            WriteOutcome::Invalid(_)
        ));
        assert_eq!(
            storage
                .assign_to_section_impl(student, UserRole::Student, 999)
                .await,
            WriteOutcome::NotFound
        );
        assert_eq!(
            storage.assign_to_section_impl(999, UserRole::Student, s).await,
            WriteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_membership_queries() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let b = section(&storage, "B").await;
        let c = section(&storage, "C").await;
        let teacher = user(&storage, "teacher", UserRole::Teacher).await;
        let s1 = user(&storage, "amy", UserRole::Student).await;
        let s2 = user(&storage, "ben", UserRole::Student).await;
        let s3 = user(&storage, "cat", UserRole::Student).await;

        storage.assign_to_section_impl(teacher, UserRole::Teacher, a).await;
        storage.assign_to_section_impl(teacher, UserRole::Teacher, b).await;
        storage.assign_to_section_impl(s1, UserRole::Student, a).await;
        storage.assign_to_section_impl(s2, UserRole::Student, b).await;
        storage.assign_to_section_impl(s3, UserRole::Student, c).await;

        let taught: Vec<_> = storage
            .list_teacher_sections_impl(teacher)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.section_name)
            .collect();
        assert_eq!(taught, vec!["A", "B"]);

        let members = storage
            .list_teacher_section_students_impl(teacher)
            .await
            .unwrap();
        let names: Vec<_> = members.iter().map(|m| m.username.as_str()).collect();
        assert_eq!(names, vec!["amy", "ben"]);
        assert_eq!(members[1].section_name, "B");

        let in_a = storage.list_section_students_impl(a).await.unwrap();
        assert_eq!(in_a.len(), 1);
        assert_eq!(in_a[0].id, s1);

        assert!(storage.is_section_member_impl(teacher, UserRole::Teacher, a).await.unwrap());
        assert!(!storage.is_section_member_impl(teacher, UserRole::Teacher, c).await.unwrap());
        assert!(storage.is_section_member_impl(s3, UserRole::Student, c).await.unwrap());
        assert!(!storage.is_section_member_impl(s3, UserRole::Student, a).await.unwrap());
        assert!(storage.is_section_member_impl(0, UserRole::Admin, c).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_section_cascades_memberships() {
        let storage = storage().await;
        let a = section(&storage, "A").await;
        let student = user(&storage, "stu", UserRole::Student).await;
        storage.assign_to_section_impl(student, UserRole::Student, a).await;

        assert_eq!(storage.delete_section_impl(a).await, WriteOutcome::Deleted);
        assert!(storage.list_student_sections_impl(student).await.unwrap().is_empty());
        assert!(storage.get_user_by_id_impl(student).await.unwrap().is_some());
        assert_eq!(storage.delete_section_impl(a).await, WriteOutcome::NotFound);
    }
}
