use super::{SeaOrmStorage, settle, write_failure};
use crate::entity::sections::Column as SectionColumn;
use crate::entity::student_sections::Relation as StudentSectionRelation;
use crate::entity::teacher_sections::Relation as TeacherSectionRelation;
use crate::entity::users::{ActiveModel, Column, Entity as Users, Relation};
use crate::errors::{PortalError, Result};
use crate::models::{
    WriteOutcome,
    users::entities::{User, UserRole, UserWithSection, UsersWithSections},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};
use tracing::info;

type UserSectionRow = (i64, String, Option<String>);

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> WriteOutcome {
        let username = username.trim();
        if username.is_empty() || password_hash.is_empty() {
            return WriteOutcome::Invalid("用户名和密码不能为空".to_string());
        }

        let model = ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(user) => {
                info!("创建用户: {} ({})", user.username, user.role);
                WriteOutcome::Created(user.id)
            }
            Err(e) => write_failure("创建用户", e),
        }
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        result.map(|m| m.into_user()).transpose()
    }

    /// 通过用户名获取用户
    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        result.map(|m| m.into_user()).transpose()
    }

    /// 列出所有用户
    pub async fn list_users_impl(&self) -> Result<Vec<User>> {
        let users = Users::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户列表失败: {e}")))?;

        users.into_iter().map(|m| m.into_user()).collect()
    }

    /// 列出学生与教师及其所属班级（左连接，没有班级的用户也会出现一次）
    pub async fn list_users_with_sections_impl(&self) -> Result<UsersWithSections> {
        let students = Users::find()
            .select_only()
            .column(Column::Id)
            .column(Column::Username)
            .column(SectionColumn::SectionName)
            .join(JoinType::LeftJoin, Relation::StudentSections.def())
            .join(JoinType::LeftJoin, StudentSectionRelation::Section.def())
            .filter(Column::Role.eq(UserRole::Student.to_string()))
            .order_by_asc(Column::Id)
            .order_by_asc(SectionColumn::SectionName)
            .into_tuple::<UserSectionRow>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生班级失败: {e}")))?;

        let teachers = Users::find()
            .select_only()
            .column(Column::Id)
            .column(Column::Username)
            .column(SectionColumn::SectionName)
            .join(JoinType::LeftJoin, Relation::TeacherSections.def())
            .join(JoinType::LeftJoin, TeacherSectionRelation::Section.def())
            .filter(Column::Role.eq(UserRole::Teacher.to_string()))
            .order_by_asc(Column::Id)
            .order_by_asc(SectionColumn::SectionName)
            .into_tuple::<UserSectionRow>()
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询教师班级失败: {e}")))?;

        let into_rows = |rows: Vec<UserSectionRow>, role: UserRole| {
            rows.into_iter()
                .map(|(id, username, section_name)| UserWithSection {
                    id,
                    username,
                    role,
                    section_name,
                })
                .collect::<Vec<_>>()
        };

        Ok(UsersWithSections {
            students: into_rows(students, UserRole::Student),
            teachers: into_rows(teachers, UserRole::Teacher),
        })
    }

    /// 用户总数
    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户总数失败: {e}")))
    }

    /// 删除用户
    pub async fn delete_user_impl(&self, id: i64) -> WriteOutcome {
        let result = Users::delete_by_id(id).exec(&self.db).await.map(|res| {
            if res.rows_affected > 0 {
                info!("删除用户: {}", id);
                WriteOutcome::Deleted
            } else {
                WriteOutcome::NotFound
            }
        });
        settle("删除用户", result)
    }

    /// 初始管理员账号不存在时创建
    pub async fn ensure_admin_account_impl(
        &self,
        username: &str,
        password_hash: &str,
    ) -> WriteOutcome {
        match self.get_user_by_username_impl(username).await {
            Ok(Some(_)) => WriteOutcome::AlreadyExists,
            Ok(None) => {
                self.create_user_impl(username, password_hash, UserRole::Admin)
                    .await
            }
            Err(e) => {
                tracing::error!("检查管理员账号失败: {}", e);
                WriteOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{section, storage, user};
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let storage = storage().await;
        let outcome = storage
            .create_user_impl("alice", "$argon2id$hash", UserRole::Student)
            .await;
        let id = outcome.created_id().unwrap();

        let by_id = storage.get_user_by_id_impl(id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.role, UserRole::Student);

        let by_name = storage
            .get_user_by_username_impl("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, id);
        assert!(storage.get_user_by_username_impl("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_already_exists() {
        let storage = storage().await;
        user(&storage, "bob", UserRole::Student).await;

        let outcome = storage
            .create_user_impl("bob", "$argon2id$other", UserRole::Teacher)
            .await;
        assert_eq!(outcome, WriteOutcome::AlreadyExists);
        assert_eq!(storage.count_users_impl().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_username_is_invalid() {
        let storage = storage().await;
        let outcome = storage
            .create_user_impl("   ", "$argon2id$hash", UserRole::Student)
            .await;
        assert!(matches!(outcome, WriteOutcome::Invalid(_)));
    }

    #[tokio::test]
    async fn test_ensure_admin_account_runs_once() {
        let storage = storage().await;
        let first = storage.ensure_admin_account_impl("admin", "$argon2id$a").await;
        assert!(first.is_success());
        let second = storage.ensure_admin_account_impl("admin", "$argon2id$b").await;
        assert_eq!(second, WriteOutcome::AlreadyExists);

        let admins: Vec<_> = storage
            .list_users_impl()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.role == UserRole::Admin)
            .collect();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].password_hash, "$argon2id$a");
    }

    #[tokio::test]
    async fn test_users_with_sections_left_join() {
        let storage = storage().await;
        let s1 = section(&storage, "10-A").await;
        let s2 = section(&storage, "10-B").await;
        let enrolled = user(&storage, "stu1", UserRole::Student).await;
        user(&storage, "stu2", UserRole::Student).await;
        let teacher = user(&storage, "teach", UserRole::Teacher).await;
        user(&storage, "admin", UserRole::Admin).await;

        storage.assign_to_section_impl(enrolled, UserRole::Student, s1).await;
        storage.assign_to_section_impl(teacher, UserRole::Teacher, s1).await;
        storage.assign_to_section_impl(teacher, UserRole::Teacher, s2).await;

        let overview = storage.list_users_with_sections_impl().await.unwrap();
        assert_eq!(overview.students.len(), 2);
        assert_eq!(overview.students[0].section_name.as_deref(), Some("10-A"));
        assert_eq!(overview.students[1].username, "stu2");
        assert_eq!(overview.students[1].section_name, None);

        let teacher_sections: Vec<_> = overview
            .teachers
            .iter()
            .map(|t| t.section_name.clone().unwrap_or_default())
            .collect();
        assert_eq!(teacher_sections, vec!["10-A", "10-B"]);
    }

    #[tokio::test]
    async fn test_delete_user_cascades_memberships() {
        use crate::entity::{grades, messages};
        use crate::models::files::entities::{FileKind, NewFile};

        let storage = storage().await;
        let s1 = section(&storage, "9-C").await;
        let student = user(&storage, "carol", UserRole::Student).await;
        let teacher = user(&storage, "tom", UserRole::Teacher).await;
        storage.assign_to_section_impl(student, UserRole::Student, s1).await;
        storage.assign_to_section_impl(teacher, UserRole::Teacher, s1).await;

        let subject = storage
            .create_subject_impl("Physics", s1, teacher)
            .await
            .created_id()
            .unwrap();
        assert!(storage.add_grade_impl(student, subject, 72.0).await.is_success());
        assert!(storage.save_message_impl(s1, student, "hello").await.is_success());
        assert!(
            storage
                .add_file_impl(NewFile {
                    filename: "notes.pdf".into(),
                    kind: FileKind::Pdf,
                    data: b"%PDF-1.4".to_vec(),
                    uploaded_by: teacher,
                    section_id: s1,
                })
                .await
                .is_success()
        );

        assert_eq!(storage.delete_user_impl(student).await, WriteOutcome::Deleted);
        assert!(storage.list_section_students_impl(s1).await.unwrap().is_empty());
        let orphan_grades = grades::Entity::find()
            .filter(grades::Column::StudentId.eq(student))
            .count(&storage.db)
            .await
            .unwrap();
        assert_eq!(orphan_grades, 0);
        let orphan_messages = messages::Entity::find()
            .filter(messages::Column::UserId.eq(student))
            .count(&storage.db)
            .await
            .unwrap();
        assert_eq!(orphan_messages, 0);
        assert_eq!(storage.delete_user_impl(student).await, WriteOutcome::NotFound);

        // 教师的班级关联被删除，上传的文件保留但不再有上传者
        assert_eq!(storage.delete_user_impl(teacher).await, WriteOutcome::Deleted);
        assert!(storage.list_teacher_sections_impl(teacher).await.unwrap().is_empty());
        let files = storage.list_section_files_impl(s1, None).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].uploaded_by, None);
    }

    #[tokio::test]
    async fn test_unknown_role_is_reported() {
        let storage = storage().await;
        let id = ActiveModel {
            username: Set("ghost".to_string()),
            password_hash: Set("$argon2id$test".to_string()),
            role: Set("Janitor".to_string()),
            created_at: Set(0),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap()
        .id;

        assert!(storage.get_user_by_id_impl(id).await.is_err());
        assert!(storage.get_user_by_username_impl("ghost").await.is_err());
        assert!(storage.list_users_impl().await.is_err());
    }
}
