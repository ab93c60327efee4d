//! SeaORM 存储实现
//!
//! 基于单个 SQLite 数据库文件的存储层。

mod assignments;
mod files;
mod grades;
mod messages;
mod recommendations;
mod sections;
mod subjects;
mod users;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{PortalError, Result};
use crate::models::WriteOutcome;
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::{debug, error, info};

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 使用全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database).await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;
        let db = Self::connect_sqlite(&db_url, config).await?;

        // 运行迁移（重复执行不会产生变化）
        Migrator::up(&db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(if in_memory {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            })
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        // 内存数据库随连接销毁，只能使用一个常驻连接
        let mut pool = SqlitePoolOptions::new()
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout));
        pool = if in_memory {
            pool.max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            pool.max_connections(config.pool_size.max(1))
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool
            .connect_with(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 规范化 SQLite 连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else {
            Err(PortalError::database_config(format!(
                "无法识别的数据库 URL: {url}. 支持: sqlite://, :memory:, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 将写操作中的数据库错误折叠为 WriteOutcome
pub(super) fn write_failure(action: &str, err: DbErr) -> WriteOutcome {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        debug!("{}失败: 记录已存在", action);
        return WriteOutcome::AlreadyExists;
    }
    error!("{}失败: {}", action, err);
    WriteOutcome::Failed
}

/// 收敛写操作的结果
pub(super) fn settle(action: &str, result: std::result::Result<WriteOutcome, DbErr>) -> WriteOutcome {
    result.unwrap_or_else(|e| write_failure(action, e))
}

// Storage trait 实现
use crate::models::{
    assignments::entities::{Assignment, NewAssignment},
    files::entities::{FileInfo, FileKind, NewFile, StoredFile},
    grades::entities::{SectionGrade, StudentGrade, SubjectSummary},
    messages::entities::ChatMessage,
    recommendations::entities::{Topic, VideoRecommendation},
    sections::entities::{Section, SectionMember},
    subjects::entities::Subject,
    users::entities::{User, UserRole, UserSummary, UsersWithSections},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> WriteOutcome {
        self.create_user_impl(username, password_hash, role).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.list_users_impl().await
    }

    async fn list_users_with_sections(&self) -> Result<UsersWithSections> {
        self.list_users_with_sections_impl().await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn delete_user(&self, id: i64) -> WriteOutcome {
        self.delete_user_impl(id).await
    }

    async fn ensure_admin_account(&self, username: &str, password_hash: &str) -> WriteOutcome {
        self.ensure_admin_account_impl(username, password_hash)
            .await
    }

    // 班级模块
    async fn create_section(&self, section_name: &str) -> WriteOutcome {
        self.create_section_impl(section_name).await
    }

    async fn get_section_by_id(&self, section_id: i64) -> Result<Option<Section>> {
        self.get_section_by_id_impl(section_id).await
    }

    async fn get_section_by_name(&self, section_name: &str) -> Result<Option<Section>> {
        self.get_section_by_name_impl(section_name).await
    }

    async fn list_sections(&self) -> Result<Vec<Section>> {
        self.list_sections_impl().await
    }

    async fn delete_section(&self, section_id: i64) -> WriteOutcome {
        self.delete_section_impl(section_id).await
    }

    async fn assign_teacher_to_section(&self, teacher_id: i64, section_id: i64) -> WriteOutcome {
        self.assign_to_section_impl(teacher_id, UserRole::Teacher, section_id)
            .await
    }

    async fn assign_student_to_section(&self, student_id: i64, section_id: i64) -> WriteOutcome {
        self.assign_to_section_impl(student_id, UserRole::Student, section_id)
            .await
    }

    async fn list_teacher_sections(&self, teacher_id: i64) -> Result<Vec<Section>> {
        self.list_teacher_sections_impl(teacher_id).await
    }

    async fn list_student_sections(&self, student_id: i64) -> Result<Vec<Section>> {
        self.list_student_sections_impl(student_id).await
    }

    async fn list_section_students(&self, section_id: i64) -> Result<Vec<UserSummary>> {
        self.list_section_students_impl(section_id).await
    }

    async fn list_teacher_section_students(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<SectionMember>> {
        self.list_teacher_section_students_impl(teacher_id).await
    }

    async fn is_section_member(
        &self,
        user_id: i64,
        role: UserRole,
        section_id: i64,
    ) -> Result<bool> {
        self.is_section_member_impl(user_id, role, section_id).await
    }

    // 文件模块
    async fn add_file(&self, file: NewFile) -> WriteOutcome {
        self.add_file_impl(file).await
    }

    async fn list_section_files(
        &self,
        section_id: i64,
        kind: Option<FileKind>,
    ) -> Result<Vec<FileInfo>> {
        self.list_section_files_impl(section_id, kind).await
    }

    async fn list_files_by_kind(&self, kind: FileKind) -> Result<Vec<FileInfo>> {
        self.list_files_by_kind_impl(kind).await
    }

    async fn list_student_files(
        &self,
        student_id: i64,
        kind: Option<FileKind>,
    ) -> Result<Vec<FileInfo>> {
        self.list_student_files_impl(student_id, kind).await
    }

    async fn get_file(&self, file_id: i64) -> Result<Option<StoredFile>> {
        self.get_file_impl(file_id).await
    }

    async fn delete_file(&self, file_id: i64, actor_id: i64) -> WriteOutcome {
        self.delete_file_impl(file_id, actor_id).await
    }

    // 成绩模块
    async fn add_grade(&self, student_id: i64, subject_id: i64, grade: f64) -> WriteOutcome {
        self.add_grade_impl(student_id, subject_id, grade).await
    }

    async fn update_grade(&self, grade_id: i64, new_grade: f64, actor_id: i64) -> WriteOutcome {
        self.update_grade_impl(grade_id, new_grade, actor_id).await
    }

    async fn delete_grade(&self, grade_id: i64, actor_id: i64) -> WriteOutcome {
        self.delete_grade_impl(grade_id, actor_id).await
    }

    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<StudentGrade>> {
        self.list_student_grades_impl(student_id).await
    }

    async fn student_subject_grades(
        &self,
        student_id: i64,
    ) -> Result<Vec<SubjectSummary>> {
        self.student_subject_grades_impl(student_id).await
    }

    async fn list_section_grades(&self, section_id: i64) -> Result<Vec<SectionGrade>> {
        self.list_section_grades_impl(section_id).await
    }

    // 科目模块
    async fn create_subject(
        &self,
        subject_name: &str,
        section_id: i64,
        created_by: i64,
    ) -> WriteOutcome {
        self.create_subject_impl(subject_name, section_id, created_by)
            .await
    }

    async fn get_subject(&self, subject_id: i64) -> Result<Option<Subject>> {
        self.get_subject_impl(subject_id).await
    }

    async fn list_section_subjects(&self, section_id: i64) -> Result<Vec<Subject>> {
        self.list_section_subjects_impl(section_id).await
    }

    async fn delete_subject(&self, subject_id: i64, actor_id: i64) -> WriteOutcome {
        self.delete_subject_impl(subject_id, actor_id).await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> WriteOutcome {
        self.create_assignment_impl(assignment).await
    }

    async fn list_section_assignments(&self, section_id: i64) -> Result<Vec<Assignment>> {
        self.list_section_assignments_impl(section_id).await
    }

    async fn delete_assignment(&self, assignment_id: i64, actor_id: i64) -> WriteOutcome {
        self.delete_assignment_impl(assignment_id, actor_id).await
    }

    // 聊天模块
    async fn save_message(&self, section_id: i64, user_id: i64, content: &str) -> WriteOutcome {
        self.save_message_impl(section_id, user_id, content).await
    }

    async fn list_section_messages(&self, section_id: i64) -> Result<Vec<ChatMessage>> {
        self.list_section_messages_impl(section_id).await
    }

    async fn delete_message(
        &self,
        message_id: i64,
        actor_id: i64,
        actor_role: UserRole,
    ) -> WriteOutcome {
        self.delete_message_impl(message_id, actor_id, actor_role)
            .await
    }

    // 视频推荐模块
    async fn create_topic(
        &self,
        topic_name: &str,
        section_id: i64,
        created_by: i64,
    ) -> WriteOutcome {
        self.create_topic_impl(topic_name, section_id, created_by)
            .await
    }

    async fn get_topic(&self, topic_id: i64) -> Result<Option<Topic>> {
        self.get_topic_impl(topic_id).await
    }

    async fn list_section_topics(&self, section_id: i64) -> Result<Vec<Topic>> {
        self.list_section_topics_impl(section_id).await
    }

    async fn delete_topic(&self, topic_id: i64, actor_id: i64) -> WriteOutcome {
        self.delete_topic_impl(topic_id, actor_id).await
    }

    async fn add_video_recommendation(
        &self,
        topic_id: i64,
        video_url: &str,
        added_by: i64,
        title: Option<&str>,
    ) -> WriteOutcome {
        self.add_video_recommendation_impl(topic_id, video_url, added_by, title)
            .await
    }

    async fn list_topic_recommendations(
        &self,
        topic_id: i64,
    ) -> Result<Vec<VideoRecommendation>> {
        self.list_topic_recommendations_impl(topic_id).await
    }

    async fn delete_video_recommendation(
        &self,
        recommendation_id: i64,
        actor_id: i64,
    ) -> WriteOutcome {
        self.delete_video_recommendation_impl(recommendation_id, actor_id)
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::config::DatabaseConfig;
    use crate::models::users::entities::UserRole;

    pub async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        })
        .await
        .expect("failed to open in-memory database")
    }

    pub async fn user(storage: &SeaOrmStorage, username: &str, role: UserRole) -> i64 {
        storage
            .create_user_impl(username, "$argon2id$test", role)
            .await
            .created_id()
            .expect("user should be created")
    }

    pub async fn section(storage: &SeaOrmStorage, name: &str) -> i64 {
        storage
            .create_section_impl(name)
            .await
            .created_id()
            .expect("section should be created")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("sqlite://school.db").unwrap(),
            "sqlite://school.db"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("data/school.db").unwrap(),
            "sqlite://data/school.db?mode=rwc"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://localhost/db").is_err());
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let storage = test_support::storage().await;
        Migrator::up(&storage.db, None).await.unwrap();
        assert_eq!(storage.count_users_impl().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_section_grade_scenario() {
        use crate::models::users::entities::UserRole;
        use crate::storage::Storage;

        let storage = test_support::storage().await;
        storage
            .ensure_admin_account("admin", "$argon2id$admin")
            .await
            .created_id()
            .unwrap();

        let section_id = storage.create_section("10-A").await.created_id().unwrap();
        let bob = storage
            .create_user("bob", "$argon2id$pw1", UserRole::Student)
            .await
            .created_id()
            .unwrap();
        assert!(
            storage
                .assign_student_to_section(bob, section_id)
                .await
                .is_success()
        );
        let math = storage
            .create_subject("Math", section_id, 1)
            .await
            .created_id()
            .unwrap();
        assert!(storage.add_grade(bob, math, 85.0).await.is_success());

        let grades = storage.list_section_grades(section_id).await.unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].username, "bob");
        assert_eq!(grades[0].subject_name, "Math");
        assert_eq!(grades[0].grade, 85.0);
    }
}
