use std::sync::Arc;

use crate::models::{
    WriteOutcome,
    assignments::entities::{Assignment, NewAssignment},
    files::entities::{FileInfo, FileKind, NewFile, StoredFile},
    grades::entities::{SectionGrade, StudentGrade, SubjectSummary},
    messages::entities::ChatMessage,
    recommendations::entities::{Topic, VideoRecommendation},
    sections::entities::{Section, SectionMember},
    subjects::entities::Subject,
    users::entities::{User, UserRole, UserSummary, UsersWithSections},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 数据访问层
///
/// 写操作返回 [`WriteOutcome`]，存储故障在实现内部记录日志后折叠为
/// `WriteOutcome::Failed`；读操作返回 `Result`，存储故障向上传播。
/// 删除类操作在实现内部完成权限校验。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password_hash 必须是已经哈希过的密码）
    async fn create_user(&self, username: &str, password_hash: &str, role: UserRole)
    -> WriteOutcome;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 列出所有用户
    async fn list_users(&self) -> Result<Vec<User>>;
    // 列出学生与教师及其所属班级
    async fn list_users_with_sections(&self) -> Result<UsersWithSections>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;
    // 删除用户（级联删除班级关联、成绩、消息、推荐）
    async fn delete_user(&self, id: i64) -> WriteOutcome;
    // 确保初始管理员账号存在
    async fn ensure_admin_account(&self, username: &str, password_hash: &str) -> WriteOutcome;

    /// 班级管理方法
    async fn create_section(&self, section_name: &str) -> WriteOutcome;
    async fn get_section_by_id(&self, section_id: i64) -> Result<Option<Section>>;
    async fn get_section_by_name(&self, section_name: &str) -> Result<Option<Section>>;
    async fn list_sections(&self) -> Result<Vec<Section>>;
    async fn delete_section(&self, section_id: i64) -> WriteOutcome;
    // 分配教师到班级
    async fn assign_teacher_to_section(&self, teacher_id: i64, section_id: i64) -> WriteOutcome;
    // 分配学生到班级
    async fn assign_student_to_section(&self, student_id: i64, section_id: i64) -> WriteOutcome;
    // 教师任教的班级
    async fn list_teacher_sections(&self, teacher_id: i64) -> Result<Vec<Section>>;
    // 学生所在的班级
    async fn list_student_sections(&self, student_id: i64) -> Result<Vec<Section>>;
    // 班级中的学生
    async fn list_section_students(&self, section_id: i64) -> Result<Vec<UserSummary>>;
    // 教师所有班级中的学生
    async fn list_teacher_section_students(&self, teacher_id: i64)
    -> Result<Vec<SectionMember>>;
    // 用户是否属于班级（管理员总是返回 true）
    async fn is_section_member(&self, user_id: i64, role: UserRole, section_id: i64)
    -> Result<bool>;

    /// 文件管理方法
    async fn add_file(&self, file: NewFile) -> WriteOutcome;
    async fn list_section_files(
        &self,
        section_id: i64,
        kind: Option<FileKind>,
    ) -> Result<Vec<FileInfo>>;
    async fn list_files_by_kind(&self, kind: FileKind) -> Result<Vec<FileInfo>>;
    async fn list_student_files(
        &self,
        student_id: i64,
        kind: Option<FileKind>,
    ) -> Result<Vec<FileInfo>>;
    async fn get_file(&self, file_id: i64) -> Result<Option<StoredFile>>;
    // 只有上传者可以删除
    async fn delete_file(&self, file_id: i64, actor_id: i64) -> WriteOutcome;

    /// 成绩管理方法
    async fn add_grade(&self, student_id: i64, subject_id: i64, grade: f64) -> WriteOutcome;
    // 操作者必须任教该科目所在的班级
    async fn update_grade(&self, grade_id: i64, new_grade: f64, actor_id: i64) -> WriteOutcome;
    async fn delete_grade(&self, grade_id: i64, actor_id: i64) -> WriteOutcome;
    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<StudentGrade>>;
    // 按科目分组的成绩
    async fn student_subject_grades(&self, student_id: i64) -> Result<Vec<SubjectSummary>>;
    async fn list_section_grades(&self, section_id: i64) -> Result<Vec<SectionGrade>>;

    /// 科目管理方法
    async fn create_subject(&self, subject_name: &str, section_id: i64, created_by: i64)
    -> WriteOutcome;
    async fn get_subject(&self, subject_id: i64) -> Result<Option<Subject>>;
    async fn list_section_subjects(&self, section_id: i64) -> Result<Vec<Subject>>;
    // 只有创建者可以删除
    async fn delete_subject(&self, subject_id: i64, actor_id: i64) -> WriteOutcome;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: NewAssignment) -> WriteOutcome;
    async fn list_section_assignments(&self, section_id: i64) -> Result<Vec<Assignment>>;
    async fn delete_assignment(&self, assignment_id: i64, actor_id: i64) -> WriteOutcome;

    /// 班级聊天方法
    async fn save_message(&self, section_id: i64, user_id: i64, content: &str) -> WriteOutcome;
    async fn list_section_messages(&self, section_id: i64) -> Result<Vec<ChatMessage>>;
    async fn delete_message(
        &self,
        message_id: i64,
        actor_id: i64,
        actor_role: UserRole,
    ) -> WriteOutcome;

    /// 视频推荐方法
    async fn create_topic(&self, topic_name: &str, section_id: i64, created_by: i64)
    -> WriteOutcome;
    async fn get_topic(&self, topic_id: i64) -> Result<Option<Topic>>;
    async fn list_section_topics(&self, section_id: i64) -> Result<Vec<Topic>>;
    async fn delete_topic(&self, topic_id: i64, actor_id: i64) -> WriteOutcome;
    async fn add_video_recommendation(
        &self,
        topic_id: i64,
        video_url: &str,
        added_by: i64,
        title: Option<&str>,
    ) -> WriteOutcome;
    async fn list_topic_recommendations(&self, topic_id: i64)
    -> Result<Vec<VideoRecommendation>>;
    async fn delete_video_recommendation(&self, recommendation_id: i64, actor_id: i64)
    -> WriteOutcome;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

/// 基于内存数据库的存储，供测试使用
#[cfg(test)]
pub(crate) async fn memory_storage() -> Arc<dyn Storage> {
    Arc::new(sea_orm_storage::test_support::storage().await)
}
