use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    pub id: i64,
    pub subject_name: String,
    pub section_id: i64,
    // 创建者ID，创建者被删除后为空
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
