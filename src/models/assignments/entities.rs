use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub section_id: i64,
    pub max_grade: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 待写入的新作业
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub section_id: i64,
    // 缺省为 100
    pub max_grade: Option<f64>,
}
