use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    // 班级ID
    pub id: i64,
    // 班级名称
    pub section_name: String,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 教师名下某个班级中的学生
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionMember {
    pub student_id: i64,
    pub username: String,
    pub section_id: i64,
    pub section_name: String,
}
