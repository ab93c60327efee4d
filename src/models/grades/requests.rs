use serde::Deserialize;

// 录入成绩请求
#[derive(Debug, Deserialize)]
pub struct AddGradeRequest {
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: f64,
}

// 修改成绩请求
#[derive(Debug, Deserialize)]
pub struct UpdateGradeRequest {
    pub grade: f64,
}
