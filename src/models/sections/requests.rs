use serde::Deserialize;

// 创建班级请求
#[derive(Debug, Deserialize)]
pub struct CreateSectionRequest {
    pub section_name: String,
}

// 班级成员分配请求（教师或学生）
#[derive(Debug, Deserialize)]
pub struct AssignMemberRequest {
    pub user_id: i64,
}
