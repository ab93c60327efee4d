use super::entities::{User, UsersWithSections};
use serde::Serialize;

// 用户列表响应
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub total: u64,
}

// 用户班级总览响应
#[derive(Debug, Serialize)]
pub struct UserOverviewResponse {
    pub total: u64,
    #[serde(flatten)]
    pub groups: UsersWithSections,
}
