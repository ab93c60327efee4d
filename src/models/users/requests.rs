use super::entities::UserRole;
use serde::Deserialize;

// 用户创建请求（管理员）
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}
