use crate::models::users::entities::UserRole;
use serde::Deserialize;

// 用户登录请求（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// 登录时选择的角色
    pub role: Option<UserRole>,
    /// 用户名
    #[serde(default)]
    pub username: String,
    /// 密码
    #[serde(default)]
    pub password: String,
}
