use crate::session::SessionSnapshot;
use serde::Serialize;

// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionSnapshot,
}
