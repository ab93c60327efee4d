use actix_web::{HttpResponse, Result as ActixResult};

use crate::models::ApiResponse;
use crate::models::auth::responses::SessionResponse;
use crate::session::SessionState;
use crate::utils::jwt::JwtUtils;

/// 处理用户登出
/// 会话令牌无状态，登出只需让浏览器删除会话 Cookie
pub async fn handle_logout() -> ActixResult<HttpResponse> {
    let empty_cookie = JwtUtils::create_empty_session_cookie();

    Ok(HttpResponse::Ok().cookie(empty_cookie).json(ApiResponse::success(
        SessionResponse {
            session: SessionState::Anonymous.snapshot(),
        },
        "登出成功",
    )))
}
