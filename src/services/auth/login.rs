use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{requests::LoginRequest, responses::LoginResponse},
};
use crate::services::read_failure;
use crate::session::{LoginRejection, SessionState};
use crate::utils::jwt::JwtUtils;

use super::AuthService;

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    // 1. 校验凭据
    let mut session = SessionState::default();
    let context = match session.begin(storage.as_ref(), login_request.into()).await {
        Ok(Ok(context)) => context,
        Ok(Err(rejection)) => {
            info!("登录被拒绝: {}", rejection);
            let response = match rejection {
                LoginRejection::MissingFields => HttpResponse::BadRequest(),
                _ => HttpResponse::Unauthorized(),
            }
            .json(ApiResponse::error_empty(
                rejection.error_code(),
                rejection.message(),
            ));
            return Ok(response);
        }
        Err(e) => return Ok(read_failure("登录", e)),
    };

    // 2. 签发会话令牌
    let token = match JwtUtils::generate_session_token(
        context.user_id,
        context.role.as_str(),
        &context.username,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate session token: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            );
        }
    };

    // 3. 写入 Cookie
    let response = LoginResponse {
        expires_in: config.jwt.session_expiry * 60, // 转换为秒
        session: session.snapshot(),
        access_token: token.clone(),
    };

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::create_session_cookie(&token))
        .json(ApiResponse::success(response, "Login successful")))
}
