use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode, users::requests::CreateUserRequest};
use crate::services::{OutcomeCodes, write_response};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_password, validate_username};

const USER_CODES: OutcomeCodes =
    OutcomeCodes::new(ErrorCode::UserNotFound, ErrorCode::UserAlreadyExists)
        .invalid(ErrorCode::UserNameInvalid);

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let username = user_data.username.trim();

    // 验证用户名
    if let Err(msg) = validate_username(username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证密码
    if let Err(msg) = validate_password(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    let password_hash = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::UserCreationFailed,
                    format!("Password hashing failed: {e}"),
                )),
            );
        }
    };

    let storage = service.get_storage(request);
    let outcome = storage
        .create_user(username, &password_hash, user_data.role)
        .await;

    Ok(write_response(outcome, "用户创建成功", USER_CODES))
}
