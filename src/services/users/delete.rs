use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{OutcomeCodes, current_session, write_response};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };

    // 禁止删除当前登录的管理员
    if user_id == session.user_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        )));
    }

    let storage = service.get_storage(request);
    Ok(write_response(
        storage.delete_user(user_id).await,
        "User deleted successfully",
        OutcomeCodes::new(ErrorCode::UserNotFound, ErrorCode::UserDeleteFailed),
    ))
}
