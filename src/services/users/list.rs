use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse,
    users::responses::{UserListResponse, UserOverviewResponse},
};
use crate::services::read_failure;

pub async fn list_users(service: &UserService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_users().await {
        Ok(items) => {
            let total = items.len() as u64;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserListResponse { items, total },
                "User list retrieved successfully",
            )))
        }
        Err(e) => Ok(read_failure("获取用户列表", e)),
    }
}

pub async fn users_overview(
    service: &UserService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let total = match storage.count_users().await {
        Ok(total) => total,
        Err(e) => return Ok(read_failure("统计用户数量", e)),
    };

    match storage.list_users_with_sections().await {
        Ok(groups) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserOverviewResponse { total, groups },
            "User overview retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取用户班级总览", e)),
    }
}
