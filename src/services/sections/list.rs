use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SectionService;
use crate::models::ApiResponse;
use crate::models::users::entities::UserRole;
use crate::services::{current_session, read_failure};

pub async fn list_sections(
    service: &SectionService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    // 学生与教师只能看到自己所在的班级
    let sections = match session.role {
        UserRole::Student => storage.list_student_sections(session.user_id).await,
        UserRole::Teacher => storage.list_teacher_sections(session.user_id).await,
        UserRole::Admin => storage.list_sections().await,
    };

    match sections {
        Ok(sections) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            sections,
            "Section list retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取班级列表", e)),
    }
}
