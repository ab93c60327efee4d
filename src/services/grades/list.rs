use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::ApiResponse;
use crate::services::{check_section_access, current_session, read_failure};

pub async fn list_section_grades(
    service: &GradeService,
    section_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    if let Err(response) = check_section_access(storage.as_ref(), &session, section_id).await {
        return Ok(response);
    }

    match storage.list_section_grades(section_id).await {
        Ok(grades) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            grades,
            "Section grades retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取班级成绩", e)),
    }
}

pub async fn list_my_grades(
    service: &GradeService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match storage.list_student_grades(session.user_id).await {
        Ok(grades) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            grades,
            "Grades retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取成绩", e)),
    }
}
