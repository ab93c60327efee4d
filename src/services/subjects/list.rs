use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubjectService;
use crate::models::ApiResponse;
use crate::services::{check_section_access, current_session, read_failure};

pub async fn list_subjects(
    service: &SubjectService,
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

    match storage.list_section_subjects(section_id).await {
        Ok(subjects) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subjects,
            "Subject list retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取科目列表", e)),
    }
}
