use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::ErrorCode;
use crate::services::{OutcomeCodes, current_session, write_response};

pub async fn delete_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    // 只有任教该班级的教师可以删除
    Ok(write_response(
        storage
            .delete_assignment(assignment_id, session.user_id)
            .await,
        "Assignment deleted successfully",
        OutcomeCodes::new(ErrorCode::AssignmentNotFound, ErrorCode::Conflict),
    ))
}
