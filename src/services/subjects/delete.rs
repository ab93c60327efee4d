use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubjectService;
use crate::models::ErrorCode;
use crate::services::{OutcomeCodes, current_session, write_response};

pub async fn delete_subject(
    service: &SubjectService,
    subject_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    Ok(write_response(
        storage.delete_subject(subject_id, session.user_id).await,
        "Subject deleted successfully",
        OutcomeCodes::new(ErrorCode::SubjectNotFound, ErrorCode::Conflict),
    ))
}
