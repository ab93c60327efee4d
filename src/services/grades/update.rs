use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GRADE_CODES, GradeService};
use crate::models::grades::requests::UpdateGradeRequest;
use crate::services::{current_session, write_response};

pub async fn update_grade(
    service: &GradeService,
    grade_id: i64,
    update_data: UpdateGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    Ok(write_response(
        storage
            .update_grade(grade_id, update_data.grade, session.user_id)
            .await,
        "Grade updated successfully",
        GRADE_CODES,
    ))
}

pub async fn delete_grade(
    service: &GradeService,
    grade_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    Ok(write_response(
        storage.delete_grade(grade_id, session.user_id).await,
        "Grade deleted successfully",
        GRADE_CODES,
    ))
}
