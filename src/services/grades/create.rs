use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GRADE_CODES, GradeService};
use crate::models::grades::requests::AddGradeRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{check_section_access, current_session, read_failure, write_response};

pub async fn add_grade(
    service: &GradeService,
    grade_data: AddGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    // 1. 科目必须存在
    let subject = match storage.get_subject(grade_data.subject_id).await {
        Ok(Some(subject)) => subject,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubjectNotFound,
                "Subject not found",
            )));
        }
        Err(e) => return Ok(read_failure("查询科目", e)),
    };

    // 2. 只能给自己任教班级的科目录入成绩
    if let Err(response) =
        check_section_access(storage.as_ref(), &session, subject.section_id).await
    {
        return Ok(response);
    }

    Ok(write_response(
        storage
            .add_grade(grade_data.student_id, grade_data.subject_id, grade_data.grade)
            .await,
        "Grade added successfully",
        GRADE_CODES,
    ))
}
