use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubjectService;
use crate::models::ErrorCode;
use crate::models::subjects::requests::CreateSubjectRequest;
use crate::services::{
    OutcomeCodes, check_section_access, current_session, write_response,
};

pub async fn create_subject(
    service: &SubjectService,
    section_id: i64,
    subject_data: CreateSubjectRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    // 教师只能在自己任教的班级中创建科目
    if let Err(response) = check_section_access(storage.as_ref(), &session, section_id).await {
        return Ok(response);
    }

    Ok(write_response(
        storage
            .create_subject(&subject_data.subject_name, section_id, session.user_id)
            .await,
        "Subject created successfully",
        OutcomeCodes::new(ErrorCode::SectionNotFound, ErrorCode::SubjectAlreadyExists),
    ))
}
