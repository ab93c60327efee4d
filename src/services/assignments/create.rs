use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::ErrorCode;
use crate::models::assignments::{entities::NewAssignment, requests::CreateAssignmentRequest};
use crate::services::{
    OutcomeCodes, check_section_access, current_session, write_response,
};

pub async fn create_assignment(
    service: &AssignmentService,
    section_id: i64,
    assignment: CreateAssignmentRequest,
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

    let new_assignment = NewAssignment {
        title: assignment.title,
        description: assignment.description,
        due_date: assignment.due_date,
        section_id,
        max_grade: assignment.max_grade,
    };

    Ok(write_response(
        storage.create_assignment(new_assignment).await,
        "Assignment created successfully",
        OutcomeCodes::new(ErrorCode::SectionNotFound, ErrorCode::Conflict),
    ))
}
