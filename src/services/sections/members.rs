use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SectionService;
use crate::models::sections::requests::AssignMemberRequest;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{
    OutcomeCodes, check_section_access, current_session, read_failure, write_response,
};

const MEMBER_CODES: OutcomeCodes =
    OutcomeCodes::new(ErrorCode::NotFound, ErrorCode::SectionAlreadyJoined)
        .invalid(ErrorCode::SectionAssignFailed);

pub async fn assign_member(
    service: &SectionService,
    section_id: i64,
    role: UserRole,
    member: AssignMemberRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let outcome = match role {
        UserRole::Teacher => {
            storage
                .assign_teacher_to_section(member.user_id, section_id)
                .await
        }
        UserRole::Student => {
            storage
                .assign_student_to_section(member.user_id, section_id)
                .await
        }
        UserRole::Admin => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::SectionAssignFailed,
                "Administrators cannot be assigned to a section",
            )));
        }
    };

    Ok(write_response(
        outcome,
        "Member assigned successfully",
        MEMBER_CODES,
    ))
}

pub async fn list_students(
    service: &SectionService,
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

    match storage.list_section_students(section_id).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            students,
            "Student list retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取班级学生", e)),
    }
}
