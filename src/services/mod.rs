pub mod assignments;
pub mod auth;
pub mod files;
pub mod grades;
pub mod messages;
pub mod portal;
pub mod recommendations;
pub mod sections;
pub mod subjects;
pub mod users;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use files::FileService;
pub use grades::GradeService;
pub use messages::MessageService;
pub use portal::PortalService;
pub use recommendations::RecommendationService;
pub use sections::SectionService;
pub use subjects::SubjectService;
pub use users::UserService;

use actix_web::HttpRequest;
use actix_web::HttpResponse;
use tracing::{error, warn};

use crate::errors::PortalError;
use crate::middlewares::RequireSession;
use crate::models::sections::entities::Section;
use crate::models::{ApiResponse, CreatedResponse, ErrorCode, WriteOutcome};
use crate::session::{LoginRequired, SessionContext};
use crate::storage::Storage;

/// 写操作失败时使用的业务错误码
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutcomeCodes {
    pub not_found: ErrorCode,
    pub conflict: ErrorCode,
    pub invalid: ErrorCode,
}

impl OutcomeCodes {
    pub const fn new(not_found: ErrorCode, conflict: ErrorCode) -> Self {
        Self {
            not_found,
            conflict,
            invalid: ErrorCode::BadRequest,
        }
    }

    pub const fn invalid(mut self, invalid: ErrorCode) -> Self {
        self.invalid = invalid;
        self
    }
}

/// 把写操作结果转换为 HTTP 响应
pub(crate) fn write_response(
    outcome: WriteOutcome,
    success_message: &str,
    codes: OutcomeCodes,
) -> HttpResponse {
    match outcome {
        WriteOutcome::Created(id) => HttpResponse::Created().json(ApiResponse::success(
            CreatedResponse { id },
            success_message,
        )),
        WriteOutcome::Updated | WriteOutcome::Deleted => {
            HttpResponse::Ok().json(ApiResponse::success_empty(success_message))
        }
        WriteOutcome::AlreadyExists => HttpResponse::Conflict().json(ApiResponse::error_empty(
            codes.conflict,
            "Record already exists",
        )),
        WriteOutcome::NotFound => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(codes.not_found, "Record not found")),
        WriteOutcome::Forbidden => HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You are not allowed to perform this operation",
        )),
        WriteOutcome::Invalid(reason) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(codes.invalid, reason))
        }
        WriteOutcome::Failed => HttpResponse::InternalServerError().json(
            ApiResponse::error_empty(ErrorCode::InternalServerError, "Storage operation failed"),
        ),
    }
}

/// 读操作的存储故障统一返回 500
pub(crate) fn read_failure(action: &str, e: PortalError) -> HttpResponse {
    error!("{}失败: {}", action, e);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("{action} failed: {}", e.message()),
    ))
}

/// 取出当前会话；路由未挂载 RequireSession 时返回 401
pub(crate) fn current_session(request: &HttpRequest) -> Result<SessionContext, HttpResponse> {
    RequireSession::extract_session(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            LoginRequired.to_string(),
        ))
    })
}

/// 确认班级存在且当前用户属于该班级
pub(crate) async fn check_section_access(
    storage: &dyn Storage,
    session: &SessionContext,
    section_id: i64,
) -> Result<Section, HttpResponse> {
    let section = match storage.get_section_by_id(section_id).await {
        Ok(Some(section)) => section,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SectionNotFound,
                "Section not found",
            )));
        }
        Err(e) => return Err(read_failure("查询班级", e)),
    };

    match storage
        .is_section_member(session.user_id, session.role, section_id)
        .await
    {
        Ok(true) => Ok(section),
        Ok(false) => {
            warn!(
                "用户 {} ({}) 无权访问班级 {}",
                session.username, session.role, section_id
            );
            Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::SectionPermissionDenied,
                "You are not a member of this section",
            )))
        }
        Err(e) => Err(read_failure("校验班级成员", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    const CODES: OutcomeCodes = OutcomeCodes::new(ErrorCode::NotFound, ErrorCode::Conflict);

    #[test]
    fn test_write_response_status() {
        let cases = [
            (WriteOutcome::Created(1), StatusCode::CREATED),
            (WriteOutcome::Updated, StatusCode::OK),
            (WriteOutcome::Deleted, StatusCode::OK),
            (WriteOutcome::AlreadyExists, StatusCode::CONFLICT),
            (WriteOutcome::NotFound, StatusCode::NOT_FOUND),
            (WriteOutcome::Forbidden, StatusCode::FORBIDDEN),
            (WriteOutcome::Invalid("bad".into()), StatusCode::BAD_REQUEST),
            (WriteOutcome::Failed, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (outcome, status) in cases {
            assert_eq!(write_response(outcome, "ok", CODES).status(), status);
        }
    }

    #[actix_web::test]
    async fn test_created_response_carries_id() {
        let response = write_response(WriteOutcome::Created(9), "created", CODES);
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let parsed: ApiResponse<CreatedResponse> = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.data.map(|d| d.id), Some(9));
        assert_eq!(parsed.message, "created");
    }
}
