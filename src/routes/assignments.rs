use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::models::users::entities::UserRole;
use crate::services::AssignmentService;
use crate::utils::SafeIDI64;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

pub async fn list_assignments(
    req: HttpRequest,
    section_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_assignments(section_id.0, &req).await
}

pub async fn create_assignment(
    req: HttpRequest,
    section_id: SafeIDI64,
    assignment: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(section_id.0, assignment.into_inner(), &req)
        .await
}

pub async fn delete_assignment(
    req: HttpRequest,
    assignment_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .delete_assignment(assignment_id.0, &req)
        .await
}

// 配置路由
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
            .wrap(middlewares::RequireSession)
            .route("/{id}", web::delete().to(delete_assignment)),
    );
}
