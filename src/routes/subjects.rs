use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::subjects::requests::CreateSubjectRequest;
use crate::models::users::entities::UserRole;
use crate::services::SubjectService;
use crate::utils::SafeIDI64;

// 懒加载的全局 SubjectService 实例
static SUBJECT_SERVICE: Lazy<SubjectService> = Lazy::new(SubjectService::new_lazy);

pub async fn list_subjects(req: HttpRequest, section_id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.list_subjects(section_id.0, &req).await
}

pub async fn create_subject(
    req: HttpRequest,
    section_id: SafeIDI64,
    subject_data: web::Json<CreateSubjectRequest>,
) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE
        .create_subject(section_id.0, subject_data.into_inner(), &req)
        .await
}

pub async fn delete_subject(req: HttpRequest, subject_id: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBJECT_SERVICE.delete_subject(subject_id.0, &req).await
}

// 配置路由
pub fn configure_subject_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/subjects")
            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireSession)
            .route("/{id}", web::delete().to(delete_subject)),
    );
}
