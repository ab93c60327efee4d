use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::{AddGradeRequest, UpdateGradeRequest};
use crate::models::users::entities::UserRole;
use crate::services::GradeService;
use crate::utils::SafeIDI64;

// 懒加载的全局 GradeService 实例
static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn add_grade(
    req: HttpRequest,
    grade_data: web::Json<AddGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.add_grade(grade_data.into_inner(), &req).await
}

pub async fn update_grade(
    req: HttpRequest,
    grade_id: SafeIDI64,
    update_data: web::Json<UpdateGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .update_grade(grade_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_grade(req: HttpRequest, grade_id: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.delete_grade(grade_id.0, &req).await
}

pub async fn list_section_grades(
    req: HttpRequest,
    section_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_section_grades(section_id.0, &req).await
}

pub async fn list_my_grades(req: HttpRequest) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_my_grades(&req).await
}

// 配置路由
pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireSession)
            // 学生查看自己的成绩
            .service(
                web::resource("/me").route(
                    web::get()
                        .to(list_my_grades)
                        .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                ),
            )
            // 录入成绩 - 教师和管理员，业务层校验班级
            .service(
                web::resource("").route(
                    web::post()
                        .to(add_grade)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            // 修改与删除 - 仅任教该班级的教师
            .service(
                web::resource("/{id}")
                    .route(web::put().to(update_grade))
                    .route(web::delete().to(delete_grade))
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
            ),
    );
}
