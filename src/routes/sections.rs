use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::{assignments, files, grades, messages, recommendations, subjects};
use crate::middlewares;
use crate::models::sections::requests::{AssignMemberRequest, CreateSectionRequest};
use crate::models::users::entities::UserRole;
use crate::services::SectionService;
use crate::utils::SafeIDI64;

// 懒加载的全局 SectionService 实例
static SECTION_SERVICE: Lazy<SectionService> = Lazy::new(SectionService::new_lazy);

pub async fn list_sections(req: HttpRequest) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.list_sections(&req).await
}

pub async fn create_section(
    req: HttpRequest,
    section_data: web::Json<CreateSectionRequest>,
) -> ActixResult<HttpResponse> {
    SECTION_SERVICE
        .create_section(section_data.into_inner(), &req)
        .await
}

pub async fn delete_section(req: HttpRequest, section_id: SafeIDI64) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.delete_section(section_id.0, &req).await
}

pub async fn assign_teacher(
    req: HttpRequest,
    section_id: SafeIDI64,
    member: web::Json<AssignMemberRequest>,
) -> ActixResult<HttpResponse> {
    SECTION_SERVICE
        .assign_member(section_id.0, UserRole::Teacher, member.into_inner(), &req)
        .await
}

pub async fn assign_student(
    req: HttpRequest,
    section_id: SafeIDI64,
    member: web::Json<AssignMemberRequest>,
) -> ActixResult<HttpResponse> {
    SECTION_SERVICE
        .assign_member(section_id.0, UserRole::Student, member.into_inner(), &req)
        .await
}

pub async fn list_students(req: HttpRequest, section_id: SafeIDI64) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.list_students(section_id.0, &req).await
}

// 配置路由
// 班级下的科目、成绩、聊天、文件、话题与作业都挂在 /sections/{id} 下，成员资格在业务层检查
pub fn configure_section_routes(cfg: &mut web::ServiceConfig) {
    let admin_only = || middlewares::RequireRole::new_any(UserRole::admin_roles());
    let staff_only = || middlewares::RequireRole::new_any(UserRole::staff_roles());

    cfg.service(
        web::scope("/api/v1/sections")
            .wrap(middlewares::RequireSession)
            .service(
                web::resource("")
                    // 班级列表 - 学生与教师只看到自己的班级
                    .route(web::get().to(list_sections))
                    // 创建班级 - 仅管理员
                    .route(web::post().to(create_section).wrap(admin_only())),
            )
            .service(
                web::resource("/{id}").route(web::delete().to(delete_section).wrap(admin_only())),
            )
            .service(
                web::resource("/{id}/teachers")
                    .route(web::post().to(assign_teacher).wrap(admin_only())),
            )
            .service(
                web::resource("/{id}/students")
                    .route(web::get().to(list_students))
                    .route(web::post().to(assign_student).wrap(admin_only())),
            )
            .service(
                web::resource("/{id}/subjects")
                    .route(web::get().to(subjects::list_subjects))
                    .route(web::post().to(subjects::create_subject).wrap(staff_only())),
            )
            .service(
                web::resource("/{id}/grades")
                    .route(web::get().to(grades::list_section_grades).wrap(staff_only())),
            )
            .service(
                web::resource("/{id}/messages")
                    .route(web::get().to(messages::list_messages))
                    .route(web::post().to(messages::send_message)),
            )
            .service(
                web::resource("/{id}/files")
                    .route(web::get().to(files::list_files))
                    .route(web::post().to(files::handle_upload).wrap(staff_only())),
            )
            .service(
                web::resource("/{id}/topics")
                    .route(web::get().to(recommendations::list_topics))
                    .route(web::post().to(recommendations::create_topic)),
            )
            .service(
                web::resource("/{id}/assignments")
                    .route(web::get().to(assignments::list_assignments))
                    .route(
                        web::post()
                            .to(assignments::create_assignment)
                            .wrap(staff_only()),
                    ),
            ),
    );
}
