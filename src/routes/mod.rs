pub mod auth;

pub mod portal;

pub mod users;

pub mod sections;

pub mod files;

pub mod grades;

pub mod subjects;

pub mod messages;

pub mod recommendations;

pub mod assignments;

pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use files::configure_file_routes;
pub use grades::configure_grade_routes;
pub use messages::configure_message_routes;
pub use portal::configure_portal_routes;
pub use recommendations::configure_recommendation_routes;
pub use sections::configure_section_routes;
pub use subjects::configure_subject_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_portal_routes)
        .configure(configure_user_routes)
        .configure(configure_section_routes)
        .configure(configure_file_routes)
        .configure(configure_grade_routes)
        .configure(configure_subject_routes)
        .configure(configure_message_routes)
        .configure(configure_recommendation_routes)
        .configure(configure_assignment_routes);
}
