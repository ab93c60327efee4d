use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::PortalService;
use crate::services::portal::PageQuery;

// 懒加载的全局 PortalService 实例
static PORTAL_SERVICE: Lazy<PortalService> = Lazy::new(PortalService::new_lazy);

pub async fn list_pages(req: HttpRequest) -> ActixResult<HttpResponse> {
    PORTAL_SERVICE.list_pages(&req).await
}

pub async fn show_page(
    req: HttpRequest,
    page: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ActixResult<HttpResponse> {
    PORTAL_SERVICE
        .show_page(page.into_inner(), query.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_portal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/portal")
            .wrap(middlewares::RequireSession)
            .route("/pages", web::get().to(list_pages))
            .route("/pages/{page}", web::get().to(show_page)),
    );
}
