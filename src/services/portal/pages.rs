use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PageQuery, PortalService};
use crate::models::{ApiResponse, ErrorCode};
use crate::portal::{self, DispatchError, Page, PageContext};
use crate::services::{current_session, read_failure};

pub async fn list_pages(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        portal::menu_items(session.role),
        "Menu retrieved successfully",
    )))
}

pub async fn show_page(
    service: &PortalService,
    page: &str,
    query: PageQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };

    let page = match page.parse::<Page>() {
        Ok(page) => page,
        Err(e) => {
            info!("未知页面: {}", page);
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::NotFound, e)));
        }
    };

    let storage = service.get_storage(request);
    let ctx = PageContext {
        session: &session,
        storage: storage.as_ref(),
        section_id: query.section_id,
    };

    match portal::dispatch(&ctx, page).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view, "Page loaded"))),
        Err(e) => Ok(dispatch_failure(e)),
    }
}

fn dispatch_failure(e: DispatchError) -> HttpResponse {
    let message = e.to_string();
    match e {
        DispatchError::PageNotAvailable { .. } => HttpResponse::Forbidden()
            .json(ApiResponse::error_empty(ErrorCode::PageNotAvailable, message)),
        DispatchError::SectionNotFound(_) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::SectionNotFound, message)),
        DispatchError::SectionAccessDenied(_) => HttpResponse::Forbidden().json(
            ApiResponse::error_empty(ErrorCode::SectionPermissionDenied, message),
        ),
        DispatchError::Storage(e) => read_failure("加载页面", e),
    }
}
