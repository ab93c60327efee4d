use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::FileService;
use crate::services::files::FileKindQuery;
use crate::utils::SafeIDI64;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn handle_upload(
    request: HttpRequest,
    section_id: SafeIDI64,
    query: web::Query<FileKindQuery>,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE
        .handle_upload(&request, section_id.0, query.into_inner(), payload)
        .await
}

pub async fn list_files(
    request: HttpRequest,
    section_id: SafeIDI64,
    query: web::Query<FileKindQuery>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE
        .list_files(&request, section_id.0, query.into_inner())
        .await
}

pub async fn handle_download(
    request: HttpRequest,
    file_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_download(&request, file_id.0).await
}

pub async fn delete_file(request: HttpRequest, file_id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.delete_file(&request, file_id.0).await
}

// 配置路由
pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/files")
            .wrap(middlewares::RequireSession)
            .route("/{id}", web::delete().to(delete_file))
            .route("/{id}/download", web::get().to(handle_download)),
    );
}
