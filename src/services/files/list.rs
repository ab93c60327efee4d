use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FileService;
use crate::models::ApiResponse;
use crate::models::files::entities::FileKind;
use crate::services::{check_section_access, current_session, read_failure};

pub async fn list_files(
    service: &FileService,
    request: &HttpRequest,
    section_id: i64,
    kind: Option<FileKind>,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    if let Err(response) = check_section_access(storage.as_ref(), &session, section_id).await {
        return Ok(response);
    }

    match storage.list_section_files(section_id, kind).await {
        Ok(files) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            files,
            "File list retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取文件列表", e)),
    }
}
