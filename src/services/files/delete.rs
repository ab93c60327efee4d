use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FileService;
use crate::models::ErrorCode;
use crate::services::{OutcomeCodes, current_session, write_response};

pub async fn delete_file(
    service: &FileService,
    request: &HttpRequest,
    file_id: i64,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    // 只有上传者可以删除
    Ok(write_response(
        storage.delete_file(file_id, session.user_id).await,
        "File deleted successfully",
        OutcomeCodes::new(ErrorCode::FileNotFound, ErrorCode::Conflict),
    ))
}
