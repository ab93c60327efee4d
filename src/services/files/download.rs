use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FileService;
use crate::models::files::entities::FileKind;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{check_section_access, current_session, read_failure};

/// 附件响应头，文件名中的引号由 ContentDisposition 转义
fn attachment(filename: &str) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename.to_string())],
    }
}

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    file_id: i64,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    let stored = match storage.get_file(file_id).await {
        Ok(Some(f)) => f,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File not found",
            )));
        }
        Err(e) => return Ok(read_failure("查询文件", e)),
    };

    // 只有班级成员可以下载
    if let Err(response) =
        check_section_access(storage.as_ref(), &session, stored.info.section_id).await
    {
        return Ok(response);
    }

    let content_type = match stored.info.file_type {
        FileKind::Pdf => "application/pdf",
        FileKind::Video => "application/octet-stream",
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header(attachment(&stored.info.filename))
        .body(stored.data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_escapes_quotes() {
        assert_eq!(
            attachment("notes.pdf").to_string(),
            "attachment; filename=\"notes.pdf\""
        );
        assert_eq!(
            attachment("a\".pdf").to_string(),
            "attachment; filename=\"a\\\".pdf\""
        );
    }
}
