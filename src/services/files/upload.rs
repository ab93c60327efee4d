use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;

use super::FileService;
use crate::config::{AppConfig, UploadConfig};
use crate::models::files::entities::{FileKind, NewFile};
use crate::models::{ApiResponse, ErrorCode, WriteOutcome, files::responses::FileUploadResponse};
use crate::services::{OutcomeCodes, check_section_access, current_session, write_response};
use crate::utils::validate::{file_extension, normalize_filename};
use crate::utils::validate_magic_bytes;

/// 根据扩展名确定文件类别；指定了类别时扩展名必须属于该类别
fn kind_for_extension(
    config: &UploadConfig,
    extension: &str,
    requested: Option<FileKind>,
) -> Option<FileKind> {
    let allowed = |list: &[String]| list.iter().any(|ext| ext.eq_ignore_ascii_case(extension));
    let kind = if allowed(&config.pdf_extensions) {
        FileKind::Pdf
    } else if allowed(&config.video_extensions) {
        FileKind::Video
    } else {
        return None;
    };
    match requested {
        Some(requested) if requested != kind => None,
        _ => Some(kind),
    }
}

pub async fn handle_upload(
    service: &FileService,
    req: &HttpRequest,
    section_id: i64,
    requested_kind: Option<FileKind>,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let session = match current_session(req) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(req);

    // 只能上传到自己任教的班级
    if let Err(response) = check_section_access(storage.as_ref(), &session, section_id).await {
        return Ok(response);
    }

    let config = &AppConfig::get().upload;

    // 文件相关信息
    let mut upload: Option<(String, FileKind, Vec<u8>)> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name != "file" {
            continue;
        }
        if upload.is_some() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            )));
        }

        // 规范化文件名并校验扩展名
        let filename = normalize_filename(
            content_disposition
                .and_then(|cd| cd.get_filename())
                .unwrap_or_default(),
        );
        let extension = file_extension(&filename).unwrap_or_default();
        let Some(kind) = kind_for_extension(config, &extension, requested_kind) else {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileTypeNotAllowed,
                "File type not allowed",
            )));
        };

        let mut data = Vec::new();
        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;

            // 第一个 chunk 时验证魔术字节
            if first_chunk {
                first_chunk = false;
                if !validate_magic_bytes(&chunk, &extension) {
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::FileTypeNotAllowed,
                        "文件内容与扩展名不匹配",
                    )));
                }
            }

            // 校验大小
            if data.len() + chunk.len() > config.max_size {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileSizeExceeded,
                    "File size exceeds the limit",
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileUploadFailed,
                "Uploaded file is empty",
            )));
        }
        upload = Some((filename, kind, data));
    }

    let Some((filename, kind, data)) = upload else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        )));
    };

    let size = data.len() as i64;
    let outcome = storage
        .add_file(NewFile {
            filename: filename.clone(),
            kind,
            data,
            uploaded_by: session.user_id,
            section_id,
        })
        .await;

    match outcome {
        WriteOutcome::Created(id) => Ok(HttpResponse::Created().json(ApiResponse::success(
            FileUploadResponse {
                id,
                filename,
                size,
                file_type: kind,
            },
            "File uploaded successfully",
        ))),
        other => Ok(write_response(
            other,
            "File uploaded successfully",
            OutcomeCodes::new(ErrorCode::SectionNotFound, ErrorCode::Conflict)
                .invalid(ErrorCode::FileUploadFailed),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_extension() {
        let config = UploadConfig::default();
        assert_eq!(kind_for_extension(&config, "pdf", None), Some(FileKind::Pdf));
        assert_eq!(kind_for_extension(&config, "MP4", None), Some(FileKind::Video));
        assert_eq!(kind_for_extension(&config, "exe", None), None);
        assert_eq!(
            kind_for_extension(&config, "pdf", Some(FileKind::Pdf)),
            Some(FileKind::Pdf)
        );
        // 上传讲义页面不接受视频
        assert_eq!(kind_for_extension(&config, "mkv", Some(FileKind::Pdf)), None);
    }
}
