use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse};

use crate::models::{ApiResponse, ErrorCode};

/// JSON 请求体解析失败时返回统一格式的响应，请求体过大返回 413，其余为 400
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                ErrorCode::PayloadTooLarge,
                "Request body is too large",
            ))
        }
        _ => {
            let message = match &err {
                JsonPayloadError::ContentType => {
                    "Content-Type must be application/json".to_string()
                }
                JsonPayloadError::Deserialize(e) => format!("Invalid request body: {e}"),
                _ => format!("Invalid JSON payload: {err}"),
            };
            tracing::debug!("JSON 参数错误: {}", message);
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message))
        }
    };
    InternalError::from_response(err, response).into()
}

/// 查询参数解析失败时返回统一格式的 400 响应
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query parameters: {err}");
    tracing::debug!("查询参数错误: {}", message);

    let response = HttpResponse::BadRequest()
        .json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    #[test]
    fn test_json_overflow_is_payload_too_large() {
        let req = TestRequest::default().to_http_request();
        let err = json_error_handler(JsonPayloadError::Overflow { limit: 16 }, &req);
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );

        let err = json_error_handler(JsonPayloadError::ContentType, &req);
        assert_eq!(err.as_response_error().status_code(), StatusCode::BAD_REQUEST);
    }
}
