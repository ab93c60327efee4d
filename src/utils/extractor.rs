//! 路径参数提取器
//!
//! 路由中的 `{id}` 必须是正整数，否则直接返回统一格式的 400 响应，
//! 处理函数不需要再自己校验。

use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 路径中的 `{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeIDI64(pub i64);

fn parse_positive_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|id| *id > 0)
}

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("id");
        ready(match parse_positive_id(raw) {
            Some(id) => Ok(SafeIDI64(id)),
            None => {
                let message = format!("Invalid id: {}", raw.unwrap_or_default());
                tracing::debug!("路径参数错误: {}", message);
                let response = HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
                Err(InternalError::from_response(message, response).into())
            }
        })
    }
}
