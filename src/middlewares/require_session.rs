/*!
 * 会话校验中间件
 *
 * 从 `Authorization: Bearer <token>` 或会话 Cookie 中读取会话令牌，
 * 校验签名与有效期后还原 [`SessionContext`]，并确认用户仍然存在且角色未变。
 * 校验失败时返回 401 并清除会话 Cookie，客户端需要重新登录。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::RequireSession;
 *
 * App::new().service(
 *     web::scope("/api/v1/portal")
 *         .wrap(RequireSession)
 *         .route("/pages", web::get().to(list_pages)),
 * );
 * ```
 *
 * 处理函数中通过 [`RequireSession::extract_session`] 获取当前会话。
 */

use crate::models::ErrorCode;
use crate::session::SessionContext;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireSession;

/// 会话校验失败的原因
enum SessionRejection {
    /// 令牌无效或身份已失效，需要清除 Cookie
    Expired(&'static str),
    Missing,
    Internal(String),
}

impl SessionRejection {
    fn into_response(self) -> HttpResponse {
        match self {
            SessionRejection::Missing => create_error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Unauthorized access, please login first",
            ),
            SessionRejection::Expired(reason) => {
                let mut response = create_error_response(
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::Unauthorized,
                    reason,
                );
                if let Err(e) = response.add_cookie(&JwtUtils::create_empty_session_cookie()) {
                    error!("清除会话 Cookie 失败: {}", e);
                }
                response
            }
            SessionRejection::Internal(message) => create_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                &message,
            ),
        }
    }
}

// 辅助函数：提取令牌并还原会话
async fn extract_and_validate_session(
    req: &ServiceRequest,
) -> Result<SessionContext, SessionRejection> {
    let token = JwtUtils::extract_session_token(req.request()).ok_or(SessionRejection::Missing)?;

    let claims = JwtUtils::verify_token(&token).map_err(|err| {
        info!("Session token validation failed: {}", err);
        SessionRejection::Expired("Invalid or expired session, please login again")
    })?;

    // 无法识别的角色强制登出
    let context = SessionContext::from_claims(&claims).ok_or_else(|| {
        info!("Unrecognized role in session token: {}", claims.role);
        SessionRejection::Expired("Invalid role detected, please login again")
    })?;

    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| SessionRejection::Internal("Storage not found in app data".to_string()))?
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_id(context.user_id)
        .await
        .map_err(|e| SessionRejection::Internal(format!("Failed to load user: {e}")))?
        .ok_or(SessionRejection::Expired("User no longer exists"))?;

    if user.role != context.role {
        info!(
            "Role of user {} changed from {} to {}",
            user.id, context.role, user.role
        );
        return Err(SessionRejection::Expired(
            "Account role changed, please login again",
        ));
    }

    Ok(context)
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_session(&req).await {
                Ok(context) => {
                    debug!("Session authenticated for user ID: {}", context.user_id);
                    req.extensions_mut().insert(context);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(rejection) => {
                    info!("Session rejected for request to {}", req.path());
                    Ok(req.into_response(rejection.into_response().map_into_right_body()))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取会话信息
impl RequireSession {
    /// 从请求扩展中提取会话
    /// 此函数应该在应用了 RequireSession 中间件的路由处理程序中使用
    pub fn extract_session(req: &actix_web::HttpRequest) -> Option<SessionContext> {
        req.extensions().get::<SessionContext>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::memory_storage;
    use actix_web::{App, HttpRequest, test, web};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireSession::extract_session(&req) {
            Some(context) => HttpResponse::Ok().body(context.username),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn test_session_token_is_required_and_validated() {
        let storage = memory_storage().await;
        let user_id = storage
            .create_user("tina", "$argon2id$test", UserRole::Teacher)
            .await
            .created_id()
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .service(
                    web::scope("/me")
                        .wrap(RequireSession)
                        .route("", web::get().to(whoami)),
                ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let token = JwtUtils::generate_session_token(user_id, "Teacher", "tina").unwrap();
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "tina");

        // 角色无法识别时强制重新登录
        let forged = JwtUtils::generate_session_token(user_id, "Janitor", "tina").unwrap();
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {forged}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // 用户被删除后令牌失效
        storage.delete_user(user_id).await;
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
