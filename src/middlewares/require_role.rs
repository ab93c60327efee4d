/*!
 * 基于角色的访问控制中间件
 *
 * 此中间件必须在 RequireSession 中间件之后使用，用于验证当前会话是否具有特定角色。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::{RequireRole, RequireSession};
 * use crate::models::users::entities::UserRole;
 *
 * App::new().service(
 *     web::scope("/api/v1/users")
 *         .wrap(RequireRole::new(&UserRole::Admin))  // 再验证角色
 *         .wrap(RequireSession)                     // 先验证会话
 *         .route("", web::get().to(list_users)),
 * );
 * ```
 *
 * 或者验证多个角色：
 *
 * ```rust,ignore
 * .wrap(RequireRole::new_any(UserRole::staff_roles()))  // 任一角色即可
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{ErrorCode, users::entities::UserRole};
use crate::session::SessionContext;

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<UserRole>,
}

impl RequireRole {
    /// 创建需要特定角色的中间件
    pub fn new(role: &UserRole) -> Self {
        Self {
            required_roles: vec![*role],
        }
    }

    /// 创建需要任一角色的中间件
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            required_roles: roles.iter().map(|r| **r).collect(),
        }
    }

    fn allows(required_roles: &[UserRole], role: UserRole) -> bool {
        required_roles.contains(&role)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<UserRole>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let required_roles = self.required_roles.clone();

        Box::pin(async move {
            let session = req.extensions().get::<SessionContext>().cloned();

            match session {
                Some(session) if RequireRole::allows(&required_roles, session.role) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some(session) => {
                    info!(
                        "用户 {} ({}) 访问 {} 被拒绝，需要角色: {:?}",
                        session.username,
                        session.role,
                        req.path(),
                        required_roles
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            "Your role is not allowed to access this resource",
                        )
                        .map_into_right_body(),
                    ))
                }
                None => {
                    // RequireSession 未挂载在外层
                    info!("角色校验时未找到会话: {}", req.path());
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::RequireSession;
    use crate::storage::memory_storage;
    use crate::utils::jwt::JwtUtils;
    use actix_web::{App, HttpResponse, test, web};

    #[::core::prelude::v1::test]
    fn test_allows() {
        let staff = RequireRole::new_any(UserRole::staff_roles());
        assert!(RequireRole::allows(&staff.required_roles, UserRole::Teacher));
        assert!(RequireRole::allows(&staff.required_roles, UserRole::Admin));
        assert!(!RequireRole::allows(&staff.required_roles, UserRole::Student));
    }

    #[actix_web::test]
    async fn test_role_is_enforced_after_session() {
        let storage = memory_storage().await;
        let student_id = storage
            .create_user("sam", "$argon2id$test", UserRole::Student)
            .await
            .created_id()
            .unwrap();
        let admin_id = storage
            .create_user("root", "$argon2id$test", UserRole::Admin)
            .await
            .created_id()
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .service(
                    web::scope("/admin")
                        .wrap(RequireRole::new(&UserRole::Admin))
                        .wrap(RequireSession)
                        .route("", web::get().to(|| async { HttpResponse::Ok().finish() })),
                ),
        )
        .await;

        let token = JwtUtils::generate_session_token(student_id, "Student", "sam").unwrap();
        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let token = JwtUtils::generate_session_token(admin_id, "Admin", "root").unwrap();
        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
