use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::messages::requests::SendMessageRequest;
use crate::services::MessageService;
use crate::utils::SafeIDI64;

// 懒加载的全局 MessageService 实例
static MESSAGE_SERVICE: Lazy<MessageService> = Lazy::new(MessageService::new_lazy);

pub async fn list_messages(req: HttpRequest, section_id: SafeIDI64) -> ActixResult<HttpResponse> {
    MESSAGE_SERVICE.list_messages(section_id.0, &req).await
}

pub async fn send_message(
    req: HttpRequest,
    section_id: SafeIDI64,
    message: web::Json<SendMessageRequest>,
) -> ActixResult<HttpResponse> {
    MESSAGE_SERVICE
        .send_message(section_id.0, message.into_inner(), &req)
        .await
}

pub async fn delete_message(req: HttpRequest, message_id: SafeIDI64) -> ActixResult<HttpResponse> {
    MESSAGE_SERVICE.delete_message(message_id.0, &req).await
}

// 配置路由
pub fn configure_message_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/messages")
            .wrap(middlewares::RequireSession)
            .route("/{id}", web::delete().to(delete_message)),
    );
}
