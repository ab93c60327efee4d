pub mod delete;
pub mod list;
pub mod send;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::messages::requests::SendMessageRequest;
use crate::storage::Storage;

pub struct MessageService {
    storage: Option<Arc<dyn Storage>>,
}

impl MessageService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 班级聊天记录
    pub async fn list_messages(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_messages(self, section_id, request).await
    }

    // 发送消息
    pub async fn send_message(
        &self,
        section_id: i64,
        message: SendMessageRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        send::send_message(self, section_id, message, request).await
    }

    // 删除消息
    pub async fn delete_message(
        &self,
        message_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_message(self, message_id, request).await
    }
}
