use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::MessageService;
use crate::models::ErrorCode;
use crate::services::{OutcomeCodes, current_session, write_response};

pub async fn delete_message(
    service: &MessageService,
    message_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    Ok(write_response(
        storage
            .delete_message(message_id, session.user_id, session.role)
            .await,
        "Message deleted",
        OutcomeCodes::new(ErrorCode::MessageNotFound, ErrorCode::Conflict),
    ))
}
