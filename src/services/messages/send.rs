use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::MessageService;
use crate::models::ErrorCode;
use crate::models::messages::requests::SendMessageRequest;
use crate::services::{
    OutcomeCodes, check_section_access, current_session, write_response,
};

pub async fn send_message(
    service: &MessageService,
    section_id: i64,
    message: SendMessageRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    if let Err(response) = check_section_access(storage.as_ref(), &session, section_id).await {
        return Ok(response);
    }

    Ok(write_response(
        storage
            .save_message(section_id, session.user_id, &message.content)
            .await,
        "Message sent",
        OutcomeCodes::new(ErrorCode::SectionNotFound, ErrorCode::Conflict)
            .invalid(ErrorCode::MessageInvalid),
    ))
}
