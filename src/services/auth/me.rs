use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::ApiResponse;
use crate::models::auth::responses::SessionResponse;
use crate::services::current_session;
use crate::session::SessionState;

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let context = match current_session(request) {
        Ok(context) => context,
        Err(response) => return Ok(response),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SessionResponse {
            session: SessionState::from(context).snapshot(),
        },
        "Session retrieved successfully",
    )))
}
