use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SectionService;
use crate::models::ErrorCode;
use crate::services::{OutcomeCodes, write_response};

pub async fn delete_section(
    service: &SectionService,
    section_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    Ok(write_response(
        storage.delete_section(section_id).await,
        "Section deleted successfully",
        OutcomeCodes::new(ErrorCode::SectionNotFound, ErrorCode::Conflict),
    ))
}
