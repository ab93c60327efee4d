use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SectionService;
use crate::models::ErrorCode;
use crate::models::sections::requests::CreateSectionRequest;
use crate::services::{OutcomeCodes, write_response};

pub async fn create_section(
    service: &SectionService,
    section_data: CreateSectionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    Ok(write_response(
        storage.create_section(&section_data.section_name).await,
        "Section created successfully",
        OutcomeCodes::new(ErrorCode::SectionNotFound, ErrorCode::SectionAlreadyExists)
            .invalid(ErrorCode::SectionNameInvalid),
    ))
}
