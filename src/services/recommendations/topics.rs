use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RecommendationService;
use crate::models::recommendations::requests::CreateTopicRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{
    OutcomeCodes, check_section_access, current_session, read_failure, write_response,
};

const TOPIC_CODES: OutcomeCodes =
    OutcomeCodes::new(ErrorCode::TopicNotFound, ErrorCode::TopicAlreadyExists);

pub async fn list_topics(
    service: &RecommendationService,
    section_id: i64,
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

    match storage.list_section_topics(section_id).await {
        Ok(topics) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            topics,
            "Topic list retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取话题列表", e)),
    }
}

pub async fn create_topic(
    service: &RecommendationService,
    section_id: i64,
    topic: CreateTopicRequest,
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
            .create_topic(&topic.topic_name, section_id, session.user_id)
            .await,
        "Topic created successfully",
        TOPIC_CODES,
    ))
}

pub async fn delete_topic(
    service: &RecommendationService,
    topic_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    Ok(write_response(
        storage.delete_topic(topic_id, session.user_id).await,
        "Topic deleted successfully",
        TOPIC_CODES,
    ))
}
