use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RecommendationService;
use crate::models::recommendations::entities::Topic;
use crate::models::recommendations::requests::AddRecommendationRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{
    OutcomeCodes, check_section_access, current_session, read_failure, write_response,
};
use crate::session::SessionContext;
use crate::storage::Storage;

const RECOMMENDATION_CODES: OutcomeCodes =
    OutcomeCodes::new(ErrorCode::RecommendationNotFound, ErrorCode::Conflict)
        .invalid(ErrorCode::RecommendationInvalid);

/// 话题必须存在且属于当前用户所在的班级
async fn accessible_topic(
    storage: &dyn Storage,
    session: &SessionContext,
    topic_id: i64,
) -> Result<Topic, HttpResponse> {
    let topic = match storage.get_topic(topic_id).await {
        Ok(Some(topic)) => topic,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TopicNotFound,
                "Topic not found",
            )));
        }
        Err(e) => return Err(read_failure("查询话题", e)),
    };
    check_section_access(storage, session, topic.section_id).await?;
    Ok(topic)
}

pub async fn list_recommendations(
    service: &RecommendationService,
    topic_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    if let Err(response) = accessible_topic(storage.as_ref(), &session, topic_id).await {
        return Ok(response);
    }

    match storage.list_topic_recommendations(topic_id).await {
        Ok(recommendations) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            recommendations,
            "Recommendations retrieved successfully",
        ))),
        Err(e) => Ok(read_failure("获取视频推荐", e)),
    }
}

pub async fn add_recommendation(
    service: &RecommendationService,
    topic_id: i64,
    recommendation: AddRecommendationRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    if let Err(response) = accessible_topic(storage.as_ref(), &session, topic_id).await {
        return Ok(response);
    }

    Ok(write_response(
        storage
            .add_video_recommendation(
                topic_id,
                &recommendation.video_url,
                session.user_id,
                recommendation.title.as_deref(),
            )
            .await,
        "Recommendation added",
        RECOMMENDATION_CODES,
    ))
}

pub async fn delete_recommendation(
    service: &RecommendationService,
    recommendation_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let session = match current_session(request) {
        Ok(session) => session,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    Ok(write_response(
        storage
            .delete_video_recommendation(recommendation_id, session.user_id)
            .await,
        "Recommendation deleted",
        RECOMMENDATION_CODES,
    ))
}
