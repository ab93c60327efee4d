use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::recommendations::requests::{AddRecommendationRequest, CreateTopicRequest};
use crate::services::RecommendationService;
use crate::utils::SafeIDI64;

// 懒加载的全局 RecommendationService 实例
static RECOMMENDATION_SERVICE: Lazy<RecommendationService> =
    Lazy::new(RecommendationService::new_lazy);

pub async fn list_topics(req: HttpRequest, section_id: SafeIDI64) -> ActixResult<HttpResponse> {
    RECOMMENDATION_SERVICE.list_topics(section_id.0, &req).await
}

pub async fn create_topic(
    req: HttpRequest,
    section_id: SafeIDI64,
    topic: web::Json<CreateTopicRequest>,
) -> ActixResult<HttpResponse> {
    RECOMMENDATION_SERVICE
        .create_topic(section_id.0, topic.into_inner(), &req)
        .await
}

pub async fn delete_topic(req: HttpRequest, topic_id: SafeIDI64) -> ActixResult<HttpResponse> {
    RECOMMENDATION_SERVICE.delete_topic(topic_id.0, &req).await
}

pub async fn list_recommendations(
    req: HttpRequest,
    topic_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    RECOMMENDATION_SERVICE
        .list_recommendations(topic_id.0, &req)
        .await
}

pub async fn add_recommendation(
    req: HttpRequest,
    topic_id: SafeIDI64,
    recommendation: web::Json<AddRecommendationRequest>,
) -> ActixResult<HttpResponse> {
    RECOMMENDATION_SERVICE
        .add_recommendation(topic_id.0, recommendation.into_inner(), &req)
        .await
}

pub async fn delete_recommendation(
    req: HttpRequest,
    recommendation_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    RECOMMENDATION_SERVICE
        .delete_recommendation(recommendation_id.0, &req)
        .await
}

// 配置路由
pub fn configure_recommendation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/topics")
            .wrap(middlewares::RequireSession)
            .route("/{id}", web::delete().to(delete_topic))
            .route("/{id}/recommendations", web::get().to(list_recommendations))
            .route("/{id}/recommendations", web::post().to(add_recommendation)),
    )
    .service(
        web::scope("/api/v1/recommendations")
            .wrap(middlewares::RequireSession)
            .route("/{id}", web::delete().to(delete_recommendation)),
    );
}
