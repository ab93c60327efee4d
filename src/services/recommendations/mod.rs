pub mod topics;
pub mod videos;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::recommendations::requests::{AddRecommendationRequest, CreateTopicRequest};
use crate::storage::Storage;

pub struct RecommendationService {
    storage: Option<Arc<dyn Storage>>,
}

impl RecommendationService {
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

    // 班级话题
    pub async fn list_topics(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        topics::list_topics(self, section_id, request).await
    }

    pub async fn create_topic(
        &self,
        section_id: i64,
        topic: CreateTopicRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        topics::create_topic(self, section_id, topic, request).await
    }

    pub async fn delete_topic(
        &self,
        topic_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        topics::delete_topic(self, topic_id, request).await
    }

    // 话题下的视频推荐
    pub async fn list_recommendations(
        &self,
        topic_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        videos::list_recommendations(self, topic_id, request).await
    }

    pub async fn add_recommendation(
        &self,
        topic_id: i64,
        recommendation: AddRecommendationRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        videos::add_recommendation(self, topic_id, recommendation, request).await
    }

    pub async fn delete_recommendation(
        &self,
        recommendation_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        videos::delete_recommendation(self, recommendation_id, request).await
    }
}
