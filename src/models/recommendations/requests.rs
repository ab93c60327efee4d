use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    pub topic_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddRecommendationRequest {
    pub video_url: String,
    pub title: Option<String>,
}
