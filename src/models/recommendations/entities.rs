use serde::Serialize;

// 视频推荐主题
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub id: i64,
    pub topic_name: String,
    pub section_id: i64,
    pub created_by: Option<i64>,
    // 创建者用户名，创建者被删除后为空
    pub creator_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 视频推荐
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecommendation {
    pub id: i64,
    pub topic_id: i64,
    pub video_url: String,
    pub title: Option<String>,
    pub added_by: i64,
    pub adder_name: String,
    pub added_at: chrono::DateTime<chrono::Utc>,
}
