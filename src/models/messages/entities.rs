use crate::models::users::entities::UserRole;
use serde::Serialize;

// 班级聊天消息（带发送者信息）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub section_id: i64,
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    pub content: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
