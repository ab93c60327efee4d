use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub max_grade: Option<f64>,
}
