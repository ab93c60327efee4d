use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub subject_name: String,
}
