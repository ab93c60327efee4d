pub mod create;
pub mod delete;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::subjects::requests::CreateSubjectRequest;
use crate::storage::Storage;

pub struct SubjectService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubjectService {
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

    pub async fn list_subjects(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_subjects(self, section_id, request).await
    }

    pub async fn create_subject(
        &self,
        section_id: i64,
        subject_data: CreateSubjectRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_subject(self, section_id, subject_data, request).await
    }

    pub async fn delete_subject(
        &self,
        subject_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_subject(self, subject_id, request).await
    }
}
