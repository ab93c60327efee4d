pub mod create;
pub mod delete;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
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

    pub async fn list_assignments(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_assignments(self, section_id, request).await
    }

    pub async fn create_assignment(
        &self,
        section_id: i64,
        assignment: CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, section_id, assignment, request).await
    }

    pub async fn delete_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assignment(self, assignment_id, request).await
    }
}
