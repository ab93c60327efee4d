pub mod create;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::grades::requests::{AddGradeRequest, UpdateGradeRequest};
use crate::services::OutcomeCodes;
use crate::storage::Storage;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
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

    // 录入成绩
    pub async fn add_grade(
        &self,
        grade_data: AddGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::add_grade(self, grade_data, request).await
    }

    // 修改成绩
    pub async fn update_grade(
        &self,
        grade_id: i64,
        update_data: UpdateGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_grade(self, grade_id, update_data, request).await
    }

    // 删除成绩
    pub async fn delete_grade(
        &self,
        grade_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::delete_grade(self, grade_id, request).await
    }

    // 班级成绩
    pub async fn list_section_grades(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_section_grades(self, section_id, request).await
    }

    // 当前学生的成绩
    pub async fn list_my_grades(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_my_grades(self, request).await
    }
}

const GRADE_CODES: OutcomeCodes =
    OutcomeCodes::new(ErrorCode::GradeNotFound, ErrorCode::Conflict).invalid(ErrorCode::GradeInvalid);
