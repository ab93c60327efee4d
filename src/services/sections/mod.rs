pub mod create;
pub mod delete;
pub mod list;
pub mod members;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::sections::requests::{AssignMemberRequest, CreateSectionRequest};
use crate::models::users::entities::UserRole;
use crate::storage::Storage;

pub struct SectionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SectionService {
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

    // 当前用户可见的班级
    pub async fn list_sections(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_sections(self, request).await
    }

    // 创建班级
    pub async fn create_section(
        &self,
        section_data: CreateSectionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_section(self, section_data, request).await
    }

    // 删除班级
    pub async fn delete_section(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_section(self, section_id, request).await
    }

    // 分配教师或学生
    pub async fn assign_member(
        &self,
        section_id: i64,
        role: UserRole,
        member: AssignMemberRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        members::assign_member(self, section_id, role, member, request).await
    }

    // 班级学生名单
    pub async fn list_students(
        &self,
        section_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        members::list_students(self, section_id, request).await
    }
}
