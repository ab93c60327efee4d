pub mod pages;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use std::sync::Arc;

use crate::storage::Storage;

/// 页面请求参数
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 展示层当前选中的班级
    pub section_id: Option<i64>,
}

pub struct PortalService {
    storage: Option<Arc<dyn Storage>>,
}

impl PortalService {
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

    // 当前角色的菜单
    pub async fn list_pages(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        pages::list_pages(request).await
    }

    // 打开菜单中的页面
    pub async fn show_page(
        &self,
        page: String,
        query: PageQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        pages::show_page(self, &page, query, request).await
    }
}
