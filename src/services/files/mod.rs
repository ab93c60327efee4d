pub mod delete;
pub mod download;
pub mod list;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::files::entities::FileKind;
use crate::storage::Storage;

/// 文件类别过滤参数
#[derive(Debug, Default, Deserialize)]
pub struct FileKindQuery {
    pub kind: Option<FileKind>,
}

pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
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

    // 上传文件到班级
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        section_id: i64,
        query: FileKindQuery,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, request, section_id, query.kind, payload).await
    }

    // 班级文件列表
    pub async fn list_files(
        &self,
        request: &HttpRequest,
        section_id: i64,
        query: FileKindQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_files(self, request, section_id, query.kind).await
    }

    // 下载文件
    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        file_id: i64,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, file_id).await
    }

    // 删除文件
    pub async fn delete_file(&self, request: &HttpRequest, file_id: i64) -> ActixResult<HttpResponse> {
        delete::delete_file(self, request, file_id).await
    }
}
