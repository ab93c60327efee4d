use super::entities::FileKind;
use serde::Serialize;

/// 文件上传结果
#[derive(Debug, Serialize)]
pub struct FileUploadResponse {
    /// 文件ID
    pub id: i64,
    /// 规范化后的文件名
    pub filename: String,
    /// 文件大小(字节)
    pub size: i64,
    /// 文件类别
    pub file_type: FileKind,
}
