use serde::{Deserialize, Serialize};

// 文件类别（数据库中存储为 "pdf" / "video"）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Pdf,
    Video,
}

impl FileKind {
    pub const PDF: &'static str = "pdf";
    pub const VIDEO: &'static str = "video";

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => FileKind::PDF,
            FileKind::Video => FileKind::VIDEO,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "video" => Ok(FileKind::Video),
            _ => Err(format!("Invalid file kind: {s}")),
        }
    }
}

// 文件元数据（不含文件内容）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    // 文件ID
    pub id: i64,
    // 规范化后的文件名
    pub filename: String,
    // 文件类别
    pub file_type: FileKind,
    // 文件大小（以字节为单位）
    pub file_size: i64,
    // 上传者ID，上传者被删除后为空
    pub uploaded_by: Option<i64>,
    // 所属班级
    pub section_id: i64,
    pub section_name: String,
    // 上传时间
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

// 完整文件（元数据 + 内容）
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub info: FileInfo,
    pub data: Vec<u8>,
}

// 待写入的新文件
#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub kind: FileKind,
    pub data: Vec<u8>,
    pub uploaded_by: i64,
    pub section_id: i64,
}
