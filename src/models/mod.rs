//! 数据模型定义
//!
//! 业务实体、请求与响应结构。Storage 层返回这里的业务实体，
//! 路由层把它们包进 [`ApiResponse`] 返回给展示层。

use serde::Serialize;

pub mod common {
    pub mod outcome;
    pub mod response;

    pub use outcome::WriteOutcome;
    pub use response::{ApiResponse, CreatedResponse};
}

pub mod users {
    pub mod entities;
    pub mod requests;
    pub mod responses;
}

pub mod sections {
    pub mod entities;
    pub mod requests;
}

pub mod files {
    pub mod entities;
    pub mod responses;
}

pub mod grades {
    pub mod entities;
    pub mod requests;
}

pub mod subjects {
    pub mod entities;
    pub mod requests;
}

pub mod assignments {
    pub mod entities;
    pub mod requests;
}

pub mod messages {
    pub mod entities;
    pub mod requests;
}

pub mod recommendations {
    pub mod entities;
    pub mod requests;
}

pub mod auth {
    pub mod requests;
    pub mod responses;
}

pub use common::{ApiResponse, CreatedResponse, WriteOutcome};

/// 程序启动时间
#[derive(Debug, Clone, Serialize)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 响应码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    PayloadTooLarge = 1013,
    InternalServerError = 1500,

    // 认证
    AuthMissingFields = 2001,
    AuthUnknownUser = 2002,
    AuthWrongPassword = 2003,
    AuthWrongRole = 2004,
    PageNotAvailable = 2010,

    // 用户
    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserNameInvalid = 3002,
    UserPasswordInvalid = 3003,
    UserCreationFailed = 3004,
    UserDeleteFailed = 3005,
    CanNotDeleteCurrentUser = 3006,

    // 班级
    SectionNotFound = 4000,
    SectionAlreadyExists = 4001,
    SectionNameInvalid = 4002,
    SectionPermissionDenied = 4003,
    SectionAssignFailed = 4004,
    SectionAlreadyJoined = 4005,

    // 文件
    FileNotFound = 5000,
    FileUploadFailed = 5001,
    FileTypeNotAllowed = 5002,
    FileSizeExceeded = 5003,
    MultifileUploadNotAllowed = 5004,

    // 成绩 / 科目
    GradeNotFound = 6000,
    GradeInvalid = 6001,
    SubjectNotFound = 6010,
    SubjectAlreadyExists = 6011,

    // 作业
    AssignmentNotFound = 7000,

    // 聊天
    MessageNotFound = 7100,
    MessageInvalid = 7101,

    // 视频推荐
    TopicNotFound = 7200,
    TopicAlreadyExists = 7201,
    RecommendationNotFound = 7210,
    RecommendationInvalid = 7211,
}
