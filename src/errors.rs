//! 统一错误处理模块
//!
//! 存储层与启动流程的内部错误。业务上的失败（记录不存在、无权访问等）
//! 不走这里，而是通过 [`crate::models::WriteOutcome`] 或 `Option` 表达。

use std::fmt;

/// 生成错误枚举及其错误代码、类型名称和便捷构造函数
macro_rules! define_portal_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum PortalError {
            $($variant(String),)*
        }

        impl PortalError {
            pub fn code(&self) -> &'static str {
                match self {
                    $(PortalError::$variant(_) => $code,)*
                }
            }

            pub fn error_type(&self) -> &'static str {
                match self {
                    $(PortalError::$variant(_) => $type_name,)*
                }
            }

            /// 错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(PortalError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl PortalError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        PortalError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_portal_errors! {
    DatabaseConfig("P001", "Database Configuration Error"),
    DatabaseConnection("P002", "Database Connection Error"),
    DatabaseOperation("P003", "Database Operation Error"),
    FileOperation("P004", "File Operation Error"),
    PasswordHash("P005", "Password Hash Error"),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for PortalError {}

impl From<sea_orm::DbErr> for PortalError {
    fn from(err: sea_orm::DbErr) -> Self {
        PortalError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::FileOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
