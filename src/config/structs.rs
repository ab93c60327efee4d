use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub argon2: Argon2Config,
    pub admin: AdminConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_name: "School Portal".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            unix_socket_path: String::new(),
            workers: 0,
            max_workers: 8,
            timeouts: TimeoutConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_request: 5000,
            client_disconnect: 1000,
            keep_alive: 30,
        }
    }
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 1024 * 1024,
        }
    }
}

/// JWT 配置（会话令牌）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    // 生产环境必须通过 JWT_SECRET 或配置文件提供
    pub secret: String,
    // 会话有效期（分钟）
    pub session_expiry: i64,
    // 会话 Cookie 名称
    pub cookie_name: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            session_expiry: 8 * 60,
            cookie_name: "session_token".to_string(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // SQLite 数据库文件 URL
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://school.db".to_string(),
            pool_size: 4,
            timeout: 10,
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

/// 上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_size: usize,               // 单文件最大字节数
    pub pdf_extensions: Vec<String>,   // 允许的讲义扩展名
    pub video_extensions: Vec<String>, // 允许的视频扩展名
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size: 200 * 1024 * 1024,
            pdf_extensions: vec!["pdf".to_string()],
            video_extensions: ["mp4", "mov", "avi", "mkv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Argon2 参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    pub memory_cost: u32, // KiB
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// 初始管理员账号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}
