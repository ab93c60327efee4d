use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use crate::models::WriteOutcome;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 初始化管理员账号
/// 同名账号不存在时才创建，重复调用不会产生第二个管理员
async fn seed_admin(storage: &Arc<dyn Storage>) -> Result<()> {
    let admin = &AppConfig::get().admin;

    let password_hash = hash_password(&admin.password)?;
    match storage
        .ensure_admin_account(&admin.username, &password_hash)
        .await
    {
        WriteOutcome::Created(id) => {
            info!(
                "Default admin account created successfully (ID: {}, username: {})",
                id, admin.username
            );
            if admin.password == crate::config::AdminConfig::default().password {
                warn!("Admin account is using the default password, please change ADMIN_PASSWORD");
            }
        }
        WriteOutcome::AlreadyExists => {
            debug!("Admin account '{}' already exists, skipping seed", admin.username);
        }
        other => {
            return Err(PortalError::database_operation(format!(
                "Failed to seed admin account: {other:?}"
            )));
        }
    }
    Ok(())
}

/// 准备服务器启动的上下文
/// 打开数据库、执行迁移并写入初始管理员
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage).await?;

    Ok(StartupContext { storage })
}
