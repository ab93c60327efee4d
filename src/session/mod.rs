//! 会话与登录校验
//!
//! 会话只有两种状态：[`SessionState::Anonymous`] 与
//! [`SessionState::Authenticated`]。登录成功后身份信息保存在
//! [`SessionContext`] 中，整个请求期间只读。
//!
//! HTTP 层不保存服务端会话，身份由签名的会话令牌携带，
//! 每个请求由 `RequireSession` 中间件重新构造 `SessionContext`。

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::errors::Result;
use crate::models::ErrorCode;
use crate::models::users::entities::UserRole;
use crate::storage::Storage;
use crate::utils::jwt::Claims;
use crate::utils::password::verify_password;

/// 已登录用户的身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: i64,
    pub role: UserRole,
    pub username: String,
}

impl SessionContext {
    /// 从令牌 Claims 还原身份，角色无法识别时返回 None
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        let user_id = claims.user_id()?;
        let role = claims.role.parse::<UserRole>().ok()?;
        Some(Self {
            user_id,
            role,
            username: claims.username.clone(),
        })
    }
}

/// 登录凭据
#[derive(Debug, Clone)]
pub struct Credentials {
    pub role: Option<UserRole>,
    pub username: String,
    pub password: String,
}

impl From<crate::models::auth::requests::LoginRequest> for Credentials {
    fn from(req: crate::models::auth::requests::LoginRequest) -> Self {
        Self {
            role: req.role,
            username: req.username,
            password: req.password,
        }
    }
}

/// 登录被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginRejection {
    MissingFields,
    UnknownUser,
    WrongPassword,
    WrongRole,
}

impl LoginRejection {
    pub fn message(&self) -> &'static str {
        match self {
            LoginRejection::MissingFields => "Please fill in all fields",
            LoginRejection::UnknownUser => "User not found",
            LoginRejection::WrongPassword => "Incorrect password",
            LoginRejection::WrongRole => "Account is not registered with the selected role",
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            LoginRejection::MissingFields => ErrorCode::AuthMissingFields,
            LoginRejection::UnknownUser => ErrorCode::AuthUnknownUser,
            LoginRejection::WrongPassword => ErrorCode::AuthWrongPassword,
            LoginRejection::WrongRole => ErrorCode::AuthWrongRole,
        }
    }
}

impl fmt::Display for LoginRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// 未登录时 guard 的拒绝结果，调用方必须回到登录流程并停止处理当前请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRequired;

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unauthorized access, please login first")
    }
}

/// 展示层可见的四个会话字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub user_id: Option<i64>,
    pub role: Option<UserRole>,
    pub username: Option<String>,
    pub authenticated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(SessionContext),
}

impl SessionState {
    /// 登录
    ///
    /// 校验顺序：必填字段、用户是否存在、密码、角色（不区分大小写）。
    /// 任何一步失败会话都保持匿名。存储故障向上传播。
    pub async fn begin(
        &mut self,
        storage: &dyn Storage,
        credentials: Credentials,
    ) -> Result<std::result::Result<SessionContext, LoginRejection>> {
        *self = SessionState::Anonymous;

        let context = match authenticate(storage, credentials).await? {
            Ok(context) => context,
            Err(rejection) => return Ok(Err(rejection)),
        };

        info!(
            "用户 {} ({}) 登录成功",
            context.username,
            context.role.as_str()
        );
        *self = SessionState::Authenticated(context.clone());
        Ok(Ok(context))
    }

    /// 登出，无条件回到匿名状态
    pub fn end(&mut self) {
        if let SessionState::Authenticated(context) = self {
            info!("用户 {} 登出", context.username);
        }
        *self = SessionState::Anonymous;
    }

    /// 访问任何角色页面之前的检查
    pub fn guard(&self) -> std::result::Result<&SessionContext, LoginRequired> {
        match self {
            SessionState::Authenticated(context) => Ok(context),
            SessionState::Anonymous => Err(LoginRequired),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match self {
            SessionState::Authenticated(context) => SessionSnapshot {
                user_id: Some(context.user_id),
                role: Some(context.role),
                username: Some(context.username.clone()),
                authenticated: true,
            },
            SessionState::Anonymous => SessionSnapshot {
                user_id: None,
                role: None,
                username: None,
                authenticated: false,
            },
        }
    }
}

impl From<SessionContext> for SessionState {
    fn from(context: SessionContext) -> Self {
        SessionState::Authenticated(context)
    }
}

/// 校验凭据，成功时返回身份
async fn authenticate(
    storage: &dyn Storage,
    credentials: Credentials,
) -> Result<std::result::Result<SessionContext, LoginRejection>> {
    let username = credentials.username.trim();
    let Some(selected_role) = credentials.role else {
        return Ok(Err(LoginRejection::MissingFields));
    };
    if username.is_empty() || credentials.password.is_empty() {
        return Ok(Err(LoginRejection::MissingFields));
    }

    let Some(user) = storage.get_user_by_username(username).await? else {
        warn!("登录失败，用户不存在: {}", username);
        return Ok(Err(LoginRejection::UnknownUser));
    };

    if !verify_password(&credentials.password, &user.password_hash) {
        warn!("登录失败，密码错误: {}", username);
        return Ok(Err(LoginRejection::WrongPassword));
    }

    // UserRole 解析时已不区分大小写
    if user.role != selected_role {
        warn!(
            "登录失败，角色不匹配: {} 选择了 {}，实际为 {}",
            username, selected_role, user.role
        );
        return Ok(Err(LoginRejection::WrongRole));
    }

    Ok(Ok(SessionContext {
        user_id: user.id,
        role: user.role,
        username: user.username,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_storage;
    use crate::utils::password::hash_password;

    async fn storage_with(
        username: &str,
        password: &str,
        role: UserRole,
    ) -> std::sync::Arc<dyn Storage> {
        let storage = memory_storage().await;
        let hash = hash_password(password).unwrap();
        storage.create_user(username, &hash, role).await;
        storage
    }

    fn credentials(role: Option<UserRole>, username: &str, password: &str) -> Credentials {
        Credentials {
            role,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_begin_success_sets_identity() {
        let storage = storage_with("bob", "pw1", UserRole::Student).await;
        let mut state = SessionState::default();

        let context = state
            .begin(
                storage.as_ref(),
                credentials(Some(UserRole::Student), "  bob ", "pw1"),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(context.username, "bob");
        assert_eq!(context.role, UserRole::Student);

        let snapshot = state.snapshot();
        assert!(snapshot.authenticated);
        assert_eq!(snapshot.user_id, Some(context.user_id));
        assert_eq!(state.guard().unwrap(), &context);
    }

    #[tokio::test]
    async fn test_unknown_user_stays_anonymous() {
        let storage = memory_storage().await;
        let mut state = SessionState::default();

        for name in ["ghost", "nobody", "bob"] {
            let result = state
                .begin(
                    storage.as_ref(),
                    credentials(Some(UserRole::Student), name, "pw"),
                )
                .await
                .unwrap();
            assert_eq!(result, Err(LoginRejection::UnknownUser));
            assert_eq!(state, SessionState::Anonymous);
        }
    }

    #[tokio::test]
    async fn test_wrong_role_sets_no_identity() {
        let storage = storage_with("tina", "secret", UserRole::Teacher).await;
        let mut state = SessionState::default();

        for role in [UserRole::Student, UserRole::Admin] {
            let result = state
                .begin(storage.as_ref(), credentials(Some(role), "tina", "secret"))
                .await
                .unwrap();
            assert_eq!(result, Err(LoginRejection::WrongRole));
            let snapshot = state.snapshot();
            assert!(!snapshot.authenticated);
            assert_eq!(snapshot.user_id, None);
            assert_eq!(snapshot.role, None);
            assert_eq!(snapshot.username, None);
        }
    }

    #[tokio::test]
    async fn test_wrong_password_and_missing_fields() {
        let storage = storage_with("amy", "right", UserRole::Admin).await;
        let mut state = SessionState::default();

        let result = state
            .begin(storage.as_ref(), credentials(Some(UserRole::Admin), "amy", "wrong"))
            .await
            .unwrap();
        assert_eq!(result, Err(LoginRejection::WrongPassword));

        let result = state
            .begin(storage.as_ref(), credentials(None, "amy", "right"))
            .await
            .unwrap();
        assert_eq!(result, Err(LoginRejection::MissingFields));

        let result = state
            .begin(storage.as_ref(), credentials(Some(UserRole::Admin), "   ", "right"))
            .await
            .unwrap();
        assert_eq!(result, Err(LoginRejection::MissingFields));
        assert!(!state.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_clears_previous_identity() {
        let storage = storage_with("amy", "right", UserRole::Admin).await;
        let mut state = SessionState::default();
        state
            .begin(storage.as_ref(), credentials(Some(UserRole::Admin), "amy", "right"))
            .await
            .unwrap()
            .unwrap();

        let result = state
            .begin(storage.as_ref(), credentials(Some(UserRole::Admin), "amy", "wrong"))
            .await
            .unwrap();
        assert!(result.is_err());
        assert_eq!(state.guard(), Err(LoginRequired));
    }

    #[test]
    fn test_end_and_guard() {
        let mut state = SessionState::from(SessionContext {
            user_id: 7,
            role: UserRole::Teacher,
            username: "t".to_string(),
        });
        assert!(state.guard().is_ok());

        state.end();
        assert_eq!(state.guard(), Err(LoginRequired));
        // 匿名状态下再次登出没有影响
        state.end();
        assert_eq!(state, SessionState::Anonymous);
    }

    #[test]
    fn test_from_claims() {
        let mut claims = Claims {
            sub: "3".to_string(),
            role: "teacher".to_string(),
            username: "t".to_string(),
            exp: 0,
            iat: 0,
        };
        let context = SessionContext::from_claims(&claims).unwrap();
        assert_eq!(context.role, UserRole::Teacher);
        assert_eq!(context.user_id, 3);

        claims.role = "Janitor".to_string();
        assert!(SessionContext::from_claims(&claims).is_none());
    }
}
