use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// 会话令牌 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub role: String,     // 用户角色
    pub username: String, // 用户名
    pub exp: usize,       // Expiration time (时间戳)
    pub iat: usize,       // Issued at (签发时间)
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse::<i64>().ok()
    }
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥
    fn get_secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    // 生成会话令牌
    pub fn generate_session_token(
        user_id: i64,
        role: &str,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        Self::generate_token_with_expiry(
            user_id,
            role,
            username,
            AppConfig::get().session_expiry(),
        )
    }

    // 生成带自定义过期时间的 Token
    pub fn generate_token_with_expiry(
        user_id: i64,
        role: &str,
        username: &str,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            username: username.to_string(),
            exp: expiration.timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };

        let secret = Self::get_secret();
        let encoding_key = EncodingKey::from_secret(secret.as_ref());

        encode(&Header::default(), &claims, &encoding_key)
    }

    // 验证会话令牌
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let secret = Self::get_secret();
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }

    /// 创建会话 Cookie
    pub fn create_session_cookie(token: &str) -> Cookie<'static> {
        let config = AppConfig::get();
        Cookie::build(config.jwt.cookie_name.clone(), token.to_string())
            .path("/")
            .max_age(actix_web::cookie::time::Duration::minutes(
                config.jwt.session_expiry,
            ))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production()) // 生产环境下使用 HTTPS
            .finish()
    }

    /// 创建空的会话 Cookie（用于注销）
    pub fn create_empty_session_cookie() -> Cookie<'static> {
        let config = AppConfig::get();
        Cookie::build(config.jwt.cookie_name.clone(), "")
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production())
            .finish()
    }

    /// 从请求中提取会话令牌：优先 Authorization 头，其次 Cookie
    pub fn extract_session_token(req: &actix_web::HttpRequest) -> Option<String> {
        let bearer = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        bearer.or_else(|| {
            req.cookie(&AppConfig::get().jwt.cookie_name)
                .map(|cookie| cookie.value().to_string())
                .filter(|token| !token.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_generate_and_verify() {
        let token = JwtUtils::generate_session_token(7, "Teacher", "mrs_smith").unwrap();
        let claims = JwtUtils::verify_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.role, "Teacher");
        assert_eq!(claims.username, "mrs_smith");
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = JwtUtils::generate_token_with_expiry(
            1,
            "Student",
            "bob",
            chrono::Duration::minutes(-10),
        )
        .unwrap();
        assert!(JwtUtils::verify_token(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let mut token = JwtUtils::generate_session_token(1, "Admin", "admin").unwrap();
        token.push('x');
        assert!(JwtUtils::verify_token(&token).is_err());
    }

    #[test]
    fn test_extract_prefers_bearer_header() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc"))
            .cookie(Cookie::new("session_token", "from-cookie"))
            .to_http_request();
        assert_eq!(JwtUtils::extract_session_token(&req), Some("abc".to_string()));

        let req = TestRequest::default()
            .cookie(Cookie::new("session_token", "from-cookie"))
            .to_http_request();
        assert_eq!(
            JwtUtils::extract_session_token(&req),
            Some("from-cookie".to_string())
        );

        let req = TestRequest::default().to_http_request();
        assert_eq!(JwtUtils::extract_session_token(&req), None);
    }
}
