//! JWT Token 处理
//!
//! 提供 JWT Token 的生成和验证功能。两个服务使用同一个静态密钥，
//! user-service 签发，order-service 只做校验。

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::error::SharedError;

/// 管理员角色
pub const ROLE_ADMIN: &str = "admin";
/// 普通顾客角色
pub const ROLE_CUSTOMER: &str = "customer";

/// JWT Claims（Token 载荷）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    /// 邮箱
    pub email: String,
    /// 角色
    pub role: String,
    /// 签发时间
    pub iat: i64,
    /// 过期时间
    pub exp: i64,
    /// 签发者
    pub iss: String,
}

impl Claims {
    /// 解析用户 ID
    pub fn user_id(&self) -> Result<i64, SharedError> {
        self.sub
            .parse()
            .map_err(|_| SharedError::InvalidToken(format!("非数字用户 ID: {}", self.sub)))
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// JWT 管理器
#[derive(Clone)]
pub struct JwtManager {
    settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// 创建 JWT 管理器
    pub fn new(settings: JwtSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());

        Self {
            settings,
            encoding_key,
            decoding_key,
        }
    }

    /// 生成 JWT Token
    ///
    /// 返回 (token, 过期时间戳)
    pub fn generate_token(
        &self,
        user_id: i64,
        email: &str,
        role: &str,
    ) -> Result<(String, i64), SharedError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.settings.expires_in_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.settings.issuer.clone(),
        };

        let token = self.encode_claims(&claims)?;
        Ok((token, exp.timestamp()))
    }

    /// 按给定 Claims 编码
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, SharedError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| SharedError::Internal(format!("JWT 生成失败: {}", e)))
    }

    /// 验证并解析 JWT Token
    ///
    /// 签名错误、签发者不匹配或已过期都返回 `InvalidToken`
    pub fn verify_token(&self, token: &str) -> Result<Claims, SharedError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.settings.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| SharedError::InvalidToken(format!("{:?}", e.kind())))?;

        Ok(token_data.claims)
    }

    /// 获取 Token 过期时间（秒）
    pub fn expires_in_secs(&self) -> i64 {
        self.settings.expires_in_secs
    }
}
