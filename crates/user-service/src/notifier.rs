//! 验证码投递
//!
//! 邮件和短信共用 `Notifier` 抽象。未配置服务商地址时只写日志，
//! 便于本地开发直接从日志或响应中拿到验证码。

use async_trait::async_trait;
use easybuy_shared::config::{MailConfig, SmsConfig};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// 投递错误
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// 消息投递通道
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 通道名称，用于日志
    fn channel(&self) -> &'static str;

    /// 发送消息；`recipient` 为邮箱或手机号
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}

/// 邮件投递，调用服务商的 JSON HTTP 接口
pub struct EmailNotifier {
    client: reqwest::Client,
    config: MailConfig,
}

impl EmailNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: http_client(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let Some(url) = self.config.api_url.as_deref() else {
            info!(channel = "email", recipient, subject, "mail provider not configured, message logged only");
            debug!(body, "mail body");
            return Ok(());
        };

        let mut request = self.client.post(url).json(&json!({
            "from": { "email": self.config.from_address, "name": self.config.from_name },
            "to": recipient,
            "subject": subject,
            "text": body,
        }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        request.send().await?.error_for_status()?;
        info!(channel = "email", recipient, "mail delivered");
        Ok(())
    }
}

/// 短信投递
pub struct SmsNotifier {
    client: reqwest::Client,
    config: SmsConfig,
}

impl SmsNotifier {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            client: http_client(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    fn channel(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, recipient: &str, _subject: &str, body: &str) -> Result<(), NotifyError> {
        let Some(url) = self.config.api_url.as_deref() else {
            info!(channel = "sms", recipient, "sms provider not configured, message logged only");
            debug!(body, "sms body");
            return Ok(());
        };

        let mut request = self.client.post(url).json(&json!({
            "sender": self.config.sender_id,
            "to": recipient,
            "message": body,
        }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        request.send().await?.error_for_status()?;
        info!(channel = "sms", recipient, "sms delivered");
        Ok(())
    }
}

/// 验证码消息正文
pub fn otp_message(code: &str, ttl_secs: i64) -> String {
    format!(
        "Your EasyBuy verification code is {}. It expires in {} minutes.",
        code,
        (ttl_secs / 60).max(1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_providers_only_log() {
        let email = EmailNotifier::new(MailConfig::default());
        assert_eq!(email.channel(), "email");
        assert!(email.send("a@b.c", "Reset", "code").await.is_ok());

        let sms = SmsNotifier::new(SmsConfig::default());
        assert_eq!(sms.channel(), "sms");
        assert!(sms.send("0901234567", "", "code").await.is_ok());
    }

    #[test]
    fn test_otp_message() {
        let msg = otp_message("123456", 600);
        assert!(msg.contains("123456"));
        assert!(msg.contains("10 minutes"));
        assert!(otp_message("1", 5).contains("1 minutes"));
    }

    #[tokio::test]
    async fn test_mock_notifier() {
        let mut mock = MockNotifier::new();
        mock.expect_send()
            .withf(|to, _, body| to == "a@b.c" && body.contains("654321"))
            .times(1)
            .returning(|_, _, _| Ok(()));

        mock.send("a@b.c", "Reset", &otp_message("654321", 600))
            .await
            .unwrap();
    }
}
