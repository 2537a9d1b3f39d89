//! Discord 웹훅 알림.

use crate::types::{
    ensure_delivered, NotificationChannel, NotificationResult, NotificationSender,
};
use async_trait::async_trait;
use indicator_core::VarLookup;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

/// Discord 웹훅 설정.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// 웹훅 URL (토큰 포함)
    pub webhook_url: SecretString,
    /// 표시 이름 재정의
    pub username: Option<String>,
}

impl DiscordConfig {
    /// 새 설정을 생성합니다.
    pub fn new(webhook_url: SecretString) -> Self {
        Self {
            webhook_url,
            username: None,
        }
    }

    /// 변수에서 설정을 생성합니다. `DISCORD_WEBHOOK_URL`이 필요합니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Option<Self> {
        let webhook_url = lookup("DISCORD_WEBHOOK_URL")?;
        Some(Self {
            webhook_url: SecretString::from(webhook_url),
            username: lookup("DISCORD_USERNAME"),
        })
    }
}

/// Discord 웹훅 전송기.
pub struct DiscordSender {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordSender {
    /// 새 전송기를 생성합니다.
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 변수에서 전송기를 생성합니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Option<Self> {
        DiscordConfig::from_vars(lookup).map(Self::new)
    }
}

#[async_trait]
impl NotificationSender for DiscordSender {
    async fn send(&self, message: &str) -> NotificationResult<()> {
        let mut payload = serde_json::json!({ "content": message });
        if let Some(username) = &self.config.username {
            payload["username"] = serde_json::Value::String(username.clone());
        }

        debug!("Posting Discord webhook message");

        let response = self
            .client
            .post(self.config.webhook_url.expose_secret())
            .json(&payload)
            .send()
            .await?;
        ensure_delivered(self.name(), response).await?;

        info!("Discord notification sent successfully");
        Ok(())
    }

    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Discord
    }

    fn is_enabled(&self) -> bool {
        !self.config.webhook_url.expose_secret().is_empty()
    }

    fn name(&self) -> &str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotificationError;
    use mockito::Matcher;

    fn sender_for(server: &mockito::ServerGuard) -> DiscordSender {
        let url = format!("{}/api/webhooks/1/token", server.url());
        DiscordSender::new(DiscordConfig::new(SecretString::from(url)))
    }

    #[tokio::test]
    async fn test_webhook_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/webhooks/1/token")
            .match_body(Matcher::Json(serde_json::json!({
                "content": "The Price of [ETHUSDT]: 1800.2",
            })))
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        sender_for(&server)
            .send("The Price of [ETHUSDT]: 1800.2")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_webhook_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/webhooks/1/token")
            .with_status(404)
            .with_body(r#"{"message":"Unknown Webhook","code":10015}"#)
            .create_async()
            .await;

        let err = sender_for(&server).send("hi").await.unwrap_err();
        assert!(matches!(err, NotificationError::SendFailed(_)));
    }
}
