//! 텔레그램 알림 서비스.
//!
//! Telegram Bot API의 `sendMessage`로 메시지를 일반 텍스트 그대로 전송합니다.

use crate::types::{
    ensure_delivered, NotificationChannel, NotificationResult, NotificationSender,
};
use async_trait::async_trait;
use indicator_core::VarLookup;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

/// 텔레그램 알림 전송 설정.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: SecretString,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: String,
    /// 전송 활성화 여부
    pub enabled: bool,
    /// Bot API 기본 URL
    pub api_base: String,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: SecretString, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token,
            chat_id: chat_id.into(),
            enabled: true,
            api_base: "https://api.telegram.org".to_string(),
        }
    }

    /// Bot API 기본 URL 재정의.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// 변수에서 설정을 생성합니다.
    ///
    /// `TELEGRAM_BOT_TOKEN`과 `TELEGRAM_CHAT_ID`가 모두 있어야 합니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Option<Self> {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")?;
        let chat_id = lookup("TELEGRAM_CHAT_ID")?;
        let enabled = indicator_core::bool_or(lookup, "TELEGRAM_ENABLED", true);

        Some(Self {
            enabled,
            ..Self::new(SecretString::from(bot_token), chat_id)
        })
    }
}

/// 텔레그램 알림 전송기.
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 변수에서 전송기를 생성합니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Option<Self> {
        TelegramConfig::from_vars(lookup).map(Self::new)
    }

    /// 텔레그램에 원시 메시지를 전송합니다.
    async fn send_message(&self, text: &str) -> NotificationResult<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base,
            self.config.bot_token.expose_secret()
        );

        let params = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        debug!(
            "Sending Telegram message to chat_id: {}",
            self.config.chat_id
        );

        let response = self.client.post(&url).json(&params).send().await?;
        ensure_delivered(self.name(), response).await?;

        info!("Telegram notification sent successfully");
        Ok(())
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, message: &str) -> NotificationResult<()> {
        self.send_message(message).await
    }

    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Telegram
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
            && !self.config.bot_token.expose_secret().is_empty()
            && !self.config.chat_id.is_empty()
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
