//! Twilio WhatsApp 메시지 전송.

use crate::types::{
    ensure_delivered, NotificationChannel, NotificationResult, NotificationSender,
};
use async_trait::async_trait;
use indicator_core::VarLookup;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

/// Twilio WhatsApp 설정.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: SecretString,
    /// 발신 번호 (E.164, `whatsapp:` 접두사 없이)
    pub from_number: String,
    /// 수신 번호
    pub to_number: String,
    /// Twilio API 기본 URL
    pub api_base: String,
}

impl WhatsAppConfig {
    /// 새 설정을 생성합니다.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: SecretString,
        from_number: impl Into<String>,
        to_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token,
            from_number: from_number.into(),
            to_number: to_number.into(),
            api_base: "https://api.twilio.com".to_string(),
        }
    }

    /// API 기본 URL 재정의.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// 변수에서 설정을 생성합니다.
    ///
    /// `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `WHATSAPP_FROM`,
    /// `WHATSAPP_TO` 중 하나라도 없으면 `None`입니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Option<Self> {
        let keys = [
            "TWILIO_ACCOUNT_SID",
            "TWILIO_AUTH_TOKEN",
            "WHATSAPP_FROM",
            "WHATSAPP_TO",
        ];
        let values: Vec<Option<String>> = keys.iter().map(|k| lookup(k)).collect();

        if values.iter().all(Option::is_none) {
            return None;
        }
        if values.iter().any(Option::is_none) {
            warn!("WhatsApp settings are incomplete, channel disabled");
            return None;
        }

        let mut values = values.into_iter().flatten();
        Some(Self::new(
            values.next()?,
            SecretString::from(values.next()?),
            values.next()?,
            values.next()?,
        ))
    }
}

fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}

/// Twilio WhatsApp 전송기.
pub struct WhatsAppSender {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl WhatsAppSender {
    /// 새 전송기를 생성합니다.
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 변수에서 전송기를 생성합니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Option<Self> {
        WhatsAppConfig::from_vars(lookup).map(Self::new)
    }
}

#[async_trait]
impl NotificationSender for WhatsAppSender {
    async fn send(&self, message: &str) -> NotificationResult<()> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base, self.config.account_sid
        );
        let from = whatsapp_address(&self.config.from_number);
        let to = whatsapp_address(&self.config.to_number);

        debug!("Sending WhatsApp message to {}", to);

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", message)])
            .send()
            .await?;
        ensure_delivered(self.name(), response).await?;

        info!("WhatsApp notification sent successfully");
        Ok(())
    }

    fn channel(&self) -> NotificationChannel {
        NotificationChannel::WhatsApp
    }

    fn is_enabled(&self) -> bool {
        !self.config.account_sid.is_empty() && !self.config.to_number.is_empty()
    }

    fn name(&self) -> &str {
        "whatsapp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_twilio_form_post() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("From".into(), "whatsapp:+14155238886".into()),
                Matcher::UrlEncoded("To".into(), "whatsapp:+15550001111".into()),
                Matcher::UrlEncoded("Body".into(), "The Price of [BTCUSDT]: 27000.5".into()),
            ]))
            .with_status(201)
            .with_body(r#"{"sid":"SM1","status":"queued"}"#)
            .expect(1)
            .create_async()
            .await;

        let config = WhatsAppConfig::new(
            "AC123",
            SecretString::from("auth"),
            "+14155238886",
            "whatsapp:+15550001111",
        )
        .with_api_base(server.url());

        WhatsAppSender::new(config)
            .send("The Price of [BTCUSDT]: 27000.5")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn test_incomplete_settings_disable_channel() {
        let vars: HashMap<&str, &str> = [("TWILIO_ACCOUNT_SID", "AC123")].into_iter().collect();
        let lookup = |k: &str| vars.get(k).map(|v| v.to_string());
        assert!(WhatsAppConfig::from_vars(&lookup).is_none());
    }
}
