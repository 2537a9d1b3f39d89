//! SendGrid v3 API 기반 이메일 전송.

use crate::types::{
    ensure_delivered, NotificationChannel, NotificationResult, NotificationSender,
};
use async_trait::async_trait;
use indicator_core::VarLookup;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};

/// 기본 메일 제목.
pub const DEFAULT_EMAIL_SUBJECT: &str = "Crypto Price Indicator";

/// 이메일 설정.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SendGrid API 키
    pub api_key: SecretString,
    /// 발신 주소
    pub from_address: String,
    /// 수신 주소
    pub to_address: String,
    /// 메일 제목
    pub subject: String,
    /// API 기본 URL
    pub api_base: String,
}

impl EmailConfig {
    /// 새 설정을 생성합니다.
    pub fn new(
        api_key: SecretString,
        from_address: impl Into<String>,
        to_address: impl Into<String>,
    ) -> Self {
        Self {
            api_key,
            from_address: from_address.into(),
            to_address: to_address.into(),
            subject: DEFAULT_EMAIL_SUBJECT.to_string(),
            api_base: "https://api.sendgrid.com".to_string(),
        }
    }

    /// API 기본 URL 재정의.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// 변수에서 설정을 생성합니다.
    ///
    /// `SENDGRID_API_KEY`, `EMAIL_FROM`, `EMAIL_TO`가 필요하며 `EMAIL_SUBJECT`는 선택입니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Option<Self> {
        let mut config = Self::new(
            SecretString::from(lookup("SENDGRID_API_KEY")?),
            lookup("EMAIL_FROM")?,
            lookup("EMAIL_TO")?,
        );
        if let Some(subject) = lookup("EMAIL_SUBJECT") {
            config.subject = subject;
        }
        Some(config)
    }
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

/// 이메일 전송기.
pub struct EmailSender {
    config: EmailConfig,
    client: reqwest::Client,
}

impl EmailSender {
    /// 새 전송기를 생성합니다.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 변수에서 전송기를 생성합니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Option<Self> {
        EmailConfig::from_vars(lookup).map(Self::new)
    }

    fn build_payload<'a>(&'a self, message: &'a str) -> MailSend<'a> {
        MailSend {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: &self.config.to_address,
                }],
            }],
            from: Address {
                email: &self.config.from_address,
            },
            subject: &self.config.subject,
            content: vec![Content {
                content_type: "text/plain",
                value: message,
            }],
        }
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    async fn send(&self, message: &str) -> NotificationResult<()> {
        let url = format!("{}/v3/mail/send", self.config.api_base);
        let payload = self.build_payload(message);

        debug!("Sending email to {}", self.config.to_address);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;
        ensure_delivered(self.name(), response).await?;

        info!("Email notification sent successfully");
        Ok(())
    }

    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    fn is_enabled(&self) -> bool {
        !self.config.to_address.is_empty() && !self.config.from_address.is_empty()
    }

    fn name(&self) -> &str {
        "email"
    }
}
