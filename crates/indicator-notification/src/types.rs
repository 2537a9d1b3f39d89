//! 알림 채널, 에러 및 전송기 trait 정의.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{error, warn};

/// 알림 전달 채널.
///
/// `Console`은 컨트롤러가 직접 출력하는 기본 경로입니다. 전송기가 없고 채널 선택
/// 프롬프트에도 표시되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    /// 콘솔 출력
    Console,
    /// Telegram Bot API
    Telegram,
    /// Discord 웹훅
    Discord,
    /// Twilio WhatsApp
    WhatsApp,
    /// SendGrid 이메일
    Email,
}

impl NotificationChannel {
    /// 채널 선택 프롬프트에 표시되는 채널 (표시 순서).
    pub const PROMPT_CHOICES: [NotificationChannel; 4] = [
        NotificationChannel::Telegram,
        NotificationChannel::Discord,
        NotificationChannel::WhatsApp,
        NotificationChannel::Email,
    ];

    /// 프롬프트 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationChannel::Console => "Console",
            NotificationChannel::Telegram => "Telegram",
            NotificationChannel::Discord => "Discord",
            NotificationChannel::WhatsApp => "WhatsApp",
            NotificationChannel::Email => "Email",
        }
    }

    /// 프롬프트 라벨 목록.
    pub fn prompt_labels() -> Vec<String> {
        Self::PROMPT_CHOICES
            .iter()
            .map(|c| c.label().to_string())
            .collect()
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NotificationChannel {
    type Err = NotificationError;

    /// 라벨을 대소문자 구분 없이 파싱합니다. 목록에 없는 값은 `UnknownChannel`입니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "telegram" => Ok(Self::Telegram),
            "discord" => Ok(Self::Discord),
            "whatsapp" => Ok(Self::WhatsApp),
            "email" => Ok(Self::Email),
            _ => Err(NotificationError::UnknownChannel(s.to_string())),
        }
    }
}

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알 수 없는 채널: {0}")]
    UnknownChannel(String),

    #[error("설정되지 않은 채널: {0}")]
    ChannelNotConfigured(NotificationChannel),

    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// 알림 전송기 trait.
///
/// 메시지는 가공 없이 그대로 전달하며, 호출당 정확히 한 번 전송을 시도합니다.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 메시지를 전송합니다.
    async fn send(&self, message: &str) -> NotificationResult<()>;

    /// 이 전송기가 담당하는 채널.
    fn channel(&self) -> NotificationChannel;

    /// 전송기가 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}

/// HTTP 응답을 전송 결과로 변환합니다.
pub(crate) async fn ensure_delivered(
    name: &str,
    response: reqwest::Response,
) -> NotificationResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    if status.as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok())
            .map(|secs| secs.ceil() as u64)
            .unwrap_or(60);
        warn!("{} rate limited, retry after {}s", name, retry_after);
        return Err(NotificationError::RateLimited(retry_after));
    }

    let body = response.text().await.unwrap_or_default();
    error!("Failed to send {} message: {} - {}", name, status, body);
    Err(NotificationError::SendFailed(format!(
        "HTTP {}: {}",
        status, body
    )))
}
