//! 채널별 알림 디스패처.
//!
//! 채널 하나에 전송기 하나를 등록하고, 요청된 채널로만 메시지를 보냅니다.
//! 다른 채널로의 대체 전송이나 재시도는 하지 않습니다.

use std::collections::HashMap;
use std::str::FromStr;

use indicator_core::VarLookup;
use tracing::{debug, error, info};

use crate::discord::DiscordSender;
use crate::email::EmailSender;
use crate::telegram::TelegramSender;
use crate::types::{NotificationChannel, NotificationError, NotificationResult, NotificationSender};
use crate::whatsapp::WhatsAppSender;

/// 채널 라벨을 전송기로 라우팅하는 디스패처.
pub struct NotificationDispatcher {
    senders: HashMap<NotificationChannel, Box<dyn NotificationSender>>,
}

impl NotificationDispatcher {
    /// 전송기가 없는 디스패처를 생성합니다.
    pub fn new() -> Self {
        Self {
            senders: HashMap::new(),
        }
    }

    /// 설정된 외부 채널 전송기를 모두 등록합니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> Self {
        let mut dispatcher = Self::new();

        if let Some(sender) = TelegramSender::from_vars(lookup) {
            dispatcher.register(sender);
        }
        if let Some(sender) = DiscordSender::from_vars(lookup) {
            dispatcher.register(sender);
        }
        if let Some(sender) = WhatsAppSender::from_vars(lookup) {
            dispatcher.register(sender);
        }
        if let Some(sender) = EmailSender::from_vars(lookup) {
            dispatcher.register(sender);
        }

        info!(channels = ?dispatcher.configured_channels(), "Notification channels ready");
        dispatcher
    }

    /// 프로세스 환경 변수로 디스패처를 생성합니다.
    pub fn from_env() -> Self {
        Self::from_vars(&indicator_core::process_env)
    }

    /// 전송기를 등록합니다. 같은 채널의 기존 전송기는 교체됩니다.
    pub fn register<S: NotificationSender + 'static>(&mut self, sender: S) {
        debug!("Registering {} sender", sender.name());
        self.senders.insert(sender.channel(), Box::new(sender));
    }

    /// 활성화된 채널 목록 (선언 순서).
    pub fn configured_channels(&self) -> Vec<NotificationChannel> {
        NotificationChannel::PROMPT_CHOICES
            .into_iter()
            .filter(|c| self.is_configured(*c))
            .collect()
    }

    /// 채널에 활성화된 전송기가 있는지 확인합니다.
    pub fn is_configured(&self, channel: NotificationChannel) -> bool {
        self.senders
            .get(&channel)
            .map(|s| s.is_enabled())
            .unwrap_or(false)
    }

    /// 지정한 채널로 메시지를 한 번 전송합니다.
    pub async fn send(&self, channel: NotificationChannel, message: &str) -> NotificationResult<()> {
        let sender = self
            .senders
            .get(&channel)
            .filter(|s| s.is_enabled())
            .ok_or(NotificationError::ChannelNotConfigured(channel))?;

        sender.send(message).await.map_err(|e| {
            error!("Failed to send notification via {}: {}", sender.name(), e);
            e
        })
    }

    /// 채널 라벨로 메시지를 전송합니다.
    ///
    /// 라벨이 채널 목록에 없으면 어떤 전송도 시도하지 않고 `UnknownChannel`을 반환합니다.
    pub async fn send_label(&self, label: &str, message: &str) -> NotificationResult<()> {
        let channel = NotificationChannel::from_str(label)?;
        self.send(channel, message).await
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
