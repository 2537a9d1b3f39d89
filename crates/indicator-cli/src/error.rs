//! CLI 에러 타입.

use indicator_core::ConfigError;
use indicator_exchange::ExchangeError;
use indicator_notification::NotificationError;

/// CLI 작업용 Result 타입.
pub type CliResult<T> = Result<T, CliError>;

/// 메뉴 실행 중 발생하는 에러.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] std::io::Error),

    #[error("Input closed")]
    InputClosed,

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),
}

/// 시작 단계 설정 에러의 프로세스 종료 코드.
///
/// 설정 파일이나 필수 자격증명이 없으면 안내 메시지만 남기고 정상 종료(0)합니다.
pub fn startup_exit_code(err: &ConfigError) -> u8 {
    if err.is_missing_config() {
        0
    } else {
        1
    }
}

impl CliError {
    /// 심볼이 현재 목록에 없어서 발생한 에러인지 확인합니다.
    pub fn is_unknown_symbol(&self) -> bool {
        matches!(self, CliError::Exchange(e) if e.is_unknown_symbol())
    }

    /// 알 수 없는 알림 채널 라벨로 발생한 에러인지 확인합니다.
    pub fn is_unknown_channel(&self) -> bool {
        matches!(
            self,
            CliError::Notification(NotificationError::UnknownChannel(_))
        )
    }
}
