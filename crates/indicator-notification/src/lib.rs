//! # Indicator Notification
//!
//! 가격 정보를 외부 채널로 전달합니다.
//!
//! 지원 채널:
//! - Telegram (Bot API)
//! - Discord (webhook)
//! - WhatsApp (Twilio)
//! - Email (SendGrid)

pub mod discord;
pub mod dispatcher;
pub mod email;
pub mod telegram;
pub mod types;
pub mod whatsapp;

pub use discord::*;
pub use dispatcher::NotificationDispatcher;
pub use email::*;
pub use telegram::*;
pub use types::*;
pub use whatsapp::*;
