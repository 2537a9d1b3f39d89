//! # Indicator Core
//!
//! 암호화폐 가격 조회 도구의 공통 타입을 제공합니다:
//! - 심볼 및 가격 스냅샷
//! - env 파일 기반 설정 로딩
//! - 로깅 초기화

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
