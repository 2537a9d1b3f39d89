//! 설정 로딩 에러 타입.

use std::path::PathBuf;
use thiserror::Error;

/// 설정 로딩 중 발생하는 에러.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 자격증명 파일이 없음 (시작 시 치명적)
    #[error("Configuration file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// 필수 환경 변수가 없음
    #[error("Missing required variable: {0}")]
    MissingVar(String),

    /// env 파일 파싱 실패
    #[error("Failed to read env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    /// 시작 전제 조건(설정 파일) 누락인지 확인.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, ConfigError::MissingFile(_))
    }

    /// 설정 파일이나 필수 변수가 없는지 확인.
    pub fn is_missing_config(&self) -> bool {
        matches!(self, ConfigError::MissingFile(_) | ConfigError::MissingVar(_))
    }
}

/// 설정 작업용 Result 타입.
pub type ConfigResult<T> = Result<T, ConfigError>;
