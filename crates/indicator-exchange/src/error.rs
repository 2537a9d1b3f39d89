//! 거래소/뉴스 소스 에러 타입.

use thiserror::Error;

/// 가격 및 뉴스 조회 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded")]
    RateLimited,

    /// API 에러 코드 (2xx가 아닌 응답)
    #[error("API error {code}: {message}")]
    ApiError { code: i32, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 현재 스냅샷에 없는 심볼
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),
}

impl ExchangeError {
    /// 원격 서비스에 도달하지 못했거나 2xx가 아닌 응답을 받은 경우.
    pub fn is_network_fault(&self) -> bool {
        matches!(
            self,
            ExchangeError::NetworkError(_)
                | ExchangeError::Timeout(_)
                | ExchangeError::Unauthorized(_)
                | ExchangeError::RateLimited
                | ExchangeError::ApiError { .. }
        )
    }

    /// 요청한 심볼이 없는 경우.
    pub fn is_unknown_symbol(&self) -> bool {
        matches!(self, ExchangeError::SymbolNotFound(_))
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_decode() {
            ExchangeError::ParseError(err.to_string())
        } else {
            ExchangeError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}
