//! 거래 심볼 정의.
//!
//! 거래소가 반환하는 심볼 문자열(예: `BTCUSDT`)을 그대로 감싸는 타입입니다.
//! 대소문자를 구분하며 정규화하지 않습니다.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// 거래 가능한 자산을 식별하는 심볼.
///
/// 거래소 심볼 목록과 비교할 때 문자열이 정확히 일치해야 합니다.
/// `btcusdt`와 `BTCUSDT`는 서로 다른 심볼입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 심볼 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 주어진 심볼 목록에 포함되어 있는지 확인합니다.
    pub fn is_listed_in(&self, symbols: &[Symbol]) -> bool {
        symbols.iter().any(|s| s == self)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_case_sensitive() {
        let listed = vec![Symbol::from("BTCUSDT"), Symbol::from("ETHUSDT")];

        assert!(Symbol::from("BTCUSDT").is_listed_in(&listed));
        assert!(!Symbol::from("btcusdt").is_listed_in(&listed));
        assert!(!Symbol::from("DOGEUSDT").is_listed_in(&listed));
    }

    #[test]
    fn test_symbol_serializes_as_plain_string() {
        let json = serde_json::to_string(&Symbol::from("ETHUSDT")).unwrap();
        assert_eq!(json, "\"ETHUSDT\"");
    }
}
