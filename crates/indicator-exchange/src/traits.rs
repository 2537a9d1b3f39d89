//! 가격/뉴스 소스 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indicator_core::{PriceSnapshot, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 현재 가격을 제공하는 소스.
///
/// 구현체는 실행 중 읽기 전용으로 공유됩니다 (`Arc<dyn PriceSource>`).
/// 결과는 캐시하지 않으며 호출할 때마다 새로 조회합니다.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// 소스 이름 반환.
    fn name(&self) -> &str;

    /// 현재 거래 가능한 심볼 목록 (정렬됨).
    async fn list_symbols(&self) -> ExchangeResult<Vec<Symbol>> {
        Ok(self.all_prices().await?.symbols())
    }

    /// 호출 시점의 전체 가격 스냅샷.
    async fn all_prices(&self) -> ExchangeResult<PriceSnapshot>;

    /// 단일 심볼의 현재 가격.
    ///
    /// 심볼이 현재 스냅샷에 없으면 `ExchangeError::SymbolNotFound`를 반환합니다.
    async fn price(&self, symbol: &Symbol) -> ExchangeResult<Decimal> {
        self.all_prices()
            .await?
            .get(symbol.as_str())
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))
    }

    /// 서비스 연결 상태 확인.
    async fn ping(&self) -> ExchangeResult<()> {
        Ok(())
    }
}

/// 뉴스 기사.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// 제목
    pub title: String,
    /// 출처 이름
    pub source: String,
    /// 기사 URL
    pub url: String,
    /// 게시 시각
    pub published_at: Option<DateTime<Utc>>,
    /// 요약
    pub description: Option<String>,
}

/// 최신 암호화폐 뉴스를 제공하는 소스.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// 최신 기사를 최대 `limit`개 반환합니다 (최신순).
    async fn latest(&self, limit: usize) -> ExchangeResult<Vec<NewsArticle>>;
}
