//! 거래소 가격 조회 및 뉴스 소스.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `PriceSource` trait: 심볼 목록, 전체 가격, 단일 가격, 연결 확인
//! - Binance USDⓈ-M 선물 커넥터 (REST)
//! - NewsAPI 뉴스 소스
//! - 고정 가격 시뮬레이션 소스

pub mod connector;
pub mod error;
pub mod news;
pub mod simulated;
pub mod traits;

pub use connector::{BinanceConfig, BinanceFuturesClient};
pub use error::*;
pub use news::{NewsApiClient, NewsConfig};
pub use simulated::StaticPriceSource;
pub use traits::*;
