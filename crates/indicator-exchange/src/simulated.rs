//! 고정 가격을 반환하는 시뮬레이션 가격 소스.
//!
//! 네트워크 없이 메뉴 흐름을 확인할 때(`--simulated`)와 테스트에서 사용합니다.

use async_trait::async_trait;
use indicator_core::PriceSnapshot;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::traits::{ExchangeResult, PriceSource};
use crate::ExchangeError;

/// 고정된 가격 맵을 매번 새 스냅샷으로 반환하는 소스.
#[derive(Debug)]
pub struct StaticPriceSource {
    prices: Mutex<BTreeMap<String, Decimal>>,
    fail_with: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl StaticPriceSource {
    /// (심볼, 가격 문자열) 목록으로 생성합니다.
    ///
    /// # Panics
    /// 가격 문자열이 10진수가 아니면 패닉합니다 (고정 데이터 전용).
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let prices = entries
            .into_iter()
            .map(|(s, p)| {
                let price = Decimal::from_str_exact(p)
                    .unwrap_or_else(|e| panic!("invalid fixture price {}: {}", p, e));
                (s.to_string(), price)
            })
            .collect();

        Self {
            prices: Mutex::new(prices),
            fail_with: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// 데모용 기본 가격표.
    pub fn demo() -> Self {
        Self::new([
            ("BNBUSDT", "312.45"),
            ("BTCUSDT", "27000.5"),
            ("DOGEUSDT", "0.06231"),
            ("ETHUSDT", "1800.2"),
            ("SOLUSDT", "21.874"),
        ])
    }

    /// 심볼 가격을 변경합니다.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        if let Ok(mut prices) = self.prices.lock() {
            prices.insert(symbol.to_string(), price);
        }
    }

    /// 이후 조회가 네트워크 에러로 실패하도록 설정합니다. `None`이면 정상 동작.
    pub fn set_failure(&self, message: Option<&str>) {
        if let Ok(mut fail) = self.fail_with.lock() {
            *fail = message.map(str::to_string);
        }
    }

    /// 지금까지의 스냅샷 조회 횟수.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn all_prices(&self) -> ExchangeResult<PriceSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self
            .fail_with
            .lock()
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?
            .clone()
        {
            return Err(ExchangeError::NetworkError(message));
        }

        let prices = self
            .prices
            .lock()
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        Ok(PriceSnapshot::from_entries(
            prices.iter().map(|(s, p)| (s.as_str(), *p)),
        ))
    }
}
