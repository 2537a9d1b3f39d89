//! 가격 스냅샷 및 가격 메시지 포맷.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::Symbol;

/// 특정 시점에 조회한 전체 심볼 가격.
///
/// 조회할 때마다 새로 생성되며 생성 후에는 변경되지 않습니다.
/// 가격은 거래소가 보낸 10진 문자열을 그대로 `Decimal`로 보관하므로
/// 자릿수(scale)가 유지됩니다 (`"1800.20"`은 `1800.20`으로 남음).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    /// 조회 시각
    fetched_at: DateTime<Utc>,
    /// 심볼별 가격 (심볼 순 정렬)
    prices: BTreeMap<Symbol, Decimal>,
}

impl PriceSnapshot {
    /// 현재 시각으로 스냅샷을 생성합니다.
    pub fn new(prices: BTreeMap<Symbol, Decimal>) -> Self {
        Self::at(Utc::now(), prices)
    }

    /// 지정한 시각으로 스냅샷을 생성합니다.
    pub fn at(fetched_at: DateTime<Utc>, prices: BTreeMap<Symbol, Decimal>) -> Self {
        Self { fetched_at, prices }
    }

    /// (심볼, 가격) 목록에서 스냅샷을 생성합니다.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<Symbol>,
    {
        Self::new(entries.into_iter().map(|(s, p)| (s.into(), p)).collect())
    }

    /// 조회 시각.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// 심볼의 가격을 조회합니다.
    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    /// 스냅샷에 포함된 심볼 목록 (정렬됨).
    pub fn symbols(&self) -> Vec<Symbol> {
        self.prices.keys().cloned().collect()
    }

    /// 심볼 순으로 (심볼, 가격)을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Decimal)> {
        self.prices.iter()
    }

    /// 가격 맵.
    pub fn prices(&self) -> &BTreeMap<Symbol, Decimal> {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// 가격 맵을 JSON 객체로 직렬화합니다.
    ///
    /// 가격은 문자열로 기록되어 다시 파싱해도 값과 자릿수가 그대로 복원됩니다.
    /// 조회 시각은 포함하지 않습니다.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.prices)
    }
}

/// 단일 심볼 가격 알림 메시지를 생성합니다.
///
/// 형식: `The Price of [<symbol>]: <price>`
pub fn price_message(symbol: &Symbol, price: Decimal) -> String {
    format!("The Price of [{}]: {}", symbol, price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn sample() -> PriceSnapshot {
        PriceSnapshot::from_entries([("ETHUSDT", dec!(1800.2)), ("BTCUSDT", dec!(27000.5))])
    }

    #[test]
    fn test_snapshot_keeps_symbols_sorted() {
        let snapshot = sample();
        assert_eq!(
            snapshot.symbols(),
            vec![Symbol::from("BTCUSDT"), Symbol::from("ETHUSDT")]
        );
        assert_eq!(snapshot.get("ETHUSDT"), Some(dec!(1800.2)));
        assert_eq!(snapshot.get("ethusdt"), None);
    }

    #[test]
    fn test_to_json_is_lossless() {
        let snapshot = PriceSnapshot::from_entries([
            ("BTCUSDT", "27000.50".parse::<Decimal>().unwrap()),
            ("SHIBUSDT", "0.000008123456789012".parse::<Decimal>().unwrap()),
        ]);

        let json = snapshot.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"BTCUSDT":"27000.50","SHIBUSDT":"0.000008123456789012"}"#
        );

        let parsed: BTreeMap<Symbol, Decimal> = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, snapshot.prices());
        // scale까지 보존되는지 확인
        assert_eq!(parsed[&Symbol::from("BTCUSDT")].to_string(), "27000.50");
    }

    #[test]
    fn test_price_message_format() {
        assert_eq!(
            price_message(&Symbol::from("ETHUSDT"), dec!(1800.2)),
            "The Price of [ETHUSDT]: 1800.2"
        );
    }

    proptest! {
        #[test]
        fn prop_price_message_matches_template(
            symbol in "[A-Z0-9]{2,12}",
            mantissa in 0i64..1_000_000_000_000,
            scale in 0u32..10,
        ) {
            let price = Decimal::new(mantissa, scale);
            let message = price_message(&Symbol::new(symbol.clone()), price);
            prop_assert_eq!(message, format!("The Price of [{}]: {}", symbol, price));
        }
    }
}
