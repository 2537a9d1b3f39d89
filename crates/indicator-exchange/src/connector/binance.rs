//! Binance USDⓈ-M 선물 가격 커넥터.
//!
//! 공개 시세 REST API만 사용합니다:
//! - `GET /fapi/v1/ticker/price` - 전체 심볼 최신 가격
//! - `GET /fapi/v1/ping` - 연결 확인
//!
//! 가격은 거래소가 보낸 10진 문자열에서 정확히 파싱하며 자릿수를 잃으면 에러로 처리합니다.

use async_trait::async_trait;
use indicator_core::{ApiCredentials, ConfigResult, PriceSnapshot, Symbol, VarLookup};
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

use crate::traits::{ExchangeResult, PriceSource};
use crate::ExchangeError;

// ============================================================================
// 설정
// ============================================================================

/// Binance 선물 클라이언트 설정.
///
/// `Debug` 구현은 API 키 앞뒤 4자만 남기고 마스킹합니다.
#[derive(Clone)]
pub struct BinanceConfig {
    /// API 자격증명
    pub credentials: ApiCredentials,
    /// 테스트넷 사용
    pub testnet: bool,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// REST 기본 URL 재정의 (프록시/테스트용)
    pub base_url: Option<String>,
}

/// API 키의 앞뒤 4글자만 남기고 가립니다.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "***REDACTED***".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

impl fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceConfig")
            .field("api_key", &mask_key(self.credentials.api_key.expose_secret()))
            .field("api_secret", &"***REDACTED***")
            .field("testnet", &self.testnet)
            .field("timeout_secs", &self.timeout_secs)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BinanceConfig {
    /// 새 설정 생성.
    pub fn new(credentials: ApiCredentials) -> Self {
        Self {
            credentials,
            testnet: false,
            timeout_secs: 30,
            base_url: None,
        }
    }

    /// 테스트넷 사용.
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// REST 기본 URL 재정의.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// 변수에서 생성.
    ///
    /// `BINANCE_API_KEY`, `BINANCE_API_SECRET`은 필수이며
    /// `BINANCE_TESTNET`, `BINANCE_TIMEOUT_SECS`는 선택입니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> ConfigResult<Self> {
        let credentials = ApiCredentials::from_vars(lookup, "BINANCE_API_KEY", "BINANCE_API_SECRET")?;

        Ok(Self {
            credentials,
            testnet: indicator_core::bool_or(lookup, "BINANCE_TESTNET", false),
            timeout_secs: indicator_core::parse_or(lookup, "BINANCE_TIMEOUT_SECS", 30),
            base_url: lookup("BINANCE_BASE_URL"),
        })
    }

    /// 프로세스 환경에서 생성.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(&indicator_core::process_env)
    }

    /// REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &str {
        if let Some(url) = &self.base_url {
            url.trim_end_matches('/')
        } else if self.testnet {
            "https://testnet.binancefuture.com"
        } else {
            "https://fapi.binance.com"
        }
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FuturesPrice {
    symbol: String,
    price: String,
    #[serde(default)]
    time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct BinanceError {
    code: i32,
    msg: String,
}

// ============================================================================
// Binance 선물 클라이언트
// ============================================================================

/// Binance 선물 가격 클라이언트.
pub struct BinanceFuturesClient {
    config: BinanceConfig,
    client: Client,
}

impl BinanceFuturesClient {
    /// 새 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: BinanceConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 공개 API 요청. API 키는 헤더로 함께 전송합니다.
    async fn public_get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.rest_base_url(), endpoint);

        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", self.config.credentials.api_key.expose_secret())
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                ExchangeError::ParseError(e.to_string())
            });
        }

        if status.as_u16() == 429 || status.as_u16() == 418 {
            return Err(ExchangeError::RateLimited);
        }

        match serde_json::from_str::<BinanceError>(&body) {
            Ok(err) => Err(Self::map_error_code(err.code, &err.msg)),
            Err(_) => Err(ExchangeError::ApiError {
                code: status.as_u16() as i32,
                message: body,
            }),
        }
    }

    /// Binance 에러 코드를 ExchangeError로 매핑.
    fn map_error_code(code: i32, msg: &str) -> ExchangeError {
        match code {
            -1003 => ExchangeError::RateLimited,
            -1022 | -2014 | -2015 => ExchangeError::Unauthorized(msg.to_string()),
            -1121 => ExchangeError::SymbolNotFound(msg.to_string()),
            _ => ExchangeError::ApiError {
                code,
                message: msg.to_string(),
            },
        }
    }

    /// 응답 목록을 스냅샷으로 변환.
    fn to_snapshot(entries: Vec<FuturesPrice>) -> ExchangeResult<PriceSnapshot> {
        let mut prices = BTreeMap::new();
        for entry in entries {
            let price = Decimal::from_str_exact(&entry.price).map_err(|e| {
                ExchangeError::ParseError(format!("{} price {:?}: {}", entry.symbol, entry.price, e))
            })?;
            prices.insert(Symbol::new(entry.symbol), price);
        }
        Ok(PriceSnapshot::new(prices))
    }
}

#[async_trait]
impl PriceSource for BinanceFuturesClient {
    fn name(&self) -> &str {
        "binance-futures"
    }

    async fn all_prices(&self) -> ExchangeResult<PriceSnapshot> {
        let entries: Vec<FuturesPrice> = self.public_get("/fapi/v1/ticker/price").await?;
        let snapshot = Self::to_snapshot(entries)?;
        debug!(count = snapshot.len(), "futures prices fetched");
        Ok(snapshot)
    }

    async fn ping(&self) -> ExchangeResult<()> {
        let _: serde_json::Value = self.public_get("/fapi/v1/ping").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use secrecy::SecretString;

    const PRICES_BODY: &str = r#"[
        {"symbol":"BTCUSDT","price":"27000.50","time":1700000000000},
        {"symbol":"ETHUSDT","price":"1800.2","time":1700000000000}
    ]"#;

    fn credentials() -> ApiCredentials {
        ApiCredentials {
            api_key: SecretString::from("test-api-key-1234"),
            api_secret: SecretString::from("test-secret"),
        }
    }

    fn client_for(server: &mockito::ServerGuard) -> BinanceFuturesClient {
        let config = BinanceConfig::new(credentials()).with_base_url(server.url());
        BinanceFuturesClient::new(config).expect("테스트용 클라이언트 생성 실패")
    }

    #[test]
    fn test_config_debug_masks_credentials() {
        let config = BinanceConfig::new(credentials());
        let debug = format!("{:?}", config);

        assert!(debug.contains("test...1234"));
        assert!(!debug.contains("test-secret"));
    }

    #[test]
    fn test_config_debug_masks_non_ascii_key() {
        let config = BinanceConfig::new(ApiCredentials {
            api_key: SecretString::from("키키키키-중간-값값값값"),
            api_secret: SecretString::from("secret"),
        });

        let debug = format!("{:?}", config);

        assert!(debug.contains("키키키키...값값값값"));
        assert_eq!(mask_key("짧은키"), "***REDACTED***");
    }

    #[test]
    fn test_rest_base_url() {
        let config = BinanceConfig::new(credentials());
        assert_eq!(config.rest_base_url(), "https://fapi.binance.com");
        assert_eq!(
            config.clone().with_testnet(true).rest_base_url(),
            "https://testnet.binancefuture.com"
        );
        assert_eq!(
            config.with_base_url("http://127.0.0.1:1234/").rest_base_url(),
            "http://127.0.0.1:1234"
        );
    }

    #[tokio::test]
    async fn test_all_prices_keeps_decimal_scale() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/fapi/v1/ticker/price")
            .match_header("X-MBX-APIKEY", "test-api-key-1234")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PRICES_BODY)
            .create_async()
            .await;

        let client = client_for(&server);
        let snapshot = client.all_prices().await.unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("BTCUSDT").unwrap().to_string(), "27000.50");
        assert_eq!(snapshot.get("ETHUSDT"), Some(dec!(1800.2)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_price_of_unknown_symbol_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fapi/v1/ticker/price")
            .with_status(200)
            .with_body(PRICES_BODY)
            .create_async()
            .await;

        let client = client_for(&server);

        assert_eq!(
            client.price(&Symbol::from("ETHUSDT")).await.unwrap(),
            dec!(1800.2)
        );
        let err = client.price(&Symbol::from("DOGEUSDT")).await.unwrap_err();
        assert!(err.is_unknown_symbol());
    }

    #[tokio::test]
    async fn test_list_symbols_is_sorted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fapi/v1/ticker/price")
            .with_status(200)
            .with_body(PRICES_BODY)
            .create_async()
            .await;

        let symbols = client_for(&server).list_symbols().await.unwrap();
        assert_eq!(symbols, vec![Symbol::from("BTCUSDT"), Symbol::from("ETHUSDT")]);
    }

    #[tokio::test]
    async fn test_error_responses_are_mapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fapi/v1/ticker/price")
            .with_status(401)
            .with_body(r#"{"code":-2015,"msg":"Invalid API-key, IP, or permissions for action."}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/fapi/v1/ping")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let client = client_for(&server);

        let err = client.all_prices().await.unwrap_err();
        assert!(matches!(err, ExchangeError::Unauthorized(_)));

        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, ExchangeError::ApiError { code: 503, .. }));
        assert!(err.is_network_fault());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_fault() {
        // 닫힌 포트로 연결 시도
        let config = BinanceConfig::new(credentials()).with_base_url("http://127.0.0.1:9");
        let client = BinanceFuturesClient::new(config).unwrap();

        let err = client.all_prices().await.unwrap_err();
        assert!(err.is_network_fault());
    }

    #[test]
    fn test_to_snapshot_rejects_malformed_price() {
        let entries = vec![FuturesPrice {
            symbol: "BTCUSDT".to_string(),
            price: "not-a-number".to_string(),
            time: None,
        }];

        let err = BinanceFuturesClient::to_snapshot(entries).unwrap_err();
        assert!(matches!(err, ExchangeError::ParseError(_)));
    }
}
