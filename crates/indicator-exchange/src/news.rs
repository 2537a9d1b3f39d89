//! NewsAPI 기반 암호화폐 뉴스 소스.
//!
//! `GET /v2/everything?q=<query>&sortBy=publishedAt` 결과를 최신순으로 반환합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indicator_core::{ConfigResult, VarLookup};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::traits::{ExchangeResult, NewsArticle, NewsSource};
use crate::ExchangeError;

/// 뉴스 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// NewsAPI 키
    pub api_key: SecretString,
    /// 검색어
    pub query: String,
    /// 기사 언어
    pub language: String,
    /// REST 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl NewsConfig {
    /// 새 설정 생성.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            query: "crypto".to_string(),
            language: "en".to_string(),
            base_url: "https://newsapi.org".to_string(),
            timeout_secs: 15,
        }
    }

    /// REST 기본 URL 재정의.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// 변수에서 생성. `NEWS_API_KEY`는 필수, `NEWS_QUERY`는 선택입니다.
    pub fn from_vars(lookup: VarLookup<'_>) -> ConfigResult<Self> {
        let mut config = Self::new(indicator_core::required_secret(lookup, "NEWS_API_KEY")?);
        if let Some(query) = lookup("NEWS_QUERY") {
            config.query = query;
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    source: RawSource,
    title: Option<String>,
    description: Option<String>,
    url: String,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiError {
    code: String,
    message: String,
}

/// NewsAPI 클라이언트.
pub struct NewsApiClient {
    config: NewsConfig,
    client: Client,
}

impl NewsApiClient {
    /// 새 클라이언트 생성.
    pub fn new(config: NewsConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn latest(&self, limit: usize) -> ExchangeResult<Vec<NewsArticle>> {
        let url = format!("{}/v2/everything", self.config.base_url);
        let page_size = limit.clamp(1, 100).to_string();

        debug!(query = %self.config.query, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", self.config.api_key.expose_secret())
            .query(&[
                ("q", self.config.query.as_str()),
                ("language", self.config.language.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<NewsApiError>(&body) {
                Ok(err) if status.as_u16() == 401 => ExchangeError::Unauthorized(err.message),
                Ok(err) if status.as_u16() == 429 || err.code == "rateLimited" => {
                    ExchangeError::RateLimited
                }
                Ok(err) => ExchangeError::ApiError {
                    code: status.as_u16() as i32,
                    message: format!("{}: {}", err.code, err.message),
                },
                Err(_) => ExchangeError::ApiError {
                    code: status.as_u16() as i32,
                    message: body,
                },
            });
        }

        let parsed: NewsResponse = serde_json::from_str(&body)?;

        Ok(parsed
            .articles
            .into_iter()
            // NewsAPI는 삭제된 기사를 "[Removed]" 제목으로 반환
            .filter_map(|a| {
                let title = a.title.filter(|t| t != "[Removed]")?;
                Some(NewsArticle {
                    title,
                    source: a.source.name.unwrap_or_else(|| "unknown".to_string()),
                    url: a.url,
                    published_at: a.published_at,
                    description: a.description,
                })
            })
            .take(limit)
            .collect())
    }
}
