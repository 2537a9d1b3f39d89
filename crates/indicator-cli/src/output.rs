//! 콘솔 출력과 출력 포맷.

use chrono::{DateTime, SecondsFormat, Utc};
use indicator_core::{PriceSnapshot, Symbol};
use indicator_exchange::NewsArticle;
use rust_decimal::Decimal;
use std::sync::Mutex;

/// ANSI 빨간색.
pub const RED: &str = "\x1b[31m";
/// ANSI 노란색.
pub const YELLOW: &str = "\x1b[33m";
/// ANSI 초록색.
pub const GREEN: &str = "\x1b[32m";
/// ANSI 색상 초기화.
pub const RESET: &str = "\x1b[0m";

/// 반복 조회 구분선 길이.
pub const SEPARATOR_WIDTH: usize = 50;

/// 출력 대상.
pub trait Console: Send + Sync {
    /// 한 줄을 출력합니다.
    fn print(&self, line: &str);

    /// 여러 줄을 출력합니다.
    fn print_lines(&self, lines: &[String]) {
        for line in lines {
            self.print(line);
        }
    }
}

/// 표준 출력.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&self, line: &str) {
        println!("{}", line);
    }
}

/// 출력을 메모리에 모으는 콘솔 (테스트용).
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: Mutex<Vec<String>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 출력된 줄.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// 전체 출력을 하나의 문자열로 반환합니다.
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }
}

impl Console for BufferConsole {
    fn print(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// 가격 헤더: `Binance Crypto Future Price @[<rfc3339>]`.
pub fn price_header(at: DateTime<Utc>) -> String {
    format!(
        "Binance Crypto Future Price @[{}]",
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// 단일 심볼 가격 줄.
pub fn symbol_line(symbol: &Symbol, price: Decimal) -> String {
    format!("{}: {}", symbol, price)
}

/// 반복 조회 사이의 빨간 구분선.
pub fn separator() -> String {
    format!("{}{}{}", RED, "*".repeat(SEPARATOR_WIDTH), RESET)
}

/// 전체 가격 표.
pub fn price_table(snapshot: &PriceSnapshot) -> Vec<String> {
    let width = snapshot
        .iter()
        .map(|(s, _)| s.as_str().len())
        .max()
        .unwrap_or(0)
        .max("SYMBOL".len());

    let mut lines = Vec::with_capacity(snapshot.len() + 2);
    lines.push(format!("{:<width$} | {}", "SYMBOL", "PRICE", width = width));
    lines.push("-".repeat(width + 16));
    for (symbol, price) in snapshot.iter() {
        lines.push(format!("{:<width$} | {}", symbol.as_str(), price, width = width));
    }
    lines
}

/// 뉴스 기사 목록.
pub fn news_lines(articles: &[NewsArticle]) -> Vec<String> {
    if articles.is_empty() {
        return vec!["No news articles found.".to_string()];
    }

    let mut lines = Vec::with_capacity(articles.len() * 4);
    for (i, article) in articles.iter().enumerate() {
        lines.push(format!("{}{}. {}{}", GREEN, i + 1, article.title, RESET));
        if let Some(description) = article.description.as_deref().map(str::trim) {
            if !description.is_empty() {
                lines.push(format!("   {}", description));
            }
        }
        let published = article
            .published_at
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!("   {} | {}", article.source, published));
        lines.push(format!("   {}", article.url));
    }
    lines
}
