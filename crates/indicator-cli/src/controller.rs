//! 메뉴 컨트롤러.
//!
//! 메뉴 선택 하나를 정확히 하나의 실행 모드로 바꿔 실행합니다.
//!
//! | 모드 | 동작 |
//! |------|------|
//! | `*Once` | 가격을 한 번 조회해 콘솔에 출력 |
//! | `*Recurring` | 스케줄러에 반복 조회 작업을 등록하고 즉시 반환 |
//! | `*Notify` | 한 번 조회한 결과를 선택한 채널로 전송 (콘솔 가격 출력 없음) |
//! | `FetchNews` | 최신 뉴스 출력 |
//! | `Exit` / 인식 불가 | 아무 동작 없이 종료 |

use std::sync::Arc;

use chrono::Utc;
use indicator_core::{price_message, Symbol};
use indicator_exchange::{ExchangeError, NewsSource, PriceSource};
use indicator_notification::{NotificationChannel, NotificationDispatcher, NotificationError};
use tracing::{info, warn};

use crate::error::{CliError, CliResult};
use crate::menu::{ExecutionMode, MenuSelection, CHANNEL_PROMPT, SYMBOL_PROMPT};
use crate::output::{news_lines, price_header, price_table, separator, symbol_line, Console};
use crate::prompt::Prompt;
use crate::scheduler::{Cadence, Scheduler, TaskId};

/// 기본 뉴스 기사 수.
pub const DEFAULT_NEWS_LIMIT: usize = 10;

/// 메뉴 실행 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 일회성 모드 완료
    Completed,
    /// 반복 작업 등록됨
    Scheduled(TaskId),
    /// 알림 전송 완료
    Notified(NotificationChannel),
    /// 종료
    Exit,
}

/// 컨트롤러가 사용하는 협력 객체.
pub struct ControllerContext {
    /// 선택 가능한 심볼 (시작 시 조회)
    pub symbols: Vec<Symbol>,
    pub price_source: Arc<dyn PriceSource>,
    /// 설정되지 않았으면 `None`
    pub news_source: Option<Arc<dyn NewsSource>>,
    pub scheduler: Arc<Scheduler>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub prompt: Arc<dyn Prompt>,
    pub console: Arc<dyn Console>,
    /// 반복 조회 주기
    pub cadence: Cadence,
    pub news_limit: usize,
}

/// 메뉴 선택을 실행 모드로 분기하는 컨트롤러.
pub struct MenuController {
    ctx: ControllerContext,
}

impl MenuController {
    pub fn new(ctx: ControllerContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ControllerContext {
        &self.ctx
    }

    /// 선택 하나를 실행합니다.
    pub async fn run(&self, selection: MenuSelection) -> CliResult<Outcome> {
        let mode = match selection {
            MenuSelection::Mode(mode) => mode,
            MenuSelection::Unrecognized(input) => {
                warn!(input = %input, "Unrecognized menu selection, exiting");
                return Ok(Outcome::Exit);
            }
        };

        info!(mode = ?mode, "Running menu selection");

        match mode {
            ExecutionMode::SingleSymbolOnce => {
                let symbol = self.ask_symbol().await?;
                print_symbol_price(&*self.ctx.price_source, &*self.ctx.console, &symbol).await?;
                Ok(Outcome::Completed)
            }
            ExecutionMode::AllSymbolsOnce => {
                print_all_prices(&*self.ctx.price_source, &*self.ctx.console).await?;
                Ok(Outcome::Completed)
            }
            ExecutionMode::SingleSymbolRecurring => {
                let symbol = self.ask_symbol().await?;
                Ok(Outcome::Scheduled(self.schedule_prices(Some(symbol))))
            }
            ExecutionMode::AllSymbolsRecurring => Ok(Outcome::Scheduled(self.schedule_prices(None))),
            ExecutionMode::FetchNews => {
                self.print_news().await?;
                Ok(Outcome::Completed)
            }
            ExecutionMode::SingleSymbolNotify => {
                let symbol = self.ask_symbol().await?;
                let price = self.ctx.price_source.price(&symbol).await?;
                let message = price_message(&symbol, price);
                self.notify(&message).await
            }
            ExecutionMode::AllSymbolsNotify => {
                let snapshot = self.ctx.price_source.all_prices().await?;
                let message = snapshot.to_json()?;
                self.notify(&message).await
            }
            ExecutionMode::Exit => Ok(Outcome::Exit),
        }
    }

    /// 심볼을 묻고 현재 목록에 있는지 확인합니다.
    async fn ask_symbol(&self) -> CliResult<Symbol> {
        let choices: Vec<String> = self.ctx.symbols.iter().map(|s| s.to_string()).collect();
        let answer = self.ctx.prompt.select(SYMBOL_PROMPT, &choices).await?;
        let symbol = Symbol::new(answer.trim());

        if !symbol.is_listed_in(&self.ctx.symbols) {
            return Err(ExchangeError::SymbolNotFound(symbol.to_string()).into());
        }
        Ok(symbol)
    }

    /// 알림 채널을 묻습니다. 프롬프트 선택지 밖의 라벨은 `UnknownChannel`입니다.
    async fn ask_channel(&self) -> CliResult<NotificationChannel> {
        let answer = self
            .ctx
            .prompt
            .select(CHANNEL_PROMPT, &NotificationChannel::prompt_labels())
            .await?;

        let channel: NotificationChannel = answer.parse()?;
        if !NotificationChannel::PROMPT_CHOICES.contains(&channel) {
            return Err(NotificationError::UnknownChannel(answer).into());
        }
        Ok(channel)
    }

    async fn notify(&self, message: &str) -> CliResult<Outcome> {
        let channel = self.ask_channel().await?;
        self.ctx.dispatcher.send(channel, message).await?;
        info!(channel = %channel, "Price details sent");
        Ok(Outcome::Notified(channel))
    }

    /// 반복 조회 작업을 등록합니다. `symbol`이 없으면 전체 가격을 조회합니다.
    fn schedule_prices(&self, symbol: Option<Symbol>) -> TaskId {
        let source = self.ctx.price_source.clone();
        let console = self.ctx.console.clone();
        let name = match &symbol {
            Some(symbol) => format!("price:{}", symbol),
            None => "price:all".to_string(),
        };

        self.ctx.scheduler.schedule(name, self.ctx.cadence, move || {
            let source = source.clone();
            let console = console.clone();
            let symbol = symbol.clone();
            async move {
                console.print(&separator());
                match symbol {
                    Some(symbol) => print_symbol_price(&*source, &*console, &symbol).await,
                    None => print_all_prices(&*source, &*console).await,
                }
            }
        })
    }

    async fn print_news(&self) -> CliResult<()> {
        let news = self
            .ctx
            .news_source
            .as_ref()
            .ok_or(CliError::NotConfigured("news source (NEWS_API_KEY)"))?;

        let articles = news.latest(self.ctx.news_limit).await?;
        self.ctx.console.print_lines(&news_lines(&articles));
        Ok(())
    }
}

/// 단일 심볼 가격을 조회해 출력합니다.
async fn print_symbol_price(
    source: &dyn PriceSource,
    console: &dyn Console,
    symbol: &Symbol,
) -> CliResult<()> {
    let price = source.price(symbol).await?;
    console.print(&price_header(Utc::now()));
    console.print(&symbol_line(symbol, price));
    Ok(())
}

/// 전체 가격을 조회해 표로 출력합니다.
async fn print_all_prices(source: &dyn PriceSource, console: &dyn Console) -> CliResult<()> {
    let snapshot = source.all_prices().await?;
    console.print(&price_header(snapshot.fetched_at()));
    console.print_lines(&price_table(&snapshot));
    Ok(())
}
