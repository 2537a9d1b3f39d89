//! 암호화폐 가격 조회 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 대화형 메뉴
//! crypto-indicator
//!
//! # BTCUSDT 가격 한 번 조회
//! crypto-indicator --mode 1 --symbol BTCUSDT
//!
//! # 전체 가격을 Telegram으로 전송
//! crypto-indicator --mode 7 --channel Telegram
//!
//! # 네트워크 없이 데모 가격으로 15초마다 조회
//! crypto-indicator --simulated --mode 4
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicator_core::{init_logging, load_env_file, ConfigError, LogConfig, DEFAULT_ENV_FILE};
use indicator_exchange::{
    BinanceConfig, BinanceFuturesClient, NewsApiClient, NewsConfig, NewsSource, PriceSource,
    StaticPriceSource,
};
use indicator_notification::NotificationDispatcher;
use tracing::{debug, info, warn};

use indicator_cli::output::{GREEN, RED, RESET, YELLOW};
use indicator_cli::{
    startup_exit_code, Cadence, CliError, Console, ConsolePrompt, ControllerContext,
    ExecutionMode, MenuController, MenuSelection, OverlapPolicy, Outcome, PresetPrompt, Prompt,
    Scheduler, StdoutConsole, CHANNEL_PROMPT, DEFAULT_NEWS_LIMIT, MAIN_PROMPT, SYMBOL_PROMPT,
};

#[derive(Parser)]
#[command(name = "crypto-indicator")]
#[command(about = "Crypto price indicator - Binance futures prices, news and notifications", long_about = None)]
#[command(version)]
struct Cli {
    /// 메뉴 선택 (번호 1-8 또는 라벨)
    #[arg(short, long)]
    mode: Option<String>,

    /// 심볼 프롬프트 응답 (예: BTCUSDT)
    #[arg(short, long)]
    symbol: Option<String>,

    /// 알림 채널 프롬프트 응답 (Telegram, Discord, WhatsApp, Email)
    #[arg(short, long)]
    channel: Option<String>,

    /// env 파일 경로
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// 로그 레벨 (RUST_LOG가 있으면 무시)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// 거래소 대신 고정 데모 가격 사용
    #[arg(long, default_value = "false")]
    simulated: bool,

    /// 시작 시 연결 확인 생략
    #[arg(long, default_value = "false")]
    skip_ping: bool,

    /// 반복 조회 중 이전 조회가 끝나지 않았을 때의 처리
    #[arg(long, value_enum, default_value = "skip")]
    overlap: OverlapArg,

    /// 뉴스 기사 수
    #[arg(long, default_value_t = DEFAULT_NEWS_LIMIT)]
    news_limit: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OverlapArg {
    /// 실행 중이면 해당 주기 건너뜀
    Skip,
    /// 끝날 때까지 기다린 뒤 실행
    Serial,
}

impl From<OverlapArg> for OverlapPolicy {
    fn from(arg: OverlapArg) -> Self {
        match arg {
            OverlapArg::Skip => OverlapPolicy::SkipIfBusy,
            OverlapArg::Serial => OverlapPolicy::Serial,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = load_env_file(&cli.env_file) {
        return report_startup_error(&e);
    }

    if let Err(e) = init_logging(&LogConfig::from_env(cli.log_level.clone())) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let binance = if cli.simulated {
        None
    } else {
        match BinanceConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => return report_startup_error(&e),
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}Error: failed to start the async runtime: {}{}", RED, e, RESET);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, binance)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}Error: {:#}{}", RED, e, RESET);
            ExitCode::FAILURE
        }
    }
}

/// 시작 설정 에러를 stderr에 안내하고 종료 코드를 반환합니다.
fn report_startup_error(err: &ConfigError) -> ExitCode {
    match err {
        ConfigError::MissingFile(_) => {
            eprintln!("{}Please create an .env file. Refer to the README.{}", RED, RESET)
        }
        ConfigError::MissingVar(var) => eprintln!(
            "{}Please add {} to your .env file. Refer to the README.{}",
            RED, var, RESET
        ),
        _ => eprintln!("{}Error: {}{}", RED, err, RESET),
    }
    ExitCode::from(startup_exit_code(err))
}

async fn run(cli: Cli, binance: Option<BinanceConfig>) -> Result<()> {
    let console: Arc<dyn Console> = Arc::new(StdoutConsole);
    let price_source = build_price_source(binance)?;

    if !cli.skip_ping {
        check_connectivity(&*price_source, &*console).await;
    }

    let symbols = price_source
        .list_symbols()
        .await
        .context("Failed to load the symbol list")?;
    info!(source = price_source.name(), count = symbols.len(), "Symbols loaded");

    let prompt = Arc::new(
        PresetPrompt::new(ConsolePrompt::stdin(console.clone()))
            .with_answer(SYMBOL_PROMPT, cli.symbol.clone())
            .with_answer(CHANNEL_PROMPT, cli.channel.clone()),
    );

    let selection = match &cli.mode {
        Some(mode) => MenuSelection::parse(mode),
        None => match prompt.select(MAIN_PROMPT, &ExecutionMode::labels()).await {
            Ok(answer) => MenuSelection::parse(&answer),
            Err(CliError::InputClosed) => {
                info!("Input closed before a selection was made");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        },
    };

    let cadence = Cadence::every_15_seconds();
    let scheduler = Arc::new(Scheduler::with_policy(cli.overlap.into()));
    let controller = MenuController::new(ControllerContext {
        symbols,
        price_source,
        news_source: build_news_source(),
        scheduler: scheduler.clone(),
        dispatcher: Arc::new(NotificationDispatcher::from_env()),
        prompt,
        console: console.clone(),
        cadence,
        news_limit: cli.news_limit,
    });

    match controller.run(selection).await? {
        Outcome::Scheduled(id) => {
            console.print(&format!(
                "Fetching prices every {}s. Press Ctrl+C to stop.",
                cadence.period().as_secs()
            ));
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl+C")?;
            info!(task_id = %id, "Ctrl+C received, stopping");
            scheduler.shutdown().await;
        }
        Outcome::Notified(channel) => {
            console.print(&format!("{}Sent to {}.{}", GREEN, channel, RESET));
        }
        Outcome::Completed | Outcome::Exit => {}
    }

    Ok(())
}

/// `config`가 없으면 고정 데모 가격을 사용합니다.
fn build_price_source(config: Option<BinanceConfig>) -> Result<Arc<dyn PriceSource>> {
    let Some(config) = config else {
        info!("Using simulated prices");
        return Ok(Arc::new(StaticPriceSource::demo()));
    };

    debug!(?config, "Binance client configured");
    Ok(Arc::new(BinanceFuturesClient::new(config)?))
}

fn build_news_source() -> Option<Arc<dyn NewsSource>> {
    let config = match NewsConfig::from_vars(&indicator_core::process_env) {
        Ok(config) => config,
        Err(e) => {
            debug!("News source disabled: {}", e);
            return None;
        }
    };

    match NewsApiClient::new(config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("News source disabled: {}", e);
            None
        }
    }
}

async fn check_connectivity(source: &dyn PriceSource, console: &dyn Console) {
    match source.ping().await {
        Ok(()) => console.print("[200] The Binance services are working"),
        Err(e) => {
            warn!("Connectivity check failed: {}", e);
            console.print(&format!(
                "{}[!] The Binance services are not reachable: {}{}",
                YELLOW, e, RESET
            ));
        }
    }
}
