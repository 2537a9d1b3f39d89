//! 메뉴 흐름 통합 테스트.
//!
//! 고정 가격 소스와 기록용 전송기로 컨트롤러 전체 경로를 검증합니다.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use indicator_cli::{
    BufferConsole, Cadence, CliError, ControllerContext, ExecutionMode, MenuController,
    MenuSelection, Outcome, Scheduler, ScriptedPrompt, CHANNEL_PROMPT, DEFAULT_NEWS_LIMIT,
    SYMBOL_PROMPT,
};
use indicator_core::ApiCredentials;
use indicator_exchange::{BinanceConfig, BinanceFuturesClient, PriceSource, StaticPriceSource};
use indicator_notification::{
    NotificationChannel, NotificationDispatcher, NotificationResult, NotificationSender,
    TelegramConfig, TelegramSender,
};
use rust_decimal::Decimal;
use secrecy::SecretString;

/// 전송된 메시지를 기록하는 전송기.
#[derive(Clone)]
struct RecordingSender {
    channel: NotificationChannel,
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingSender {
    fn new(channel: NotificationChannel) -> Self {
        Self {
            channel,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, message: &str) -> NotificationResult<()> {
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "recording"
    }
}

struct Harness {
    controller: MenuController,
    source: Arc<StaticPriceSource>,
    console: Arc<BufferConsole>,
    prompt: Arc<ScriptedPrompt>,
    senders: Vec<RecordingSender>,
}

impl Harness {
    async fn new(answers: &[&str]) -> Self {
        let source = Arc::new(StaticPriceSource::new([
            ("BTCUSDT", "27000.5"),
            ("ETHUSDT", "1800.2"),
        ]));
        Self::with_source(source, answers).await
    }

    async fn with_source(source: Arc<StaticPriceSource>, answers: &[&str]) -> Self {
        let symbols = source.list_symbols().await.unwrap();
        let console = Arc::new(BufferConsole::new());
        let prompt = Arc::new(ScriptedPrompt::new(answers.iter().copied()));

        let mut dispatcher = NotificationDispatcher::new();
        let senders: Vec<RecordingSender> = NotificationChannel::PROMPT_CHOICES
            .iter()
            .map(|c| RecordingSender::new(*c))
            .collect();
        for sender in &senders {
            dispatcher.register(sender.clone());
        }

        let controller = MenuController::new(ControllerContext {
            symbols,
            price_source: source.clone(),
            news_source: None,
            scheduler: Arc::new(Scheduler::new()),
            dispatcher: Arc::new(dispatcher),
            prompt: prompt.clone(),
            console: console.clone(),
            cadence: Cadence::every(Duration::from_secs(15)),
            news_limit: DEFAULT_NEWS_LIMIT,
        });

        Self {
            controller,
            source,
            console,
            prompt,
            senders,
        }
    }

    fn dispatched(&self) -> Vec<(NotificationChannel, String)> {
        self.senders
            .iter()
            .flat_map(|s| s.sent().into_iter().map(move |m| (s.channel, m)))
            .collect()
    }
}

#[tokio::test]
async fn single_symbol_once_prints_without_dispatch() {
    let h = Harness::new(&["BTCUSDT"]).await;

    let outcome = h
        .controller
        .run(MenuSelection::parse("1"))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Completed);
    assert!(h.console.contents().contains("BTCUSDT: 27000.5"));
    assert!(h.dispatched().is_empty());
}

#[tokio::test]
async fn single_symbol_notify_sends_exact_message_once() {
    let h = Harness::new(&["ETHUSDT", "Telegram"]).await;

    let outcome = h
        .controller
        .run(MenuSelection::parse(ExecutionMode::SingleSymbolNotify.label()))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Notified(NotificationChannel::Telegram));
    assert_eq!(
        h.dispatched(),
        vec![(
            NotificationChannel::Telegram,
            "The Price of [ETHUSDT]: 1800.2".to_string()
        )]
    );
    assert!(!h.console.contents().contains("1800.2"));
    assert_eq!(h.prompt.asked(), vec![SYMBOL_PROMPT, CHANNEL_PROMPT]);
}

#[tokio::test]
async fn all_symbols_notify_is_lossless_snapshot_of_printed_table() {
    let source = Arc::new(StaticPriceSource::new([
        ("BTCUSDT", "27000.50"),
        ("DOGEUSDT", "0.0623100"),
        ("ETHUSDT", "1800.2"),
    ]));

    let printed = Harness::with_source(source.clone(), &[]).await;
    printed
        .controller
        .run(ExecutionMode::AllSymbolsOnce.into())
        .await
        .unwrap();

    let notified = Harness::with_source(source.clone(), &["Discord"]).await;
    notified
        .controller
        .run(ExecutionMode::AllSymbolsNotify.into())
        .await
        .unwrap();

    let dispatched = notified.dispatched();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].0, NotificationChannel::Discord);

    let parsed: BTreeMap<String, Decimal> = serde_json::from_str(&dispatched[0].1).unwrap();
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed["DOGEUSDT"].to_string(), "0.0623100");

    let table: BTreeMap<String, String> = printed
        .console
        .lines()
        .iter()
        .skip(3)
        .filter_map(|line| line.split_once(" | "))
        .map(|(symbol, price)| (symbol.trim().to_string(), price.to_string()))
        .collect();
    let sent: BTreeMap<String, String> = parsed
        .iter()
        .map(|(symbol, price)| (symbol.clone(), price.to_string()))
        .collect();
    assert_eq!(sent, table);
}

#[tokio::test]
async fn exit_and_unrecognized_do_nothing() {
    for selection in [
        MenuSelection::parse("8"),
        MenuSelection::parse("Exit"),
        MenuSelection::parse("tell me a joke"),
    ] {
        let h = Harness::new(&["BTCUSDT", "Telegram"]).await;
        let before = h.source.call_count();

        let outcome = h.controller.run(selection).await.unwrap();

        assert_eq!(outcome, Outcome::Exit);
        assert_eq!(h.source.call_count(), before);
        assert!(h.dispatched().is_empty());
        assert!(h.prompt.asked().is_empty());
        assert!(h.console.lines().is_empty());
    }
}

#[tokio::test]
async fn unknown_channel_answer_dispatches_nothing() {
    let h = Harness::new(&["BTCUSDT", "Carrier Pigeon"]).await;

    let err = h
        .controller
        .run(ExecutionMode::SingleSymbolNotify.into())
        .await
        .unwrap_err();

    assert!(err.is_unknown_channel());
    assert!(h.dispatched().is_empty());
}

#[tokio::test]
async fn failing_source_surfaces_network_fault() {
    let h = Harness::new(&["BTCUSDT"]).await;
    h.source.set_failure(Some("connection reset"));

    let err = h
        .controller
        .run(ExecutionMode::SingleSymbolOnce.into())
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Exchange(ref e) if e.is_network_fault()));
    assert!(h.console.lines().is_empty());
}

#[tokio::test(start_paused = true)]
async fn recurring_failure_is_contained_per_tick() {
    let h = Harness::new(&[]).await;
    h.source.set_failure(Some("connection reset"));
    let before = h.source.call_count();

    let Outcome::Scheduled(id) = h
        .controller
        .run(ExecutionMode::AllSymbolsRecurring.into())
        .await
        .unwrap()
    else {
        panic!("expected a scheduled task");
    };

    tokio::time::sleep(Duration::from_secs(16)).await;
    h.source.set_failure(None);
    tokio::time::sleep(Duration::from_secs(15)).await;

    let scheduler = &h.controller.context().scheduler;
    assert!(scheduler.is_running(id));
    assert_eq!(h.source.call_count() - before, 3);
    assert!(h.console.contents().contains("BTCUSDT | 27000.5"));
    assert_eq!(scheduler.stats(id).unwrap().failed(), 2);

    scheduler.shutdown().await;
}

#[tokio::test]
async fn binance_prices_reach_telegram() {
    let mut binance = mockito::Server::new_async().await;
    let prices = binance
        .mock("GET", "/fapi/v1/ticker/price")
        .match_header("X-MBX-APIKEY", "key")
        .with_status(200)
        .with_body(
            r#"[{"symbol":"BTCUSDT","price":"27000.50","time":1700000000000},
                {"symbol":"ETHUSDT","price":"1800.20","time":1700000000000}]"#,
        )
        .expect(2)
        .create_async()
        .await;

    let mut telegram = mockito::Server::new_async().await;
    let sent = telegram
        .mock("POST", "/bottoken/sendMessage")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "chat_id": "42",
            "text": "The Price of [ETHUSDT]: 1800.20",
        })))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let credentials = ApiCredentials {
        api_key: SecretString::from("key"),
        api_secret: SecretString::from("secret"),
    };
    let source: Arc<dyn PriceSource> = Arc::new(
        BinanceFuturesClient::new(BinanceConfig::new(credentials).with_base_url(binance.url()))
            .unwrap(),
    );

    let mut dispatcher = NotificationDispatcher::new();
    dispatcher.register(TelegramSender::new(
        TelegramConfig::new(SecretString::from("token"), "42").with_api_base(telegram.url()),
    ));

    let controller = MenuController::new(ControllerContext {
        symbols: source.list_symbols().await.unwrap(),
        price_source: source,
        news_source: None,
        scheduler: Arc::new(Scheduler::new()),
        dispatcher: Arc::new(dispatcher),
        prompt: Arc::new(ScriptedPrompt::new(["ETHUSDT", "Telegram"])),
        console: Arc::new(BufferConsole::new()),
        cadence: Cadence::every(Duration::from_secs(15)),
        news_limit: DEFAULT_NEWS_LIMIT,
    });

    let outcome = controller
        .run(ExecutionMode::SingleSymbolNotify.into())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Notified(NotificationChannel::Telegram));
    prices.assert_async().await;
    sent.assert_async().await;
}

#[tokio::test]
async fn full_snapshot_goes_out_in_one_telegram_request() {
    let entries: Vec<(String, String)> = (0..300)
        .map(|i| (format!("SYM{:03}USDT", i), format!("{}.12345", i)))
        .collect();
    let source = Arc::new(StaticPriceSource::new(
        entries.iter().map(|(s, p)| (s.as_str(), p.as_str())),
    ));
    let expected = source.all_prices().await.unwrap().to_json().unwrap();
    assert!(expected.chars().count() > 4096);

    let mut telegram = mockito::Server::new_async().await;
    let sent = telegram
        .mock("POST", "/bottoken/sendMessage")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "chat_id": "42",
            "text": expected,
        })))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let mut dispatcher = NotificationDispatcher::new();
    dispatcher.register(TelegramSender::new(
        TelegramConfig::new(SecretString::from("token"), "42").with_api_base(telegram.url()),
    ));

    let controller = MenuController::new(ControllerContext {
        symbols: source.list_symbols().await.unwrap(),
        price_source: source,
        news_source: None,
        scheduler: Arc::new(Scheduler::new()),
        dispatcher: Arc::new(dispatcher),
        prompt: Arc::new(ScriptedPrompt::new(["Telegram"])),
        console: Arc::new(BufferConsole::new()),
        cadence: Cadence::every(Duration::from_secs(15)),
        news_limit: DEFAULT_NEWS_LIMIT,
    });

    let outcome = controller
        .run(ExecutionMode::AllSymbolsNotify.into())
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Notified(NotificationChannel::Telegram));
    sent.assert_async().await;
}
