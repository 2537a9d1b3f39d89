//! 단일 선택 프롬프트.
//!
//! 선택지는 번호 또는 정확한 라벨로 입력할 수 있습니다.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::error::{CliError, CliResult};
use crate::output::{Console, RESET, YELLOW};

/// 이 개수를 넘는 선택지는 번호 목록 대신 예시만 표시합니다.
pub const MAX_LISTED_CHOICES: usize = 20;

/// 단일 선택 프롬프트.
#[async_trait]
pub trait Prompt: Send + Sync {
    /// `message`를 표시하고 `choices` 중 하나에 대한 응답을 반환합니다.
    async fn select(&self, message: &str, choices: &[String]) -> CliResult<String>;
}

/// 번호(1부터) 또는 정확한 라벨을 선택지로 해석합니다.
pub fn resolve_choice(input: &str, choices: &[String]) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(number) = input.parse::<usize>() {
        if let Some(choice) = number.checked_sub(1).and_then(|i| choices.get(i)) {
            return Some(choice.clone());
        }
    }

    choices.iter().find(|c| c.as_str() == input).cloned()
}

/// 콘솔 입력 프롬프트.
///
/// 잘못된 입력은 다시 묻고, 입력이 끝나면 `CliError::InputClosed`를 반환합니다.
pub struct ConsolePrompt<R> {
    lines: tokio::sync::Mutex<Lines<R>>,
    console: Arc<dyn Console>,
}

impl ConsolePrompt<BufReader<Stdin>> {
    /// 표준 입력에서 응답을 읽는 프롬프트.
    pub fn stdin(console: Arc<dyn Console>) -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()), console)
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsolePrompt<R> {
    pub fn from_reader(reader: R, console: Arc<dyn Console>) -> Self {
        Self {
            lines: tokio::sync::Mutex::new(reader.lines()),
            console,
        }
    }

    fn show(&self, message: &str, choices: &[String]) {
        self.console.print(&format!("? {}", message));
        if choices.len() <= MAX_LISTED_CHOICES {
            for (i, choice) in choices.iter().enumerate() {
                self.console.print(&format!("  {}) {}", i + 1, choice));
            }
        } else {
            let examples: Vec<&str> = choices.iter().take(5).map(String::as_str).collect();
            self.console.print(&format!(
                "  Type one of {} choices (e.g. {}, ...)",
                choices.len(),
                examples.join(", ")
            ));
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Prompt for ConsolePrompt<R> {
    async fn select(&self, message: &str, choices: &[String]) -> CliResult<String> {
        self.show(message, choices);

        let mut lines = self.lines.lock().await;
        loop {
            let Some(line) = lines.next_line().await? else {
                return Err(CliError::InputClosed);
            };

            match resolve_choice(&line, choices) {
                Some(choice) => return Ok(choice),
                None => self.console.print(&format!(
                    "{}Please choose one of the listed options.{}",
                    YELLOW, RESET
                )),
            }
        }
    }
}

/// 미리 지정된 응답을 먼저 사용하는 프롬프트.
///
/// 지정된 응답은 선택지 검증 없이 그대로 반환되며, 검증은 호출자가 합니다.
pub struct PresetPrompt<P> {
    answers: HashMap<String, String>,
    inner: P,
}

impl<P: Prompt> PresetPrompt<P> {
    pub fn new(inner: P) -> Self {
        Self {
            answers: HashMap::new(),
            inner,
        }
    }

    /// 프롬프트 문구에 대한 응답을 지정합니다. `None`이면 무시합니다.
    pub fn with_answer(mut self, message: &str, answer: Option<String>) -> Self {
        if let Some(answer) = answer {
            self.answers.insert(message.to_string(), answer);
        }
        self
    }
}

#[async_trait]
impl<P: Prompt> Prompt for PresetPrompt<P> {
    async fn select(&self, message: &str, choices: &[String]) -> CliResult<String> {
        if let Some(answer) = self.answers.get(message) {
            debug!(prompt = message, answer = %answer, "Using preset answer");
            return Ok(answer.clone());
        }
        self.inner.select(message, choices).await
    }
}

/// 정해진 순서로 응답하고 질문을 기록하는 프롬프트.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// 지금까지 표시된 프롬프트 문구.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn select(&self, message: &str, _choices: &[String]) -> CliResult<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop_front())
            .ok_or(CliError::InputClosed)
    }
}
