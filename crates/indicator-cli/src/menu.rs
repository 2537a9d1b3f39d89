//! 메뉴 항목과 사용자 선택.

use std::fmt;

/// 첫 번째 프롬프트 문구.
pub const MAIN_PROMPT: &str = "How can I help you today?";

/// 심볼 선택 프롬프트 문구.
pub const SYMBOL_PROMPT: &str = "What is the crypto symbol you want to know the price from?";

/// 알림 채널 선택 프롬프트 문구.
pub const CHANNEL_PROMPT: &str = "Where do you want me to send the details to?";

/// 메뉴에서 선택할 수 있는 실행 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    SingleSymbolOnce,
    AllSymbolsOnce,
    SingleSymbolRecurring,
    AllSymbolsRecurring,
    FetchNews,
    SingleSymbolNotify,
    AllSymbolsNotify,
    Exit,
}

impl ExecutionMode {
    /// 메뉴 표시 순서.
    pub const ALL: [ExecutionMode; 8] = [
        ExecutionMode::SingleSymbolOnce,
        ExecutionMode::AllSymbolsOnce,
        ExecutionMode::SingleSymbolRecurring,
        ExecutionMode::AllSymbolsRecurring,
        ExecutionMode::FetchNews,
        ExecutionMode::SingleSymbolNotify,
        ExecutionMode::AllSymbolsNotify,
        ExecutionMode::Exit,
    ];

    /// 메뉴 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionMode::SingleSymbolOnce => "I want to know the price of a cryptocurrency",
            ExecutionMode::AllSymbolsOnce => "I want to know the price of all cryptocurrency",
            ExecutionMode::SingleSymbolRecurring => {
                "I want to know the price of a cryptocurrency continuously for the next 15 mins"
            }
            ExecutionMode::AllSymbolsRecurring => {
                "I want to know the price of all cryptocurrency continuously for the next 15 mins"
            }
            ExecutionMode::FetchNews => "I want to get the latest crypto news",
            ExecutionMode::SingleSymbolNotify => {
                "I want to get the price of a cryptocurrency sent to me"
            }
            ExecutionMode::AllSymbolsNotify => "I want to get the price of all cryptocurrency sent to me",
            ExecutionMode::Exit => "Exit",
        }
    }

    /// 1부터 시작하는 메뉴 번호.
    pub fn number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|m| m == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// 메뉴 라벨 목록.
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|m| m.label().to_string()).collect()
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 메뉴 프롬프트에 대한 응답.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSelection {
    /// 여덟 개 메뉴 중 하나
    Mode(ExecutionMode),
    /// 메뉴에 없는 입력
    Unrecognized(String),
}

impl MenuSelection {
    /// 메뉴 번호(1-8) 또는 정확한 라벨을 해석합니다.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if let Ok(number) = trimmed.parse::<usize>() {
            if let Some(mode) = number
                .checked_sub(1)
                .and_then(|i| ExecutionMode::ALL.get(i))
            {
                return MenuSelection::Mode(*mode);
            }
        }

        ExecutionMode::ALL
            .iter()
            .find(|m| m.label() == trimmed)
            .map(|m| MenuSelection::Mode(*m))
            .unwrap_or_else(|| MenuSelection::Unrecognized(input.to_string()))
    }
}

impl From<ExecutionMode> for MenuSelection {
    fn from(mode: ExecutionMode) -> Self {
        MenuSelection::Mode(mode)
    }
}
