//! # Indicator CLI
//!
//! 대화형 암호화폐 가격 조회 도구의 메뉴 흐름.
//!
//! - [`controller`]: 메뉴 선택을 실행 모드로 분기
//! - [`scheduler`]: 겹치지 않는 반복 작업 실행
//! - [`prompt`]: 번호/라벨 단일 선택 프롬프트
//! - [`output`]: 콘솔 출력 포맷

pub mod controller;
pub mod error;
pub mod menu;
pub mod output;
pub mod prompt;
pub mod scheduler;

pub use controller::{ControllerContext, MenuController, Outcome, DEFAULT_NEWS_LIMIT};
pub use error::{startup_exit_code, CliError, CliResult};
pub use menu::{ExecutionMode, MenuSelection, CHANNEL_PROMPT, MAIN_PROMPT, SYMBOL_PROMPT};
pub use output::{BufferConsole, Console, StdoutConsole};
pub use prompt::{ConsolePrompt, PresetPrompt, Prompt, ScriptedPrompt};
pub use scheduler::{Cadence, OverlapPolicy, Scheduler, TaskId, TaskStats};
