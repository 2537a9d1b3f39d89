//! 설정 관리.
//!
//! 자격증명은 로컬 env 파일(기본 `.env`)에 보관하고 `dotenvy`로 프로세스 환경에
//! 로드합니다. 각 구성요소의 설정 구조체는 변수 조회 함수(`VarLookup`)를 받아
//! 생성되므로, 테스트에서는 프로세스 환경 대신 맵을 사용할 수 있습니다.

use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// 기본 env 파일 경로.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// 변수 이름으로 값을 조회하는 함수.
pub type VarLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// 프로세스 환경에서 변수를 조회합니다. 빈 문자열은 없는 것으로 취급합니다.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// env 파일을 프로세스 환경에 로드합니다.
///
/// 파일이 없으면 `ConfigError::MissingFile`을 반환하며, 이 경우 네트워크 호출 전에
/// 프로그램을 종료해야 합니다. 이미 설정된 환경 변수는 덮어쓰지 않습니다.
pub fn load_env_file(path: &Path) -> ConfigResult<PathBuf> {
    if !path.is_file() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    dotenvy::from_path(path)?;
    debug!(path = %path.display(), "env file loaded");
    Ok(path.to_path_buf())
}

/// 필수 변수를 조회합니다.
pub fn required(lookup: VarLookup<'_>, key: &str) -> ConfigResult<String> {
    lookup(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

/// 필수 비밀 값을 조회합니다.
pub fn required_secret(lookup: VarLookup<'_>, key: &str) -> ConfigResult<SecretString> {
    required(lookup, key).map(SecretString::from)
}

/// 값을 파싱합니다 (없거나 실패 시 기본값 사용).
pub fn parse_or<T: std::str::FromStr>(lookup: VarLookup<'_>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// bool 값을 파싱합니다.
pub fn bool_or(lookup: VarLookup<'_>, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|v| {
            let v = v.trim().to_lowercase();
            v == "true" || v == "1"
        })
        .unwrap_or(default)
}

/// 거래소 API 자격증명.
///
/// `SecretString`의 `Debug` 구현이 값을 가리므로 로그에 노출되지 않습니다.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    /// API 키
    pub api_key: SecretString,
    /// API 시크릿
    pub api_secret: SecretString,
}

impl ApiCredentials {
    /// 주어진 변수 이름으로 자격증명을 읽습니다.
    pub fn from_vars(lookup: VarLookup<'_>, key_var: &str, secret_var: &str) -> ConfigResult<Self> {
        Ok(Self {
            api_key: required_secret(lookup, key_var)?,
            api_secret: required_secret(lookup, secret_var)?,
        })
    }
}
