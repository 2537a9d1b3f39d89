//! 도메인 타입 정의.

pub mod snapshot;
pub mod symbol;

pub use snapshot::*;
pub use symbol::*;
