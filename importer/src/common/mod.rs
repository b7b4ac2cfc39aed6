//! 共通定義
//!
//! クレート全体で共有するエラー型

pub mod error;

pub use error::{ImportError, ImportResult};
