//! 설정/데이터 로드 에러
//!
//! 지식베이스와 분류 규칙은 시작 시 한 번만 로드되며,
//! 하나라도 잘못된 항목이 있으면 전체 로드가 실패합니다.

use std::path::PathBuf;

use thiserror::Error;

/// 로드 단계 에러
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("entry #{index}: missing or blank field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("entry `{id}`: keyword list is empty")]
    EmptyKeywords { id: String },

    #[error("entry `{id}`: keyword #{position} is blank")]
    BlankKeyword { id: String, position: usize },

    #[error("duplicate entry id `{0}`")]
    DuplicateId(String),

    #[error("invalid intent rule: {0}")]
    InvalidRule(String),
}
