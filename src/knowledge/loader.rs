//! 지식베이스 로더
//!
//! 소스 형식은 엔트리 객체의 JSON 배열입니다:
//!
//! ```json
//! [{ "id": "줌", "keywords": ["줌", "zoom"], "question": "...", "answer": "..." }]
//! ```
//!
//! 필수 필드가 하나라도 빠지면 부분 로드 없이 전체가 실패합니다.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

use super::entry::{KnowledgeBase, KnowledgeEntry};

/// 내장 기본 지식베이스 (data/knowledge_base.json)
pub const DEFAULT_KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.json");

// ============================================================================
// Types
// ============================================================================

/// 지식베이스 소스
#[derive(Debug, Clone)]
pub enum KnowledgeSource {
    /// 바이너리에 내장된 기본 데이터
    Embedded,
    /// JSON 문자열
    Json(String),
    /// JSON 파일 경로
    File(PathBuf),
    /// 이미 구성된 엔트리 목록
    Entries(Vec<KnowledgeEntry>),
}

/// 검증 전 원본 레코드
#[derive(Debug, Deserialize)]
struct RawEntry {
    id: Option<String>,
    keywords: Option<Vec<String>>,
    question: Option<String>,
    answer: Option<String>,
}

// ============================================================================
// Loading
// ============================================================================

/// 지식베이스 로드 (프로세스 시작 시 1회)
pub fn load_knowledge_base(source: KnowledgeSource) -> Result<KnowledgeBase, ConfigError> {
    let kb = match source {
        KnowledgeSource::Embedded => parse_entries(DEFAULT_KNOWLEDGE_BASE)?,
        KnowledgeSource::Json(json) => parse_entries(&json)?,
        KnowledgeSource::File(path) => return load_knowledge_base_file(&path),
        KnowledgeSource::Entries(entries) => KnowledgeBase::new(entries)?,
    };

    log_loaded(&kb, None);
    Ok(kb)
}

/// JSON 파일에서 로드
pub fn load_knowledge_base_file(path: &Path) -> Result<KnowledgeBase, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let kb = parse_entries(&json)?;
    log_loaded(&kb, Some(path));
    Ok(kb)
}

fn parse_entries(json: &str) -> Result<KnowledgeBase, ConfigError> {
    let raw: Vec<RawEntry> = serde_json::from_str(json)?;

    let entries = raw
        .into_iter()
        .enumerate()
        .map(|(index, r)| validate_entry(index, r))
        .collect::<Result<Vec<_>, _>>()?;

    KnowledgeBase::new(entries)
}

fn validate_entry(index: usize, raw: RawEntry) -> Result<KnowledgeEntry, ConfigError> {
    let required = |value: Option<String>, field: &'static str| {
        value
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingField { index, field })
    };

    let id = required(raw.id, "id")?;
    let question = required(raw.question, "question")?;
    let answer = required(raw.answer, "answer")?;
    let keywords = raw
        .keywords
        .ok_or(ConfigError::MissingField { index, field: "keywords" })?;

    Ok(KnowledgeEntry {
        id,
        keywords,
        question,
        answer,
    })
}

fn log_loaded(kb: &KnowledgeBase, path: Option<&Path>) {
    if kb.is_empty() {
        tracing::warn!("Knowledge base is empty; every ranking will return no results");
    }
    match path {
        Some(p) => tracing::info!("Loaded knowledge base from {:?} ({} entries)", p, kb.len()),
        None => tracing::info!("Loaded knowledge base ({} entries)", kb.len()),
    }
}

// ============================================================================
// Tests
// ============================================================================
