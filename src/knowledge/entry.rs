//! 지식베이스 엔트리와 컬렉션
//!
//! 로드 이후에는 어떤 엔트리도 추가/수정/삭제되지 않습니다.
//! 순회 순서는 항상 로드 순서(삽입 순서)이며 랭킹의 동점 처리 기준이 됩니다.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ConfigError;

// ============================================================================
// Types
// ============================================================================

/// FAQ 엔트리 (불변)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeEntry {
    /// 고유 ID
    pub id: String,
    /// 검색 앵커 키워드 (비어있지 않음)
    pub keywords: Vec<String>,
    /// 대표 질문
    pub question: String,
    /// 답변 본문
    pub answer: String,
}

/// 읽기 전용 지식베이스
///
/// 전역 상태 대신 값으로 전달되므로 서로 다른 지식베이스를
/// 병렬로 사용할 수 있습니다.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    index: HashMap<String, usize>,
}

// ============================================================================
// KnowledgeBase
// ============================================================================

impl KnowledgeBase {
    /// 검증된 엔트리 목록으로 생성
    ///
    /// ID 중복, 빈 키워드 목록, 공백 키워드, 빈 질문/답변이 있으면 실패합니다.
    pub fn new(entries: Vec<KnowledgeEntry>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(ConfigError::MissingField { index: i, field: "id" });
            }
            if entry.question.trim().is_empty() {
                return Err(ConfigError::MissingField { index: i, field: "question" });
            }
            if entry.answer.trim().is_empty() {
                return Err(ConfigError::MissingField { index: i, field: "answer" });
            }
            if entry.keywords.is_empty() {
                return Err(ConfigError::EmptyKeywords { id: entry.id.clone() });
            }
            // 키워드는 하나하나 비어 있지 않아야 함
            if let Some(position) = entry.keywords.iter().position(|k| k.trim().is_empty()) {
                return Err(ConfigError::BlankKeyword { id: entry.id.clone(), position });
            }
            if index.insert(entry.id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateId(entry.id.clone()));
            }
        }

        Ok(Self { entries, index })
    }

    /// 빈 지식베이스
    pub fn empty() -> Self {
        Self::default()
    }

    /// 엔트리 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ID로 조회
    pub fn get(&self, id: &str) -> Option<&KnowledgeEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// 로드 순서대로 순회
    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeEntry> {
        self.entries.iter()
    }

    /// 전체 엔트리 슬라이스
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// 키워드 필터 (FAQ 목록 조회용)
    ///
    /// 필터가 키워드 중 하나의 부분 문자열이면 포함합니다 (대소문자 무시).
    /// 필터가 없거나 공백이면 전체를 반환합니다.
    pub fn filter_by_keyword(&self, keyword: Option<&str>) -> Vec<&KnowledgeEntry> {
        let filter = keyword
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());

        match filter {
            None => self.entries.iter().collect(),
            Some(needle) => self
                .entries
                .iter()
                .filter(|e| e.keywords.iter().any(|kw| kw.to_lowercase().contains(&needle)))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a KnowledgeEntry;
    type IntoIter = std::slice::Iter<'a, KnowledgeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
