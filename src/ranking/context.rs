//! 대화 맥락 키워드
//!
//! 세션 계층이 넘겨준 최근 대화에서 지식베이스 키워드를 추출하고,
//! 스코어링 시 해당 키워드 매칭에 가중치를 줍니다.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeBase;

/// 분석할 최근 대화 턴 수
pub const CONTEXT_WINDOW: usize = 10;
/// 반환할 최대 키워드 수
pub const MAX_CONTEXT_KEYWORDS: usize = 5;

// ============================================================================
// Types
// ============================================================================

/// 소문자로 정규화된 맥락 키워드 집합
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextKeywords(HashSet<String>);

impl ContextKeywords {
    pub fn contains(&self, keyword_lower: &str) -> bool {
        self.0.contains(keyword_lower)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

impl<S: AsRef<str>> FromIterator<S> for ContextKeywords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }
}

/// 대화 참여자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 대화 한 턴
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// 최근 대화에서 자주 등장한 지식베이스 키워드 추출
///
/// 마지막 10턴 중 사용자 턴만 분석하며, 엔트리별 키워드 등장을 모두 집계합니다.
/// 빈도 내림차순 상위 5개를 반환하고, 동률이면 먼저 등장한 키워드가 앞섭니다.
pub fn extract_context_keywords(kb: &KnowledgeBase, turns: &[ConversationTurn]) -> Vec<String> {
    let start = turns.len().saturating_sub(CONTEXT_WINDOW);
    let mut counts: Vec<(String, usize)> = Vec::new();

    for turn in turns[start..].iter().filter(|t| t.role == Role::User) {
        let content = turn.content.to_lowercase();

        for keyword in kb.iter().flat_map(|e| &e.keywords) {
            let keyword_lower = keyword.to_lowercase();
            if keyword_lower.is_empty() || !content.contains(&keyword_lower) {
                continue;
            }
            match counts.iter_mut().find(|(k, _)| *k == keyword_lower) {
                Some((_, n)) => *n += 1,
                None => counts.push((keyword_lower, 1)),
            }
        }
    }

    // 안정 정렬: 동률은 첫 등장 순서 유지
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(MAX_CONTEXT_KEYWORDS);

    tracing::debug!("Extracted {} context keywords", counts.len());
    counts.into_iter().map(|(k, _)| k).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeEntry;

    fn kb() -> KnowledgeBase {
        let entry = |id: &str, keywords: &[&str]| KnowledgeEntry {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            question: "질문".to_string(),
            answer: "답변".to_string(),
        };
        KnowledgeBase::new(vec![
            entry("a", &["출결", "QR"]),
            entry("b", &["출결", "외출"]),
            entry("c", &["줌"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_context_keywords_normalized() {
        let ctx: ContextKeywords = ["  QR ", "", "출결"].into_iter().collect();
        assert_eq!(ctx.len(), 2);
        assert!(ctx.contains("qr"));
        assert!(!ctx.contains("QR"));
    }

    #[test]
    fn test_extract_counts_user_turns_only() {
        let turns = vec![
            ConversationTurn::user("줌이 안 켜져요"),
            ConversationTurn::assistant("출결 QR 출결 QR"),
            ConversationTurn::user("qr 출결 체크는요?"),
        ];

        let keywords = extract_context_keywords(&kb(), &turns);
        // "출결"은 두 엔트리에 있어 2회, "qr"/"줌"은 1회
        assert_eq!(keywords, vec!["출결", "줌", "qr"]);
    }

    #[test]
    fn test_extract_window_and_limit() {
        let mut turns = vec![ConversationTurn::user("줌 줌 줌")];
        turns.extend((0..CONTEXT_WINDOW).map(|_| ConversationTurn::user("외출")));

        let keywords = extract_context_keywords(&kb(), &turns);
        // 가장 오래된 턴은 윈도우 밖
        assert_eq!(keywords, vec!["외출"]);
    }

    #[test]
    fn test_extract_empty() {
        assert!(extract_context_keywords(&kb(), &[]).is_empty());
        assert!(extract_context_keywords(&KnowledgeBase::empty(), &[ConversationTurn::user("출결")]).is_empty());
    }
}
