//! Chat 모듈 - 질문 하나에 대한 응답 결정
//!
//! HTTP/세션 계층이 호출하는 순수 파이프라인입니다.
//!
//! ```text
//! 질문 → 분류 → 타사 질문?      → OffTopic (일반 대화보다 우선)
//!             → 일반 대화?      → Greeting(kind)
//!             → 관련 질문 랭킹  → 신뢰도 단계별 Answer / NoMatch
//! ```

use serde::Serialize;

use crate::config::{ChatSettings, ConfidenceTier};
use crate::knowledge::KnowledgeEntry;
use crate::ranking::{BestMatch, ConversationTurn, FaqRanker, ScoredMatch};

const HELLO_WORDS: &[&str] = &["hi", "hello", "안녕", "하이", "헬로"];
const THANKS_WORDS: &[&str] = &["감사", "고마워", "고맙"];
const SMALL_TALK_WORDS: &[&str] = &["잘지내", "어떻게", "뭐해"];

// ============================================================================
// Types
// ============================================================================

/// 일반 대화 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GreetingKind {
    Hello,
    Thanks,
    SmallTalk,
    Other,
}

/// 답변 신뢰도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    High,
    Partial,
    Low,
}

/// 관련 질문 (미리보기 포함)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedQuestion {
    pub id: String,
    pub question: String,
    pub answer_preview: String,
    pub score: f64,
    pub matched_keywords: Vec<String>,
}

/// 응답 결정
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply<'a> {
    /// 타사 관련 질문
    OffTopic,
    /// 인사/잡담
    Greeting { greeting: GreetingKind },
    /// 지식베이스 답변
    Answer {
        confidence: MatchConfidence,
        entry: &'a KnowledgeEntry,
        score: f64,
        matched_keywords: Vec<String>,
        related: Vec<RelatedQuestion>,
    },
    /// 매칭 실패 (단순 매칭 후보가 있으면 함께 전달)
    NoMatch { suggestion: Option<BestMatch<'a>> },
}

impl Reply<'_> {
    /// 상태 라벨
    pub fn status(&self) -> &'static str {
        match self {
            Reply::OffTopic => "off_topic",
            Reply::Greeting { .. } => "greeting",
            Reply::Answer { confidence: MatchConfidence::High, .. } => "success",
            Reply::Answer { confidence: MatchConfidence::Partial, .. } => "partial_match",
            Reply::Answer { confidence: MatchConfidence::Low, .. } => "low_confidence",
            Reply::NoMatch { .. } => "no_match",
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// 질문 하나에 대한 응답 결정
///
/// `history`는 이전 대화 턴이며, 맥락 키워드 가중에 사용됩니다.
pub fn respond<'a>(
    ranker: &'a FaqRanker,
    settings: &ChatSettings,
    query: &str,
    history: &[ConversationTurn],
) -> Reply<'a> {
    let intent = ranker.classify_intent(query);

    if intent.is_off_topic {
        tracing::info!("Off-topic question detected");
        return Reply::OffTopic;
    }
    if intent.is_general_conversation {
        let greeting = greeting_kind(query);
        tracing::info!("General conversation detected ({:?})", greeting);
        return Reply::Greeting { greeting };
    }

    let context = ranker.context_keywords(history);
    if !context.is_empty() {
        tracing::debug!("Context keywords: {:?}", context.iter().collect::<Vec<_>>());
    }

    let related = ranker.find_related_questions(
        query,
        settings.related_limit,
        settings.related_min_score,
        &context,
    );

    let Some(top) = related.first() else {
        return no_match(ranker, query);
    };

    let tiers = [
        (MatchConfidence::High, &settings.confident),
        (MatchConfidence::Partial, &settings.partial),
        (MatchConfidence::Low, &settings.low),
    ];
    let Some((confidence, tier)) = tiers.into_iter().find(|(_, t)| top.score > t.min_score) else {
        return no_match(ranker, query);
    };
    let Some(entry) = ranker.entry(&top.entry_id) else {
        return no_match(ranker, query);
    };

    let related = collect_related(ranker, &related[1..], &top.entry_id, tier, settings);
    tracing::info!(
        "Answered with {} (score={:.2}, confidence={:?}, related={})",
        entry.id,
        top.score,
        confidence,
        related.len()
    );

    Reply::Answer {
        confidence,
        entry,
        score: top.score,
        matched_keywords: top.matched_keywords.clone(),
        related,
    }
}

fn no_match<'a>(ranker: &'a FaqRanker, query: &str) -> Reply<'a> {
    let suggestion = ranker.find_best_match(query);
    tracing::info!("No confident match (suggestion: {:?})", suggestion.as_ref().map(|b| &b.entry.id));
    Reply::NoMatch { suggestion }
}

fn collect_related(
    ranker: &FaqRanker,
    rest: &[ScoredMatch],
    answered_id: &str,
    tier: &ConfidenceTier,
    settings: &ChatSettings,
) -> Vec<RelatedQuestion> {
    rest.iter()
        .filter(|m| m.entry_id != answered_id && m.score > tier.related_min)
        .filter_map(|m| {
            let entry = ranker.entry(&m.entry_id)?;
            Some(RelatedQuestion {
                id: entry.id.clone(),
                question: entry.question.clone(),
                answer_preview: answer_preview(&entry.answer, settings.preview_chars),
                score: m.score,
                matched_keywords: m.matched_keywords.clone(),
            })
        })
        .take(settings.max_related)
        .collect()
}

/// 일반 대화 유형 판별
pub fn greeting_kind(text: &str) -> GreetingKind {
    let lower = text.trim().to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(*w));

    if has(HELLO_WORDS) {
        GreetingKind::Hello
    } else if has(THANKS_WORDS) {
        GreetingKind::Thanks
    } else if has(SMALL_TALK_WORDS) {
        GreetingKind::SmallTalk
    } else {
        GreetingKind::Other
    }
}

/// 답변 미리보기 (글자 단위 절단 + "...")
pub fn answer_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
