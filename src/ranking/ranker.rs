//! 랭커 - 스코어 정렬/필터/절단 및 공개 API
//!
//! 정렬은 점수 내림차순 안정 정렬이며, 동점이면 지식베이스 로드 순서를 따릅니다.
//! 같은 입력에는 항상 같은 결과를 반환합니다.

use serde::Serialize;

use crate::intent::{IntentClassifier, IntentResult};
use crate::knowledge::{KnowledgeBase, KnowledgeEntry};

use super::context::{extract_context_keywords, ContextKeywords, ConversationTurn};
use super::scorer::{ScoredMatch, Scorer, ScoringProfile};

// ============================================================================
// Types
// ============================================================================

/// 단일 최적 답변
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestMatch<'a> {
    pub entry: &'a KnowledgeEntry,
    pub score: f64,
    pub matched_keywords: Vec<String>,
}

/// 검색 결과 (절단 전 총 개수 포함)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    /// min_score 이상인 전체 엔트리 수
    pub total_found: usize,
    pub min_score: f64,
    pub results: Vec<ScoredMatch>,
}

// ============================================================================
// Ranking
// ============================================================================

/// 쿼리로 지식베이스 전체를 스코어링 후 정렬/필터/절단
///
/// 쿼리 분류는 한 번만 수행하여 모든 엔트리에 재사용합니다.
pub fn rank(
    query: &str,
    kb: &KnowledgeBase,
    scorer: &Scorer<'_>,
    query_intent: &IntentResult,
    limit: usize,
    min_score: f64,
    context: &ContextKeywords,
) -> Vec<ScoredMatch> {
    let mut matches = score_filtered(query, kb, scorer, query_intent, min_score, context);
    matches.truncate(limit);
    matches
}

/// min_score 이상 엔트리 전체 (정렬됨, 절단 전)
fn score_filtered(
    query: &str,
    kb: &KnowledgeBase,
    scorer: &Scorer<'_>,
    query_intent: &IntentResult,
    min_score: f64,
    context: &ContextKeywords,
) -> Vec<ScoredMatch> {
    let mut matches: Vec<ScoredMatch> = kb
        .iter()
        .map(|entry| scorer.score(query, entry, query_intent, context))
        .filter(|m| m.score >= min_score)
        .collect();

    // sort_by는 안정 정렬
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

// ============================================================================
// FaqRanker
// ============================================================================

/// FAQ 랭킹 엔진
///
/// 지식베이스, 분류기, 두 가지 스코어링 프로파일을 주입받아 보관합니다.
/// 내부 상태는 읽기 전용이므로 여러 스레드에서 공유해도 안전합니다.
#[derive(Debug, Clone)]
pub struct FaqRanker {
    kb: KnowledgeBase,
    classifier: IntentClassifier,
    smart: ScoringProfile,
    simple: ScoringProfile,
}

impl FaqRanker {
    /// 기본 프로파일(smart/simple)로 생성
    pub fn new(kb: KnowledgeBase, classifier: IntentClassifier) -> Self {
        Self {
            kb,
            classifier,
            smart: ScoringProfile::smart(),
            simple: ScoringProfile::simple(),
        }
    }

    /// 프로파일 교체
    pub fn with_profiles(mut self, smart: ScoringProfile, simple: ScoringProfile) -> Self {
        self.smart = smart;
        self.simple = simple;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// 의도/주제 분류
    pub fn classify_intent(&self, text: &str) -> IntentResult {
        let result = self.classifier.classify(text);
        tracing::debug!(
            "Classified intent={} topic={} confidence={:.2}",
            result.intent,
            result.topic,
            result.confidence
        );
        result
    }

    /// 단일 최적 답변 (simple 프로파일)
    ///
    /// 점수가 가장 높은 첫 엔트리를 반환합니다. 모든 점수가 0이면 None.
    pub fn find_best_match(&self, query: &str) -> Option<BestMatch<'_>> {
        let scorer = Scorer::new(&self.simple, &self.classifier);
        // 의도 가중치가 없는 프로파일은 분류 결과를 읽지 않음
        let intent = match self.simple.intent {
            Some(_) => self.classifier.classify(query),
            None => IntentResult::default(),
        };
        let context = ContextKeywords::default();

        let mut best: Option<BestMatch<'_>> = None;
        for entry in &self.kb {
            let scored = scorer.score(query, entry, &intent, &context);
            let current = best.as_ref().map_or(0.0, |b| b.score);
            if scored.score > current {
                best = Some(BestMatch {
                    entry,
                    score: scored.score,
                    matched_keywords: scored.matched_keywords,
                });
            }
        }

        match &best {
            Some(b) => tracing::debug!("Best match: {} (score={:.2})", b.entry.id, b.score),
            None => tracing::debug!("No best match for query"),
        }
        best
    }

    /// 관련 질문 목록 (smart 프로파일)
    pub fn find_related_questions(
        &self,
        query: &str,
        limit: usize,
        min_score: f64,
        context: &ContextKeywords,
    ) -> Vec<ScoredMatch> {
        let scorer = Scorer::new(&self.smart, &self.classifier);
        let intent = self.classify_intent(query);
        let results = rank(query, &self.kb, &scorer, &intent, limit, min_score, context);

        tracing::debug!(
            "Ranked {} related questions (limit={}, min_score={}, context={})",
            results.len(),
            limit,
            min_score,
            context.len()
        );
        results
    }

    /// 검색 (smart 프로파일, 맥락 없음)
    pub fn search(&self, query: &str, limit: usize, min_score: f64) -> SearchOutcome {
        let scorer = Scorer::new(&self.smart, &self.classifier);
        let intent = self.classify_intent(query);
        let context = ContextKeywords::default();

        let mut results = score_filtered(query, &self.kb, &scorer, &intent, min_score, &context);
        let total_found = results.len();
        results.truncate(limit);

        SearchOutcome {
            query: query.to_string(),
            total_found,
            min_score,
            results,
        }
    }

    /// 최근 대화에서 맥락 키워드 추출
    pub fn context_keywords(&self, turns: &[ConversationTurn]) -> ContextKeywords {
        extract_context_keywords(&self.kb, turns).into_iter().collect()
    }

    /// ID로 엔트리 조회
    pub fn entry(&self, id: &str) -> Option<&KnowledgeEntry> {
        self.kb.get(id)
    }
}

// ============================================================================
// Tests
// ============================================================================
