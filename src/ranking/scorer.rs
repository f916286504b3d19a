//! 관련도 스코어러
//!
//! 하나의 스코어 함수를 가중치 테이블(`ScoringProfile`)로 설정합니다.
//! - `smart`: 관련 질문/검색용 (의도·주제 일치 + 키워드 + 질문 유사도 + 답변 품질)
//! - `simple`: 단일 최적 답변용 (키워드 + 질문/답변 유사도)
//!
//! 모든 항목은 가산되며 상한이 없습니다. 어떤 입력에도 실패하지 않습니다.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::intent::{IntentClassifier, IntentResult};
use crate::knowledge::KnowledgeEntry;

use super::context::ContextKeywords;
use super::similarity::similarity_ratio;

// ============================================================================
// Scoring Profile
// ============================================================================

/// 의도/주제 일치 가중치
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentWeights {
    /// 의도와 주제 모두 일치
    pub both: f64,
    /// 의도만 일치
    pub intent_only: f64,
    /// 주제만 일치
    pub topic_only: f64,
}

/// 유사도 규칙: ratio > threshold 이면 ratio * weight 가산
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRule {
    pub threshold: f64,
    pub weight: f64,
}

/// 답변 품질 규칙
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerQualityRule {
    /// 이 글자 수당 1점
    pub chars_per_point: f64,
    /// 길이 점수 상한
    pub cap: f64,
    /// 구체성 표현 포함 시 추가 점수
    pub specificity_bonus: f64,
    pub specificity_phrases: Vec<String>,
}

/// 스코어링 가중치 테이블
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    /// None이면 의도/주제 비교 생략
    pub intent: Option<IntentWeights>,
    /// 정확한 키워드 매칭 (쿼리에 키워드가 부분 문자열로 포함)
    pub exact_keyword: f64,
    /// 부분 키워드 매칭 (토큰 ↔ 키워드 상호 포함)
    pub partial_keyword: f64,
    /// 부분 매칭 대상 키워드/토큰 최소 글자 수
    pub min_partial_chars: usize,
    pub question_similarity: Option<SimilarityRule>,
    pub answer_similarity: Option<SimilarityRule>,
    pub answer_quality: Option<AnswerQualityRule>,
    /// 대화 맥락 키워드 가중 배수
    pub context_boost: f64,
}

impl ScoringProfile {
    /// 관련 질문/검색용
    pub fn smart() -> Self {
        Self {
            intent: Some(IntentWeights {
                both: 10.0,
                intent_only: 6.0,
                topic_only: 4.0,
            }),
            exact_keyword: 3.0,
            partial_keyword: 1.0,
            min_partial_chars: 2,
            question_similarity: Some(SimilarityRule {
                threshold: 0.4,
                weight: 3.0,
            }),
            answer_similarity: None,
            answer_quality: Some(AnswerQualityRule {
                chars_per_point: 100.0,
                cap: 2.0,
                specificity_bonus: 0.5,
                specificity_phrases: ["예를 들어", "다만", "단,", "참고", "자세한"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
            context_boost: 1.5,
        }
    }

    /// 단일 최적 답변용
    pub fn simple() -> Self {
        Self {
            intent: None,
            exact_keyword: 5.0,
            partial_keyword: 2.0,
            min_partial_chars: 2,
            question_similarity: Some(SimilarityRule {
                threshold: 0.3,
                weight: 1.0,
            }),
            answer_similarity: Some(SimilarityRule {
                threshold: 0.4,
                weight: 0.5,
            }),
            answer_quality: None,
            context_boost: 1.5,
        }
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self::smart()
    }
}

// ============================================================================
// Types
// ============================================================================

/// 적용된 스코어 규칙 태그
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceFactor {
    IntentTopicMatch,
    IntentMatch,
    TopicMatch,
    ExactKeyword,
    PartialKeyword,
    QuestionSimilarity,
    AnswerSimilarity,
}

impl RelevanceFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IntentTopicMatch => "intent_topic_match",
            Self::IntentMatch => "intent_match",
            Self::TopicMatch => "topic_match",
            Self::ExactKeyword => "exact_keyword",
            Self::PartialKeyword => "partial_keyword",
            Self::QuestionSimilarity => "question_similarity",
            Self::AnswerSimilarity => "answer_similarity",
        }
    }
}

impl std::fmt::Display for RelevanceFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 엔트리별 스코어 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub entry_id: String,
    /// 0 이상, 상한 없음
    pub score: f64,
    /// 매칭된 키워드 (첫 등장 순, 중복 없음)
    pub matched_keywords: Vec<String>,
    /// 적용된 규칙 (첫 적용 순, 중복 없음)
    pub relevance_factors: Vec<RelevanceFactor>,
}

impl ScoredMatch {
    fn new(entry_id: &str) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            score: 0.0,
            matched_keywords: Vec::new(),
            relevance_factors: Vec::new(),
        }
    }

    pub fn has_factor(&self, factor: RelevanceFactor) -> bool {
        self.relevance_factors.contains(&factor)
    }

    /// 매칭 유형 라벨 ("exact/partial/similarity", 없으면 "none")
    pub fn match_type(&self) -> String {
        let mut kinds: Vec<&str> = Vec::new();
        for factor in &self.relevance_factors {
            let kind = match factor {
                RelevanceFactor::ExactKeyword => "exact",
                RelevanceFactor::PartialKeyword => "partial",
                RelevanceFactor::QuestionSimilarity | RelevanceFactor::AnswerSimilarity => {
                    "similarity"
                }
                _ => continue,
            };
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        if kinds.is_empty() {
            "none".to_string()
        } else {
            kinds.join("/")
        }
    }

    fn add(&mut self, points: f64, factor: RelevanceFactor) {
        self.score += points;
        if !self.relevance_factors.contains(&factor) {
            self.relevance_factors.push(factor);
        }
    }
}

// ============================================================================
// Scorer
// ============================================================================

/// 쿼리 ↔ 엔트리 스코어러
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    profile: &'a ScoringProfile,
    classifier: &'a IntentClassifier,
}

impl<'a> Scorer<'a> {
    pub fn new(profile: &'a ScoringProfile, classifier: &'a IntentClassifier) -> Self {
        Self { profile, classifier }
    }

    pub fn profile(&self) -> &ScoringProfile {
        self.profile
    }

    /// 쿼리와 엔트리의 관련도 계산
    ///
    /// `query_intent`는 호출자가 쿼리당 한 번 분류한 결과를 재사용합니다.
    pub fn score(
        &self,
        query: &str,
        entry: &KnowledgeEntry,
        query_intent: &IntentResult,
        context: &ContextKeywords,
    ) -> ScoredMatch {
        let profile = self.profile;
        let query_lower = query.trim().to_lowercase();
        let mut result = ScoredMatch::new(&entry.id);

        // 1. 의도/주제 일치
        if let Some(weights) = &profile.intent {
            let entry_intent = self.classifier.classify(&entry.question);
            let same_intent = entry_intent.intent == query_intent.intent;
            let same_topic = entry_intent.topic == query_intent.topic;

            match (same_intent, same_topic) {
                (true, true) => result.add(weights.both, RelevanceFactor::IntentTopicMatch),
                (true, false) => result.add(weights.intent_only, RelevanceFactor::IntentMatch),
                (false, true) => result.add(weights.topic_only, RelevanceFactor::TopicMatch),
                (false, false) => {}
            }
        }

        // 2. 정확한 키워드 매칭
        for keyword in &entry.keywords {
            if result.matched_keywords.contains(keyword) {
                continue;
            }
            let keyword_lower = keyword.to_lowercase();
            if keyword_lower.is_empty() || !query_lower.contains(&keyword_lower) {
                continue;
            }

            let points = profile.exact_keyword * self.boost(context, &keyword_lower);
            result.add(points, RelevanceFactor::ExactKeyword);
            result.matched_keywords.push(keyword.clone());
        }

        // 3. 부분 키워드 매칭
        let tokens = tokenize(&query_lower, profile.min_partial_chars);
        for keyword in &entry.keywords {
            if result.matched_keywords.contains(keyword) {
                continue;
            }
            let keyword_lower = keyword.to_lowercase();
            if keyword_lower.chars().count() < profile.min_partial_chars {
                continue;
            }

            let hit = tokens
                .iter()
                .any(|t| t.contains(keyword_lower.as_str()) || keyword_lower.contains(t.as_str()));
            if hit {
                let points = profile.partial_keyword * self.boost(context, &keyword_lower);
                result.add(points, RelevanceFactor::PartialKeyword);
                result.matched_keywords.push(keyword.clone());
            }
        }

        // 4. 질문 유사도
        if let Some(rule) = &profile.question_similarity {
            let ratio = similarity_ratio(&query_lower, &entry.question.to_lowercase());
            if ratio > rule.threshold {
                result.add(ratio * rule.weight, RelevanceFactor::QuestionSimilarity);
            }
        }

        let answer_lower = entry.answer.to_lowercase();

        // 5. 답변 유사도
        if let Some(rule) = &profile.answer_similarity {
            let ratio = similarity_ratio(&query_lower, &answer_lower);
            if ratio > rule.threshold {
                result.add(ratio * rule.weight, RelevanceFactor::AnswerSimilarity);
            }
        }

        // 6. 답변 품질 (태그 없음)
        if let Some(rule) = &profile.answer_quality {
            let chars = entry.answer.chars().count() as f64;
            let mut quality = if rule.chars_per_point > 0.0 {
                (chars / rule.chars_per_point).min(rule.cap)
            } else {
                0.0
            };
            if rule
                .specificity_phrases
                .iter()
                .any(|p| answer_lower.contains(&p.to_lowercase()))
            {
                quality += rule.specificity_bonus;
            }
            result.score += quality;
        }

        result
    }

    fn boost(&self, context: &ContextKeywords, keyword_lower: &str) -> f64 {
        if context.contains(keyword_lower) {
            self.profile.context_boost
        } else {
            1.0
        }
    }
}

/// 쿼리 토큰화: `? ! .` 제거 후 공백 분리, 최소 글자 수 미만 제외
fn tokenize(query_lower: &str, min_chars: usize) -> Vec<String> {
    static PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?!.]").expect("Valid punctuation regex"));

    PUNCT
        .replace_all(query_lower, "")
        .split_whitespace()
        .filter(|w| w.chars().count() >= min_chars)
        .map(|w| w.to_string())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::default_classifier;

    fn entry(id: &str, keywords: &[&str], question: &str, answer: &str) -> KnowledgeEntry {
        KnowledgeEntry {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    fn score_with(profile: &ScoringProfile, query: &str, e: &KnowledgeEntry, ctx: &ContextKeywords) -> ScoredMatch {
        let classifier = default_classifier();
        let intent = classifier.classify(query);
        Scorer::new(profile, classifier).score(query, e, &intent, ctx)
    }

    #[test]
    fn test_stipend_scenario() {
        let e = entry(
            "stipend",
            &["훈련장려금", "얼마"],
            "훈련장려금은 얼마인가요?",
            "월 최대 316,000원입니다.",
        );
        let result = score_with(&ScoringProfile::smart(), "훈련장려금 얼마예요?", &e, &ContextKeywords::default());

        assert_eq!(result.matched_keywords, vec!["훈련장려금", "얼마"]);
        assert!(result.has_factor(RelevanceFactor::IntentTopicMatch));
        assert!(result.has_factor(RelevanceFactor::ExactKeyword));
        assert!(result.has_factor(RelevanceFactor::QuestionSimilarity));
        assert!(!result.has_factor(RelevanceFactor::PartialKeyword));

        // 10 + 3 + 3 + (20/24)*3 + 답변 길이/100
        let expected = 10.0 + 6.0 + 2.5 + e.answer.chars().count() as f64 / 100.0;
        assert!((result.score - expected).abs() < 1e-9, "score = {}", result.score);
    }

    #[test]
    fn test_partial_keyword_both_directions() {
        let e = entry("zoom", &["배경화면", "줌설정법"], "질문", "답변");
        // "배경화면"은 정확 매칭, 토큰 "줌설정" ⊂ "줌설정법"은 부분 매칭
        let result = score_with(&ScoringProfile::simple(), "배경화면을 줌설정 해요", &e, &ContextKeywords::default());

        assert!(result.has_factor(RelevanceFactor::ExactKeyword));
        assert!(result.has_factor(RelevanceFactor::PartialKeyword));
        assert_eq!(result.matched_keywords, vec!["배경화면", "줌설정법"]);
        assert_eq!(result.match_type(), "exact/partial");
    }

    #[test]
    fn test_no_double_count() {
        let e = entry("a", &["출결", "출결"], "질문", "답변");
        let result = score_with(&ScoringProfile::simple(), "출결", &e, &ContextKeywords::default());
        assert_eq!(result.matched_keywords, vec!["출결"]);
        assert!((result.score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_keyword_skips_partial() {
        let e = entry("a", &["줌"], "질문", "답변");
        // "줌" 1글자: 정확 매칭은 되지만 부분 매칭 대상은 아님
        let exact = score_with(&ScoringProfile::simple(), "줌 켜기", &e, &ContextKeywords::default());
        assert!(exact.has_factor(RelevanceFactor::ExactKeyword));

        let none = score_with(&ScoringProfile::simple(), "카메라", &e, &ContextKeywords::default());
        assert!(none.matched_keywords.is_empty());
    }

    #[test]
    fn test_context_boost() {
        let e = entry("a", &["출결"], "질문", "답변");
        let ctx: ContextKeywords = ["출결"].into_iter().collect();

        let boosted = score_with(&ScoringProfile::simple(), "출결 문의", &e, &ctx);
        let plain = score_with(&ScoringProfile::simple(), "출결 문의", &e, &ContextKeywords::default());
        assert!((boosted.score - 7.5).abs() < 1e-9);
        assert!((plain.score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_answer_quality() {
        let long_answer = "가".repeat(250);
        let e = entry("a", &["없음없음"], "전혀 다른 내용", &long_answer);
        let result = score_with(&ScoringProfile::smart(), "zzz", &e, &ContextKeywords::default());
        // 길이 점수 상한 2.0, 의도(general_inquiry)와 주제(other) 모두 일치 +10
        assert!((result.score - 12.0).abs() < 1e-9, "score = {}", result.score);

        let e = entry("b", &["없음없음"], "전혀 다른 내용", "다만 주의하세요");
        let result = score_with(&ScoringProfile::smart(), "zzz", &e, &ContextKeywords::default());
        assert!((result.score - (10.0 + 0.08 + 0.5)).abs() < 1e-9, "score = {}", result.score);
    }

    #[test]
    fn test_simple_profile_ignores_intent() {
        let e = entry("a", &["없음없음"], "전혀 다른 내용", "답변");
        let result = score_with(&ScoringProfile::simple(), "zzz", &e, &ContextKeywords::default());
        assert_eq!(result.score, 0.0);
        assert!(result.relevance_factors.is_empty());
        assert_eq!(result.match_type(), "none");
    }

    #[test]
    fn test_empty_query_never_fails() {
        let e = entry("a", &["출결"], "출결 질문", "답변");
        let result = score_with(&ScoringProfile::simple(), "", &e, &ContextKeywords::default());
        assert!(result.score >= 0.0);
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("줌 설정은요? 어떻게! a.", 2), vec!["설정은요", "어떻게"]);
        assert!(tokenize("", 2).is_empty());
    }

    #[test]
    fn test_relevance_factor_serde() {
        let json = serde_json::to_string(&RelevanceFactor::IntentTopicMatch).unwrap();
        assert_eq!(json, "\"intent_topic_match\"");
        assert_eq!(RelevanceFactor::PartialKeyword.to_string(), "partial_keyword");
    }
}
