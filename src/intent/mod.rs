//! Intent 모듈 - 규칙 기반 의도/주제 분류기
//!
//! 텍스트를 소문자화/트림한 뒤 고정된 키워드 테이블과 부분 문자열 매칭으로
//! 의도(intent)와 주제(topic)를 판정합니다. 순수 함수이며 어떤 입력에도
//! 실패하지 않습니다.
//!
//! 판정 우선순위:
//! 1. 일반 대화 (인사/잡담/프로그래밍/일반 도움) → `general_conversation`, 신뢰도 0
//! 2. 타사 질문 (타사 키워드 O, 자사 키워드 X) → `off_topic`, 신뢰도 1
//! 3. 의도 테이블 첫 매칭 (+0.2/매칭), 주제 테이블 첫 매칭 (+0.3/매칭)

mod rules;

use once_cell::sync::Lazy;
use serde::Serialize;

pub use rules::{DEFAULT_INTENT_RULES, GeneralConversationRules, IntentRules, LabeledKeywords};

/// 기본 의도 라벨
pub const DEFAULT_INTENT: &str = "general_inquiry";
/// 기본 주제 라벨
pub const DEFAULT_TOPIC: &str = "other";
/// 일반 대화 주제 라벨
pub const TOPIC_GENERAL_CONVERSATION: &str = "general_conversation";
/// 타사 질문 주제 라벨
pub const TOPIC_OFF_TOPIC: &str = "off_topic";

const INTENT_WEIGHT: f64 = 0.2;
const TOPIC_WEIGHT: f64 = 0.3;

// ============================================================================
// Types
// ============================================================================

/// 분류 결과 (호출마다 새로 생성)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentResult {
    pub intent: String,
    pub topic: String,
    /// 0.0 ~ 1.0
    pub confidence: f64,
    pub is_general_conversation: bool,
    pub is_off_topic: bool,
    /// 원본 입력 길이 (문자 수)
    pub input_length: usize,
    /// 의문사 토큰 수
    pub question_words: usize,
}

impl IntentResult {
    fn new(input_length: usize, question_words: usize) -> Self {
        Self {
            intent: DEFAULT_INTENT.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            confidence: 0.0,
            is_general_conversation: false,
            is_off_topic: false,
            input_length,
            question_words,
        }
    }
}

/// 분류하지 않은 기본 결과 (`general_inquiry` / `other`)
impl Default for IntentResult {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

// ============================================================================
// IntentClassifier
// ============================================================================

/// 규칙 기반 분류기
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: IntentRules,
}

impl IntentClassifier {
    /// 규칙으로 생성
    pub fn new(rules: IntentRules) -> Self {
        Self { rules }
    }

    /// 내장 규칙 사용
    pub fn with_defaults() -> Self {
        default_classifier().clone()
    }

    pub fn rules(&self) -> &IntentRules {
        &self.rules
    }

    /// 텍스트 분류
    pub fn classify(&self, text: &str) -> IntentResult {
        let normalized = text.trim().to_lowercase();
        let question_words = normalized
            .split_whitespace()
            .filter(|w| self.rules.question_words.iter().any(|q| q == w))
            .count();

        let mut result = IntentResult::new(text.chars().count(), question_words);

        result.is_general_conversation = contains_any(&normalized, self.rules.general_conversation.all());
        result.is_off_topic = contains_any(&normalized, &self.rules.competitor_keywords)
            && !contains_any(&normalized, &self.rules.own_organization_keywords);

        if result.is_general_conversation {
            result.topic = TOPIC_GENERAL_CONVERSATION.to_string();
            result.confidence = 0.0;
            return result;
        }
        if result.is_off_topic {
            result.topic = TOPIC_OFF_TOPIC.to_string();
            result.confidence = 1.0;
            return result;
        }

        let mut confidence = 0.0;

        if let Some((label, matches)) = first_match(&normalized, &self.rules.intents) {
            result.intent = label.to_string();
            confidence += INTENT_WEIGHT * matches as f64;
        }

        if let Some((label, matches)) = first_match(&normalized, &self.rules.topics) {
            result.topic = label.to_string();
            confidence += TOPIC_WEIGHT * matches as f64;
        }

        result.confidence = confidence.clamp(0.0, 1.0);
        result
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// 내장 규칙 분류기 (공유 인스턴스)
pub fn default_classifier() -> &'static IntentClassifier {
    static CLASSIFIER: Lazy<IntentClassifier> = Lazy::new(|| {
        IntentClassifier::new(IntentRules::embedded().expect("Valid embedded intent rules"))
    });
    &CLASSIFIER
}

/// 내장 규칙으로 텍스트 분류
pub fn classify_intent(text: &str) -> IntentResult {
    default_classifier().classify(text)
}

fn contains_any<'a>(text: &str, keywords: impl IntoIterator<Item = &'a String>) -> bool {
    keywords.into_iter().any(|k| text.contains(k.as_str()))
}

/// 테이블 순서대로 첫 매칭 라벨과 매칭 키워드 수
fn first_match<'a>(text: &str, table: &'a [LabeledKeywords]) -> Option<(&'a str, usize)> {
    table.iter().find_map(|rule| {
        let matches = rule.keywords.iter().filter(|k| text.contains(k.as_str())).count();
        (matches > 0).then_some((rule.label.as_str(), matches))
    })
}

// ============================================================================
// Tests
// ============================================================================
