//! 의도/주제 분류 규칙 테이블
//!
//! 규칙은 코드가 아닌 데이터(JSON)로 관리합니다.
//! 테이블 순서가 곧 우선순위이며, 첫 번째로 매칭된 라벨이 선택됩니다.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 내장 기본 규칙 (data/intent_rules.json)
pub const DEFAULT_INTENT_RULES: &str = include_str!("../../data/intent_rules.json");

// ============================================================================
// Types
// ============================================================================

/// 라벨 → 키워드 목록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledKeywords {
    pub label: String,
    pub keywords: Vec<String>,
}

/// 일반 대화 판별용 단어 목록 (4종)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConversationRules {
    /// 인사말
    #[serde(default)]
    pub greetings: Vec<String>,
    /// 잡담
    #[serde(default)]
    pub small_talk: Vec<String>,
    /// 프로그래밍 질문
    #[serde(default)]
    pub programming: Vec<String>,
    /// 일반 도움 요청
    #[serde(default)]
    pub generic_help: Vec<String>,
}

impl GeneralConversationRules {
    /// 네 목록 전체 순회
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.greetings
            .iter()
            .chain(&self.small_talk)
            .chain(&self.programming)
            .chain(&self.generic_help)
    }
}

/// 분류 규칙 전체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRules {
    pub general_conversation: GeneralConversationRules,
    /// 타사(경쟁 기관) 키워드
    #[serde(default)]
    pub competitor_keywords: Vec<String>,
    /// 자사 키워드 (포함 시 타사 판정 해제)
    #[serde(default)]
    pub own_organization_keywords: Vec<String>,
    /// 의도 테이블 (순서 = 우선순위)
    pub intents: Vec<LabeledKeywords>,
    /// 주제 테이블 (순서 = 우선순위)
    pub topics: Vec<LabeledKeywords>,
    /// 의문사 목록
    #[serde(default)]
    pub question_words: Vec<String>,
}

// ============================================================================
// Loading
// ============================================================================

impl IntentRules {
    /// 내장 기본 규칙
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(DEFAULT_INTENT_RULES)
    }

    /// JSON 문자열에서 로드
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let rules: IntentRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules.normalized())
    }

    /// JSON 파일에서 로드
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::from_json(&json)?;
        tracing::info!(
            "Loaded intent rules from {:?} ({} intents, {} topics)",
            path,
            rules.intents.len(),
            rules.topics.len()
        );
        Ok(rules)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (kind, table) in [("intent", &self.intents), ("topic", &self.topics)] {
            if table.is_empty() {
                return Err(ConfigError::InvalidRule(format!("{} table is empty", kind)));
            }
            for rule in table {
                if rule.label.trim().is_empty() {
                    return Err(ConfigError::InvalidRule(format!("blank {} label", kind)));
                }
                if rule.keywords.is_empty() {
                    return Err(ConfigError::InvalidRule(format!(
                        "{} `{}` has no keywords",
                        kind, rule.label
                    )));
                }
            }
        }

        let blank = self
            .general_conversation
            .all()
            .chain(&self.competitor_keywords)
            .chain(&self.own_organization_keywords)
            .chain(self.intents.iter().flat_map(|r| &r.keywords))
            .chain(self.topics.iter().flat_map(|r| &r.keywords))
            .any(|k| k.trim().is_empty());
        if blank {
            // 빈 키워드는 모든 텍스트에 매칭됨
            return Err(ConfigError::InvalidRule("blank keyword".to_string()));
        }

        Ok(())
    }

    /// 키워드 소문자화 (입력 텍스트도 소문자로 비교)
    fn normalized(mut self) -> Self {
        fn lower(list: &mut [String]) {
            for k in list.iter_mut() {
                *k = k.to_lowercase();
            }
        }

        lower(&mut self.general_conversation.greetings);
        lower(&mut self.general_conversation.small_talk);
        lower(&mut self.general_conversation.programming);
        lower(&mut self.general_conversation.generic_help);
        lower(&mut self.competitor_keywords);
        lower(&mut self.own_organization_keywords);
        lower(&mut self.question_words);
        for rule in self.intents.iter_mut().chain(self.topics.iter_mut()) {
            lower(&mut rule.keywords);
        }
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_rules_parse() {
        let rules = IntentRules::embedded().unwrap();
        assert_eq!(rules.intents[0].label, "amount_inquiry");
        assert_eq!(rules.topics[0].label, "training_stipend");
        assert!(rules.general_conversation.greetings.contains(&"안녕하세요".to_string()));
    }

    #[test]
    fn test_keywords_lowercased() {
        let rules = IntentRules::embedded().unwrap();
        let attendance = rules.topics.iter().find(|t| t.label == "attendance").unwrap();
        assert!(attendance.keywords.contains(&"qr".to_string()));
        assert!(!attendance.keywords.contains(&"QR".to_string()));
    }

    #[test]
    fn test_rejects_blank_keyword() {
        let json = r#"{
            "general_conversation": {"greetings": [""]},
            "intents": [{"label": "a", "keywords": ["x"]}],
            "topics": [{"label": "b", "keywords": ["y"]}]
        }"#;
        let err = IntentRules::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule(_)));
    }

    #[test]
    fn test_rejects_empty_table() {
        let json = r#"{
            "general_conversation": {},
            "intents": [],
            "topics": [{"label": "b", "keywords": ["y"]}]
        }"#;
        assert!(IntentRules::from_json(json).is_err());
    }
}
