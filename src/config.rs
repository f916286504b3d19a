//! 설정 - 데이터 경로와 랭킹 기본값
//!
//! 우선순위: CLI 플래그 > 환경 변수 > settings.json > 데이터 디렉토리 파일 > 내장 데이터
//!
//! - `FAQ_RANKER_KB`: 지식베이스 JSON 경로
//! - `FAQ_RANKER_RULES`: 의도 분류 규칙 JSON 경로
//! - `<데이터 디렉토리>/settings.json`: 아래 `Settings` 필드 (모두 선택)
//!
//! 데이터 디렉토리는 플랫폼 로컬 데이터 경로 아래 `.faq-ranker`입니다
//! (예: Linux `~/.local/share/.faq-ranker`, 없으면 홈 디렉토리).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::intent::{IntentClassifier, IntentRules};
use crate::knowledge::{load_knowledge_base, KnowledgeSource};
use crate::ranking::{FaqRanker, ScoringProfile};

pub const KB_ENV: &str = "FAQ_RANKER_KB";
pub const RULES_ENV: &str = "FAQ_RANKER_RULES";

const KB_FILE: &str = "knowledge_base.json";
const RULES_FILE: &str = "intent_rules.json";
const SETTINGS_FILE: &str = "settings.json";

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로 (`dirs::data_local_dir()`/.faq-ranker, 없으면 홈/.faq-ranker)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".faq-ranker")
}

// ============================================================================
// Settings
// ============================================================================

/// 신뢰도 단계: 최상위 점수가 `min_score` 초과면 답변,
/// 나머지 중 `related_min` 초과만 관련 질문으로 표시
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceTier {
    pub min_score: f64,
    pub related_min: f64,
}

/// 대화 응답 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub related_limit: usize,
    pub related_min_score: f64,
    /// 높은 신뢰도
    pub confident: ConfidenceTier,
    /// 중간 신뢰도
    pub partial: ConfidenceTier,
    /// 낮은 신뢰도
    pub low: ConfidenceTier,
    /// 표시할 관련 질문 최대 개수
    pub max_related: usize,
    /// 답변 미리보기 글자 수
    pub preview_chars: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            related_limit: 8,
            related_min_score: 0.2,
            confident: ConfidenceTier { min_score: 4.0, related_min: 1.5 },
            partial: ConfidenceTier { min_score: 1.0, related_min: 0.8 },
            low: ConfidenceTier { min_score: 0.5, related_min: 0.3 },
            max_related: 4,
            preview_chars: 80,
        }
    }
}

/// 전체 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 지식베이스 JSON (없으면 내장 데이터)
    pub knowledge_base: Option<PathBuf>,
    /// 분류 규칙 JSON (없으면 내장 규칙)
    pub intent_rules: Option<PathBuf>,
    pub search_limit: usize,
    pub search_min_score: f64,
    /// 검색 결과 미리보기 글자 수
    pub search_preview_chars: usize,
    pub chat: ChatSettings,
    /// 관련 질문/검색용 가중치
    pub smart_profile: ScoringProfile,
    /// 최적 답변용 가중치
    pub simple_profile: ScoringProfile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            knowledge_base: None,
            intent_rules: None,
            search_limit: 10,
            search_min_score: 0.1,
            search_preview_chars: 100,
            chat: ChatSettings::default(),
            smart_profile: ScoringProfile::smart(),
            simple_profile: ScoringProfile::simple(),
        }
    }
}

impl Settings {
    /// 데이터 디렉토리와 환경 변수에서 설정 로드
    pub fn load() -> Result<Self> {
        Self::load_from(&get_data_dir())
    }

    /// 지정된 데이터 디렉토리 기준으로 로드
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        Self::load_with_env(data_dir, |key| std::env::var(key).ok())
    }

    /// 환경 변수 조회 함수를 주입하여 로드
    ///
    /// 경로 우선순위: 환경 변수 > settings.json > 데이터 디렉토리 JSON 파일 > 내장 데이터
    pub fn load_with_env<F>(data_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings_path = data_dir.join(SETTINGS_FILE);
        let mut settings = if settings_path.exists() {
            Self::from_file(&settings_path)?
        } else {
            Self::default()
        };

        let env_path = |key: &str| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };

        settings.knowledge_base = env_path(KB_ENV)
            .or(settings.knowledge_base.take())
            .or_else(|| existing(data_dir.join(KB_FILE)));
        settings.intent_rules = env_path(RULES_ENV)
            .or(settings.intent_rules.take())
            .or_else(|| existing(data_dir.join(RULES_FILE)));

        Ok(settings)
    }

    /// settings.json 파일 로드
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {:?}", path))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("Invalid settings file: {:?}", path))?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// 지식베이스 소스
    pub fn knowledge_source(&self) -> KnowledgeSource {
        match &self.knowledge_base {
            Some(path) => KnowledgeSource::File(path.clone()),
            None => KnowledgeSource::Embedded,
        }
    }

    /// 분류 규칙 로드
    pub fn load_rules(&self) -> Result<IntentRules> {
        let rules = match &self.intent_rules {
            Some(path) => IntentRules::from_file(path),
            None => IntentRules::embedded(),
        };
        rules.context("Failed to load intent rules")
    }

    /// 설정대로 랭커 구성 (지식베이스/규칙 검증 포함)
    pub fn build_ranker(&self) -> Result<FaqRanker> {
        let kb = load_knowledge_base(self.knowledge_source())
            .context("Failed to load knowledge base")?;
        let classifier = IntentClassifier::new(self.load_rules()?);

        Ok(FaqRanker::new(kb, classifier)
            .with_profiles(self.smart_profile.clone(), self.simple_profile.clone()))
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.search_limit, 10);
        assert_eq!(settings.chat.related_limit, 8);
        assert_eq!(settings.chat.confident.min_score, 4.0);
        assert_eq!(settings.smart_profile, ScoringProfile::smart());
        assert!(matches!(settings.knowledge_source(), KnowledgeSource::Embedded));
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"search_limit": 3, "chat": {"max_related": 2}}"#,
        )
        .unwrap();

        let settings = Settings::load_from(dir.path()).unwrap();
        assert_eq!(settings.search_limit, 3);
        assert_eq!(settings.chat.max_related, 2);
        // 나머지는 기본값
        assert_eq!(settings.chat.related_limit, 8);
        assert_eq!(settings.simple_profile, ScoringProfile::simple());
    }

    #[test]
    fn test_data_dir_knowledge_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(KB_FILE),
            r#"[{"id": "a", "keywords": ["x"], "question": "q", "answer": "a"}]"#,
        )
        .unwrap();

        let settings = Settings::load_with_env(dir.path(), |_| None).unwrap();
        let ranker = settings.build_ranker().unwrap();
        assert_eq!(ranker.knowledge_base().len(), 1);
    }

    #[test]
    fn test_env_overrides_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"knowledge_base": "/from/settings.json", "intent_rules": "/rules/settings.json"}"#,
        )
        .unwrap();

        let env = |key: &str| (key == KB_ENV).then(|| "/from/env".to_string());
        let settings = Settings::load_with_env(dir.path(), env).unwrap();

        assert_eq!(settings.knowledge_base, Some(PathBuf::from("/from/env")));
        // 환경 변수가 없으면 settings.json 값 유지
        assert_eq!(settings.intent_rules, Some(PathBuf::from("/rules/settings.json")));
    }

    #[test]
    fn test_data_dir_files_are_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(KB_FILE), "[]").unwrap();
        std::fs::write(dir.path().join(RULES_FILE), "{}").unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"intent_rules": "/rules/settings.json"}"#,
        )
        .unwrap();

        let settings = Settings::load_with_env(dir.path(), |_| None).unwrap();
        assert_eq!(settings.knowledge_base, Some(dir.path().join(KB_FILE)));
        assert_eq!(settings.intent_rules, Some(PathBuf::from("/rules/settings.json")));

        let blank = |_: &str| Some("   ".to_string());
        let settings = Settings::load_with_env(dir.path(), blank).unwrap();
        assert_eq!(settings.knowledge_base, Some(dir.path().join(KB_FILE)));
    }

    #[test]
    fn test_invalid_knowledge_base_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"[{"id": "a", "keywords": []}]"#).unwrap();

        let settings = Settings {
            knowledge_base: Some(path),
            ..Settings::default()
        };
        assert!(settings.build_ranker().is_err());
    }
}
