//! faq-ranker - 규칙 기반 FAQ 매칭 및 관련도 랭킹
//!
//! 키워드 규칙으로 질문의 의도/주제를 분류하고, 지식베이스 엔트리를
//! 가중치 테이블 기반 스코어로 정렬하여 최적 답변과 관련 질문을 찾습니다.
//! 외부 서비스 없이 동기적으로 동작하며, 같은 입력에는 항상 같은 결과를 반환합니다.

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod ranking;

// Re-exports
pub use chat::{respond, GreetingKind, MatchConfidence, RelatedQuestion, Reply};
pub use config::{get_data_dir, ChatSettings, Settings};
pub use error::ConfigError;
pub use intent::{classify_intent, IntentClassifier, IntentResult, IntentRules};
pub use knowledge::{
    load_knowledge_base, load_knowledge_base_file, KnowledgeBase, KnowledgeEntry, KnowledgeSource,
};
pub use ranking::{
    extract_context_keywords, similarity_ratio, BestMatch, ContextKeywords, ConversationTurn,
    FaqRanker, RelevanceFactor, Role, ScoredMatch, Scorer, ScoringProfile, SearchOutcome,
};
