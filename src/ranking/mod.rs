//! Ranking 모듈 - FAQ 관련도 스코어링 및 랭킹
//!
//! - Similarity: 최장 일치 블록 기반 문자열 유사도
//! - Scorer: 가중치 테이블로 설정되는 단일 스코어 함수
//! - Context: 대화 맥락 키워드 추출/가중
//! - Ranker: 정렬/필터/절단 및 공개 API (`FaqRanker`)

mod context;
mod ranker;
mod scorer;
mod similarity;

// Re-exports
pub use context::{
    extract_context_keywords, ContextKeywords, ConversationTurn, Role, CONTEXT_WINDOW,
    MAX_CONTEXT_KEYWORDS,
};
pub use ranker::{rank, BestMatch, FaqRanker, SearchOutcome};
pub use scorer::{
    AnswerQualityRule, IntentWeights, RelevanceFactor, ScoredMatch, Scorer, ScoringProfile,
    SimilarityRule,
};
pub use similarity::similarity_ratio;
