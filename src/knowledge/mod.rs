//! Knowledge 모듈 - 읽기 전용 FAQ 지식베이스
//!
//! - Entry: 질문/답변/키워드 레코드와 불변 컬렉션
//! - Loader: JSON 소스 검증 및 로드 (잘못된 항목이 있으면 즉시 실패)

mod entry;
mod loader;

// Re-exports
pub use entry::{KnowledgeBase, KnowledgeEntry};
pub use loader::{
    DEFAULT_KNOWLEDGE_BASE, KnowledgeSource, load_knowledge_base, load_knowledge_base_file,
};
