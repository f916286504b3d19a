//! CLI 모듈
//!
//! faq-ranker CLI 명령어 정의 및 구현

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::chat::{answer_preview, respond, GreetingKind, Reply};
use crate::config::{get_data_dir, Settings};
use crate::knowledge::KnowledgeEntry;
use crate::ranking::{ContextKeywords, ConversationTurn, FaqRanker, ScoredMatch};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "faq-ranker")]
#[command(version, about = "규칙 기반 FAQ 매칭 및 관련도 랭킹", long_about = None)]
pub struct Cli {
    /// 지식베이스 JSON 경로 (기본: 내장 데이터)
    #[arg(long, global = true)]
    pub kb: Option<PathBuf>,

    /// 의도 분류 규칙 JSON 경로 (기본: 내장 규칙)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// JSON으로 출력
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 텍스트의 의도/주제 분류
    Classify {
        /// 분류할 텍스트
        text: String,
    },

    /// 단일 최적 답변 찾기
    Best {
        /// 질문
        query: String,
    },

    /// 관련 질문 목록
    Related {
        /// 질문
        query: String,

        /// 결과 개수 제한
        #[arg(short, long)]
        limit: Option<usize>,

        /// 최소 관련도 점수
        #[arg(short, long)]
        min_score: Option<f64>,

        /// 맥락 키워드 (반복 지정 가능)
        #[arg(short, long = "context")]
        context: Vec<String>,

        /// 이전 사용자 질문 (맥락 키워드 추출용, 반복 지정 가능)
        #[arg(long)]
        history: Vec<String>,
    },

    /// 관련도 검색
    Search {
        /// 검색어
        query: String,

        /// 결과 개수 제한
        #[arg(short, long)]
        limit: Option<usize>,

        /// 최소 관련도 점수
        #[arg(short, long)]
        min_score: Option<f64>,
    },

    /// FAQ 목록
    List {
        /// 키워드 필터
        #[arg(short, long)]
        keyword: Option<String>,
    },

    /// 챗봇 응답 시뮬레이션
    Chat {
        /// 질문
        query: String,

        /// 이전 사용자 질문 (반복 지정 가능)
        #[arg(long)]
        history: Vec<String>,
    },

    /// 지식베이스/규칙 검증 및 상태 확인
    Validate,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load().context("설정 로드 실패")?;
    if cli.kb.is_some() {
        settings.knowledge_base = cli.kb.clone();
    }
    if cli.rules.is_some() {
        settings.intent_rules = cli.rules.clone();
    }

    let ranker = settings.build_ranker().context("랭커 초기화 실패")?;
    let json = cli.json;

    match cli.command {
        Commands::Classify { text } => cmd_classify(&ranker, &text, json),
        Commands::Best { query } => cmd_best(&ranker, &query, json),
        Commands::Related {
            query,
            limit,
            min_score,
            context,
            history,
        } => cmd_related(
            &ranker,
            &query,
            limit.unwrap_or(settings.chat.related_limit),
            min_score.unwrap_or(settings.chat.related_min_score),
            context,
            &history,
            json,
        ),
        Commands::Search {
            query,
            limit,
            min_score,
        } => cmd_search(
            &ranker,
            &settings,
            &query,
            limit.unwrap_or(settings.search_limit),
            min_score.unwrap_or(settings.search_min_score),
            json,
        ),
        Commands::List { keyword } => cmd_list(&ranker, keyword.as_deref(), json),
        Commands::Chat { query, history } => cmd_chat(&ranker, &settings, &query, &history, json),
        Commands::Validate => cmd_validate(&ranker, &settings),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 분류 명령어 (classify)
fn cmd_classify(ranker: &FaqRanker, text: &str, json: bool) -> Result<()> {
    let result = ranker.classify_intent(text);

    if json {
        return print_json(&result);
    }

    println!("[OK] 분류 결과:");
    println!("     의도: {}", result.intent);
    println!("     주제: {}", result.topic);
    println!("     신뢰도: {:.2}", result.confidence);
    println!("     일반 대화: {}", yes_no(result.is_general_conversation));
    println!("     타사 질문: {}", yes_no(result.is_off_topic));
    println!("     의문사 수: {}", result.question_words);

    Ok(())
}

/// 최적 답변 명령어 (best)
fn cmd_best(ranker: &FaqRanker, query: &str, json: bool) -> Result<()> {
    let query = validate_query(query)?;
    let best = ranker.find_best_match(query);

    if json {
        return print_json(&best);
    }

    match best {
        Some(best) => {
            println!("[OK] 최적 답변 [점수: {:.2}] {}", best.score, best.entry.id);
            println!("     질문: {}", best.entry.question);
            println!("     답변: {}", best.entry.answer);
            if !best.matched_keywords.is_empty() {
                println!("     키워드: {}", best.matched_keywords.join(", "));
            }
        }
        None => println!("[!] 매칭되는 답변이 없습니다."),
    }

    Ok(())
}

/// 관련 질문 명령어 (related)
fn cmd_related(
    ranker: &FaqRanker,
    query: &str,
    limit: usize,
    min_score: f64,
    context: Vec<String>,
    history: &[String],
    json: bool,
) -> Result<()> {
    let query = validate_query(query)?;

    let turns: Vec<ConversationTurn> = history.iter().map(ConversationTurn::user).collect();
    let context: ContextKeywords = context
        .into_iter()
        .chain(ranker.context_keywords(&turns).iter().map(str::to_string))
        .collect();

    let results = ranker.find_related_questions(query, limit, min_score, &context);

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("\n[!] 관련 질문이 없습니다.");
        return Ok(());
    }

    println!("\n[OK] 관련 질문 ({} 건):\n", results.len());
    print_matches(ranker, &results, 100);

    Ok(())
}

/// 검색 명령어 (search)
fn cmd_search(
    ranker: &FaqRanker,
    settings: &Settings,
    query: &str,
    limit: usize,
    min_score: f64,
    json: bool,
) -> Result<()> {
    let query = validate_query(query)?;
    let outcome = ranker.search(query, limit, min_score);

    if json {
        return print_json(&outcome);
    }

    if outcome.results.is_empty() {
        println!("\n[!] 검색 결과가 없습니다.");
        return Ok(());
    }

    println!(
        "\n[OK] 검색 결과 ({} / {} 건, 최소 점수 {}):\n",
        outcome.results.len(),
        outcome.total_found,
        outcome.min_score
    );
    print_matches(ranker, &outcome.results, settings.search_preview_chars);

    Ok(())
}

/// 목록 명령어 (list)
fn cmd_list(ranker: &FaqRanker, keyword: Option<&str>, json: bool) -> Result<()> {
    let entries = ranker.knowledge_base().filter_by_keyword(keyword);

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("[!] 조건에 맞는 FAQ가 없습니다.");
        return Ok(());
    }

    match keyword {
        Some(k) => println!("[OK] '{}' 관련 FAQ ({} 건):\n", k, entries.len()),
        None => println!("[OK] 전체 FAQ ({} 건):\n", entries.len()),
    }

    for entry in entries {
        println!("  {}", entry.id);
        println!("        Q: {}", truncate_text(&entry.question, 60));
        println!("        키워드: {}", entry.keywords.join(", "));
        println!();
    }

    Ok(())
}

/// 챗봇 명령어 (chat)
fn cmd_chat(
    ranker: &FaqRanker,
    settings: &Settings,
    query: &str,
    history: &[String],
    json: bool,
) -> Result<()> {
    let query = validate_query(query)?;
    let turns: Vec<ConversationTurn> = history.iter().map(ConversationTurn::user).collect();
    let reply = respond(ranker, &settings.chat, query, &turns);

    if json {
        return print_json(&reply);
    }

    println!("[*] 상태: {}\n", reply.status());

    match &reply {
        Reply::OffTopic => println!(
            "죄송합니다. 부트캠프 운영과 관련된 질문만 답변드릴 수 있습니다. \
             궁금한 점이 있으시면 언제든지 물어보세요!"
        ),
        Reply::Greeting { greeting } => println!("{}", greeting_message(*greeting)),
        Reply::Answer {
            entry,
            score,
            matched_keywords,
            related,
            ..
        } => {
            println!("{}\n", entry.answer);
            println!("     [점수: {:.2}] {}", score, entry.id);
            if !matched_keywords.is_empty() {
                println!("     키워드: {}", matched_keywords.join(", "));
            }
            if !related.is_empty() {
                println!("\n[*] 관련 질문:");
                for rq in related {
                    println!("  - [{:.2}] {}", rq.score, rq.question);
                    println!("          {}", rq.answer_preview.replace('\n', " "));
                }
            }
        }
        Reply::NoMatch { suggestion } => {
            println!(
                "죄송합니다. 해당 질문에 대한 정확한 답변을 찾을 수 없습니다.\n\n\
                 구체적인 키워드(예: 훈련장려금, 출결, 줌 등)로 다시 질문해주시면 도움을 드릴 수 있습니다."
            );
            if let Some(best) = suggestion {
                println!("\n[*] 혹시 이 질문을 찾으셨나요? {}", best.entry.question);
            }
        }
    }

    Ok(())
}

/// 검증 명령어 (validate)
fn cmd_validate(ranker: &FaqRanker, settings: &Settings) -> Result<()> {
    println!("faq-ranker v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("[*] 데이터 디렉토리: {}", get_data_dir().display());

    match &settings.knowledge_base {
        Some(path) => println!("[*] 지식베이스: {}", path.display()),
        None => println!("[*] 지식베이스: 내장 데이터"),
    }
    match &settings.intent_rules {
        Some(path) => println!("[*] 분류 규칙: {}", path.display()),
        None => println!("[*] 분류 규칙: 내장 규칙"),
    }

    let kb = ranker.knowledge_base();
    let keyword_count: usize = kb.iter().map(|e| e.keywords.len()).sum();
    let answer_chars: usize = kb.iter().map(|e| e.answer.chars().count()).sum();

    println!("[OK] FAQ: {} 건 (키워드 {} 개)", kb.len(), keyword_count);
    println!("     답변 길이: {}", format_answer_length(answer_chars, kb.len()));

    let rules = ranker.classifier().rules();
    println!(
        "[OK] 분류 규칙: 의도 {} 종, 주제 {} 종",
        rules.intents.len(),
        rules.topics.len()
    );

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 빈 질문 거부
fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        bail!("질문을 입력해주세요.");
    }
    Ok(trimmed)
}

fn print_matches(ranker: &FaqRanker, matches: &[ScoredMatch], preview_chars: usize) {
    for (i, m) in matches.iter().enumerate() {
        let Some(entry) = ranker.entry(&m.entry_id) else {
            continue;
        };

        println!("{}. [{}] [점수: {:.2}] {}", i + 1, m.match_type(), m.score, entry.id);
        print_entry(entry, preview_chars);
        if !m.matched_keywords.is_empty() {
            println!("   키워드: {}", m.matched_keywords.join(", "));
        }
        let factors: Vec<&str> = m.relevance_factors.iter().map(|f| f.as_str()).collect();
        if !factors.is_empty() {
            println!("   요인: {}", factors.join(", "));
        }
        println!();
    }
}

fn print_entry(entry: &KnowledgeEntry, preview_chars: usize) {
    println!("   질문: {}", entry.question);
    println!("   답변: {}", truncate_text(&entry.answer, preview_chars));
}

fn greeting_message(kind: GreetingKind) -> &'static str {
    match kind {
        GreetingKind::Hello => {
            "안녕하세요! 부트캠프 운영 상담 챗봇입니다. 훈련장려금, 출결, 공결 등 무엇이든 궁금한 점을 물어보세요!"
        }
        GreetingKind::Thanks => "천만에요! 언제든지 궁금한 것이 있으시면 편하게 물어보세요.",
        GreetingKind::SmallTalk => {
            "저는 훈련생 여러분을 돕기 위해 항상 대기하고 있어요! 궁금한 점이 있으시면 언제든 말씀해주세요."
        }
        GreetingKind::Other => {
            "안녕하세요! 무엇을 도와드릴까요? 훈련장려금, 출결, 공결 등 궁금한 점을 물어보세요."
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("JSON 직렬화 실패")?;
    println!("{}", json);
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "예"
    } else {
        "아니오"
    }
}

/// 텍스트 자르기 (UTF-8 안전, 줄바꿈 제거)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    answer_preview(cleaned.trim(), max_chars)
}

/// 답변 길이 요약 (총 글자 수, 엔트리당 평균)
fn format_answer_length(total_chars: usize, entries: usize) -> String {
    if entries == 0 {
        return "0자".to_string();
    }
    format!(
        "총 {}자, 평균 {:.1}자",
        total_chars,
        total_chars as f64 / entries as f64
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_text("안녕하세요 세계", 5), "안녕하세요...");
    }

    #[test]
    fn test_format_answer_length() {
        assert_eq!(format_answer_length(0, 0), "0자");
        assert_eq!(format_answer_length(300, 4), "총 300자, 평균 75.0자");
        assert_eq!(format_answer_length(10, 3), "총 10자, 평균 3.3자");
    }

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  출결  ").unwrap(), "출결");
        assert!(validate_query("   ").is_err());
        assert!(validate_query("").is_err());
    }

    #[test]
    fn test_cli_parses_related() {
        let cli = Cli::parse_from([
            "faq-ranker",
            "related",
            "줌 설정",
            "-l",
            "3",
            "-c",
            "줌",
            "-c",
            "배경",
            "--json",
        ]);

        assert!(cli.json);
        match cli.command {
            Commands::Related { query, limit, context, .. } => {
                assert_eq!(query, "줌 설정");
                assert_eq!(limit, Some(3));
                assert_eq!(context, vec!["줌", "배경"]);
            }
            _ => panic!("expected related command"),
        }
    }
}
