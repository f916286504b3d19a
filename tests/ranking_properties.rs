//! 랭킹 속성 테스트
//!
//! 임의 입력에 대해 결정성, 임계값/개수 제한, 키워드 매칭 계약을 검증합니다.

use faq_ranker::{
    classify_intent, load_knowledge_base, ContextKeywords, FaqRanker, IntentClassifier,
    KnowledgeBase, KnowledgeEntry, KnowledgeSource, ScoringProfile, Scorer,
};
use proptest::prelude::*;

fn embedded_ranker() -> FaqRanker {
    let kb = load_knowledge_base(KnowledgeSource::Embedded).unwrap();
    FaqRanker::new(kb, IntentClassifier::with_defaults())
}

fn query_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[가-힣 ]{0,20}",
        "[a-zA-Z0-9 ?!.]{0,30}",
        Just("훈련장려금 얼마예요?".to_string()),
        Just("줌 배경 설정".to_string()),
        Just("출결 인정 방법".to_string()),
        any::<String>(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_classify_never_panics(text in any::<String>()) {
        let result = classify_intent(&text);
        prop_assert!((0.0..=1.0).contains(&result.confidence));
        prop_assert_eq!(result.input_length, text.chars().count());
    }

    #[test]
    fn test_related_is_deterministic(query in query_strategy()) {
        let ranker = embedded_ranker();
        let context = ContextKeywords::default();

        let first = ranker.find_related_questions(&query, 8, 0.2, &context);
        let second = ranker.find_related_questions(&query, 8, 0.2, &context);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_limit_and_threshold_contract(
        query in query_strategy(),
        limit in 0usize..12,
        min_score in 0.0f64..10.0,
    ) {
        let ranker = embedded_ranker();
        let results = ranker.find_related_questions(&query, limit, min_score, &ContextKeywords::default());

        prop_assert!(results.len() <= limit);
        prop_assert!(results.iter().all(|m| m.score >= min_score));
        prop_assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_higher_threshold_is_prefix(
        query in query_strategy(),
        low in 0.0f64..5.0,
        delta in 0.0f64..5.0,
    ) {
        let ranker = embedded_ranker();
        let context = ContextKeywords::default();
        let high = low + delta;

        let loose = ranker.find_related_questions(&query, usize::MAX, low, &context);
        let strict = ranker.find_related_questions(&query, usize::MAX, high, &context);

        // 더 높은 임계값의 결과는 낮은 임계값 결과의 앞부분과 같음
        prop_assert!(strict.len() <= loose.len());
        prop_assert_eq!(&loose[..strict.len()], &strict[..]);
    }

    #[test]
    fn test_empty_knowledge_base_returns_nothing(query in query_strategy()) {
        let ranker = FaqRanker::new(KnowledgeBase::empty(), IntentClassifier::with_defaults());

        prop_assert!(ranker.find_best_match(&query).is_none());
        prop_assert!(ranker.find_related_questions(&query, 10, 0.0, &ContextKeywords::default()).is_empty());
        prop_assert_eq!(ranker.search(&query, 10, 0.0).total_found, 0);
    }

    #[test]
    fn test_contained_keyword_is_matched(
        prefix in "[a-z0-9 가-힣]{0,10}",
        keyword in "[a-z가-힣]{1,6}",
        suffix in "[a-z0-9 가-힣]{0,10}",
    ) {
        let entry = KnowledgeEntry {
            id: "target".to_string(),
            keywords: vec![keyword.clone()],
            question: "테스트 질문".to_string(),
            answer: "테스트 답변".to_string(),
        };
        let query = format!("{}{}{}", prefix, keyword, suffix);
        let classifier = IntentClassifier::with_defaults();
        let intent = classifier.classify(&query);

        for profile in [ScoringProfile::smart(), ScoringProfile::simple()] {
            let scored = Scorer::new(&profile, &classifier)
                .score(&query, &entry, &intent, &ContextKeywords::default());
            prop_assert_eq!(&scored.matched_keywords, &vec![keyword.clone()]);
            prop_assert!(scored.score >= profile.exact_keyword);
        }
    }
}

#[test]
fn test_knowledge_base_order_breaks_ties() {
    let entries: Vec<KnowledgeEntry> = ["first", "second", "third"]
        .iter()
        .map(|id| KnowledgeEntry {
            id: id.to_string(),
            keywords: vec!["동일".to_string()],
            question: "같은 질문".to_string(),
            answer: "같은 답변".to_string(),
        })
        .collect();
    let kb = KnowledgeBase::new(entries).unwrap();
    let ranker = FaqRanker::new(kb, IntentClassifier::with_defaults());

    let ids: Vec<String> = ranker
        .find_related_questions("동일", 10, 0.0, &ContextKeywords::default())
        .into_iter()
        .map(|m| m.entry_id)
        .collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}
