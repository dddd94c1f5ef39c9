mod common;

use proptest::prelude::*;
use warta_core::tfidf::TfidfIndex;
use warta_core::bm25::Bm25Index;
use warta_core::{HybridRanker, Method, Model, Normalizer, RankError};

const WORDS: &[&str] = &["desa", "jalan", "pantai", "kader", "festival", "dana", "pasar", "irigasi"];

fn corpus_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(WORDS).prop_map(str::to_string), 0..10),
        0..12,
    )
}

fn query_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(WORDS).prop_map(str::to_string), 0..5)
}

proptest! {
    #[test]
    fn tfidf_vectors_are_unit_or_zero(docs in corpus_strategy()) {
        let idx = TfidfIndex::build(&docs);
        for d in 0..docs.len() {
            let v = idx.doc_vector(d).unwrap();
            let norm = v.iter().map(|tw| tw.weight * tw.weight).sum::<f32>().sqrt();
            prop_assert!(v.is_empty() || (norm - 1.0).abs() < 1e-4, "norm {}", norm);
        }
    }

    #[test]
    fn content_scores_stay_in_unit_interval(docs in corpus_strategy(), q in query_strategy()) {
        let tfidf = TfidfIndex::build(&docs);
        let bm25 = Bm25Index::build(&docs);
        for s in tfidf.score(&q).into_iter().chain(bm25.score(&q)) {
            prop_assert!(s.is_finite());
            prop_assert!((0.0..=1.0).contains(&s), "score {}", s);
        }
    }

    #[test]
    fn builds_are_idempotent(docs in corpus_strategy(), q in query_strategy()) {
        let a = TfidfIndex::build(&docs);
        let b = TfidfIndex::build(&docs);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.score(&q), b.score(&q));
        prop_assert_eq!(Bm25Index::build(&docs).score(&q), Bm25Index::build(&docs).score(&q));
    }
}

#[test]
fn alpha_one_orders_by_content_alone() {
    let model = Model::build(common::district_news(), &Normalizer::default());
    let n = Normalizer::default();
    let ranker = HybridRanker::new(&model, &n);
    for method in [Method::Tfidf, Method::Bm25] {
        let hits = ranker.rank_top("kader posyandu desa", 1.0, method, model.num_docs()).unwrap();
        let content = ranker.content_scores("kader posyandu desa", method);
        let mut expected: Vec<usize> = (0..content.len()).collect();
        expected.sort_by(|a, b| content[*b].total_cmp(&content[*a]));
        let got: Vec<usize> = hits.iter().map(|h| h.doc_id as usize).collect();
        assert_eq!(got, expected, "{method}");
        assert!(hits.iter().all(|h| h.combined_score == h.content_score));
    }
}

#[test]
fn alpha_zero_orders_by_popularity_alone() {
    let model = Model::build(common::district_news(), &Normalizer::default());
    let n = Normalizer::default();
    let hits = HybridRanker::new(&model, &n).rank("jalan desa", 0.0, Method::Bm25).unwrap();
    let counts: Vec<u64> = hits.iter().map(|h| h.access_count).collect();
    assert_eq!(counts, vec![300, 120, 80, 60, 45]);
}

#[test]
fn no_overlap_falls_back_to_popularity() {
    let model = Model::build(common::district_news(), &Normalizer::default());
    let n = Normalizer::default();
    let ranker = HybridRanker::new(&model, &n);
    for method in [Method::Tfidf, Method::Bm25] {
        let hits = ranker.rank("kapal selam nuklir", 0.7, method).unwrap();
        assert_eq!(hits.len(), 5);
        assert!(hits.iter().all(|h| h.content_score == 0.0));
        let ids: Vec<u32> = hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![2, 0, 3, 6, 1]);
    }
}

#[test]
fn zero_access_articles_tie_in_corpus_order() {
    let raw = vec![
        common::article("A", "desa", "tanpa info"),
        common::article("B", "desa", "rusak"),
        common::article("C", "desa", ""),
    ];
    let model = Model::build(raw, &Normalizer::default());
    let n = Normalizer::default();
    let hits = HybridRanker::new(&model, &n).rank("apa saja", 0.0, Method::Tfidf).unwrap();
    assert_eq!(hits.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(model.popularity.max_access_count(), 1);
}

#[test]
fn popularity_matches_access_counts() {
    let raw = vec![
        common::article("A", "satu", "0 kali"),
        common::article("B", "dua", "10 kali"),
        common::article("C", "tiga", "5 kali"),
    ];
    let model = Model::build(raw, &Normalizer::default());
    assert_eq!(model.popularity.max_access_count(), 10);
    assert_eq!(model.popularity.scores(), vec![0.0, 1.0, 0.5]);
}

#[test]
fn relevant_article_wins_blend() {
    let model = Model::build(common::district_news(), &Normalizer::default());
    let n = Normalizer::default();
    let hits = HybridRanker::new(&model, &n).rank("stunting", 0.7, Method::Tfidf).unwrap();
    assert_eq!(hits[0].title, "Sosialisasi Stunting");
    assert!(hits[0].content_score > 0.0);
    assert!(hits.windows(2).all(|w| w[0].combined_score >= w[1].combined_score));
}

#[test]
fn invalid_alpha_is_an_error() {
    let model = Model::build(common::district_news(), &Normalizer::default());
    let n = Normalizer::default();
    let err = HybridRanker::new(&model, &n).rank("desa", -0.1, Method::Tfidf).unwrap_err();
    assert_eq!(err, RankError::InvalidAlpha(-0.1));
}
