//! Golden results for the four searcher entry points

use lexis::{IndexSearcher, IndexWriter, ScoredResult};

const LINES: [&str; 4] = ["Muscle pain", "Miscle ache", "Schwann cell", "Epidemic"];

fn values(results: &[ScoredResult]) -> Vec<&str> {
    results.iter().map(|r| r.value.as_str()).collect()
}

#[test]
fn golden_prefix_search() {
    let index = IndexWriter::default().build(LINES).unwrap();
    let searcher = IndexSearcher::new(&index);

    assert_eq!(values(&searcher.prefix_search("schw").unwrap()), vec!["Schwann cell"]);
    assert_eq!(values(&searcher.prefix_search("SCHW").unwrap()), vec!["Schwann cell"]);
    assert!(searcher.prefix_search("xyz").unwrap().is_empty());
}

#[test]
fn golden_wildcard_search() {
    let index = IndexWriter::default().build(LINES).unwrap();
    let searcher = IndexSearcher::new(&index);

    assert_eq!(values(&searcher.wildcard_search("epid").unwrap()), vec!["Epidemic"]);
    assert_eq!(
        values(&searcher.wildcard_search("m?scle").unwrap()),
        vec!["Muscle pain", "Miscle ache"]
    );
}

#[test]
fn golden_query_search() {
    let index = IndexWriter::default().build(LINES).unwrap();
    let searcher = IndexSearcher::new(&index);

    assert_eq!(values(&searcher.query_search("muscle").unwrap()), vec!["Muscle pain"]);
    assert_eq!(
        values(&searcher.query_search("muscle OR schwann").unwrap()),
        vec!["Muscle pain", "Schwann cell"]
    );
    assert!(searcher.query_search("muscle AND schwann").unwrap().is_empty());
    assert_eq!(
        values(&searcher.query_search("(pain OR ache OR cell) NOT schwann").unwrap()),
        vec!["Muscle pain", "Miscle ache"]
    );
}

#[test]
fn golden_fuzzy_search() {
    let index = IndexWriter::default().build(LINES).unwrap();
    let searcher = IndexSearcher::new(&index);

    let results = searcher.fuzzy_search("miscle").unwrap();
    // both terms are unique, so equal idf; ties fall back to DocId
    assert_eq!(values(&results), vec!["Muscle pain", "Miscle ache"]);
    assert_eq!(results[0].score, results[1].score);
    assert!(results[0].score > 0.0);
}

#[test]
fn golden_fuzzy_threshold_is_exclusive() {
    let index = IndexWriter::default().build(["hxxxx", "hexxx"]).unwrap();
    let searcher = IndexSearcher::new(&index);

    // hxxxx: 4 edits over 5 chars, similarity exactly 0.2
    // hexxx: 3 edits, similarity 0.4
    assert_eq!(values(&searcher.fuzzy_search("hello").unwrap()), vec!["hexxx"]);
}

#[test]
fn golden_scores_are_tf_idf() {
    let index = IndexWriter::default()
        .build(["pain pain", "pain relief", "muscle cell", "epidemic"])
        .unwrap();
    let searcher = IndexSearcher::new(&index);

    let results = searcher.query_search("pain").unwrap();
    let idf = (4.0f32 / 3.0).ln();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].value, "pain pain");
    assert!((results[0].score - 2.0 * idf).abs() < 1e-6);
    assert!((results[1].score - idf).abs() < 1e-6);
}
