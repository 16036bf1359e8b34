//! Snapshot persistence and generation swapping

use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use lexis::{Index, IndexHandle, IndexSearcher, IndexWriter, LexisError, TokenizerConfig};

const LINES: [&str; 4] = ["Muscle pain", "Miscle ache", "Schwann cell", "Epidemic"];

fn answers(index: &Index) -> Vec<Vec<String>> {
    let searcher = IndexSearcher::new(index);
    let collect = |results: Vec<lexis::ScoredResult>| -> Vec<String> {
        results
            .into_iter()
            .map(|r| format!("{}:{}:{}", r.doc_id, r.value, r.score))
            .collect()
    };
    vec![
        collect(searcher.prefix_search("schw").unwrap()),
        collect(searcher.wildcard_search("epid").unwrap()),
        collect(searcher.query_search("muscle OR \"schwann cell\"").unwrap()),
        collect(searcher.fuzzy_search("miscle").unwrap()),
    ]
}

#[test]
fn test_snapshot_round_trip_preserves_results() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.lexis");

    let config = TokenizerConfig::default().with_stopwords();
    let index = IndexWriter::new(&config).with_generation(7).build(LINES).unwrap();
    index.save(&path).unwrap();

    let reopened = Index::open(&path).unwrap();
    assert_eq!(reopened.generation(), 7);
    assert_eq!(reopened.total_docs(), index.total_docs());
    assert_eq!(reopened.tokenizer_config(), Some(&config));
    assert_eq!(answers(&reopened), answers(&index));

    // no temp file is left behind
    let names: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 1);
}

#[test]
fn test_save_replaces_previous_snapshot() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.lexis");

    IndexWriter::default().build(["Epidemic"]).unwrap().save(&path).unwrap();
    IndexWriter::default().build(LINES).unwrap().save(&path).unwrap();

    assert_eq!(Index::open(&path).unwrap().total_docs(), 4);
}

#[test]
fn test_corrupted_snapshot_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.lexis");
    IndexWriter::default().build(LINES).unwrap().save(&path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x55;
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(Index::open(&path), Err(LexisError::CorruptSnapshot(_))));

    fs::write(&path, b"not a snapshot").unwrap();
    assert!(matches!(Index::open(&path), Err(LexisError::CorruptSnapshot(_))));

    let missing = tmp.path().join("missing.lexis");
    assert!(matches!(Index::open(&missing), Err(LexisError::Io(_))));
}

#[test]
fn test_failed_rebuild_keeps_previous_generation() {
    let handle = IndexHandle::new(IndexWriter::default()).unwrap();
    handle.rebuild(LINES).unwrap();
    assert_eq!(handle.generation(), 1);

    let lines: Vec<Result<String, std::io::Error>> = vec![
        Ok("Cramp".to_string()),
        Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes")),
    ];
    let err = handle.rebuild_from_lines(lines).unwrap_err();
    assert!(matches!(err, LexisError::IndexBuild { .. }));

    let current = handle.snapshot();
    assert_eq!(current.generation(), 1);
    assert_eq!(current.total_docs(), 4);
    assert!(IndexSearcher::new(&current).query_search("cramp").unwrap().is_empty());
    assert_eq!(IndexSearcher::new(&current).query_search("muscle").unwrap().len(), 1);
}

#[test]
fn test_handle_loads_snapshot() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.lexis");
    IndexWriter::default().build(LINES).unwrap().save(&path).unwrap();

    let handle = IndexHandle::new(IndexWriter::default()).unwrap();
    handle.rebuild(["Epidemic"]).unwrap();
    handle.load_snapshot(&path).unwrap();

    // generations never move backwards
    assert_eq!(handle.generation(), 2);
    assert_eq!(handle.snapshot().total_docs(), 4);

    let stemmed = IndexHandle::new(IndexWriter::new(&TokenizerConfig::default().with_stemming())).unwrap();
    assert!(matches!(
        stemmed.load_snapshot(&path),
        Err(LexisError::InvalidRequest(_))
    ));
    assert_eq!(stemmed.generation(), 0);
}

#[test]
fn test_concurrent_searches_during_rebuilds() {
    let handle = Arc::new(IndexHandle::new(IndexWriter::default()).unwrap());
    handle.rebuild(LINES).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for _ in 0..200 {
                    let index = handle.snapshot();
                    let hits = IndexSearcher::new(&index).fuzzy_search("miscle").unwrap();
                    // every published generation holds the same corpus
                    assert_eq!(hits.len(), 2);
                }
            })
        })
        .collect();

    for _ in 0..20 {
        handle.rebuild(LINES).unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(handle.generation(), 21);
}
