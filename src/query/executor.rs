//! Query executor for running queries against the index
//!
//! Matching and scoring are separate passes: the query node produces the
//! bitmap of matching documents, then a [`Scorer`] built from the node's
//! positive terms ranks them and a bounded heap keeps the best `top_k`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

use ordered_float::OrderedFloat;
use roaring::RoaringBitmap;
use tracing::debug;

use crate::error::LexisError;
use crate::models::ScoredResult;
use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::QueryStats;
use crate::scoring::Scorer;
use crate::segment::DocId;
use crate::Result;

/// Query execution result
#[derive(Debug)]
pub struct QueryResult {
    /// Best matches, highest score first, ties by ascending DocId
    pub hits: Vec<ScoredResult>,
    /// Total number of matching documents
    pub total_hits: u64,
    pub stats: QueryStats,
}

/// Heap key: higher score wins, then the lower DocId
type RankKey = (OrderedFloat<f32>, Reverse<u32>);

pub struct QueryExecutor;

impl QueryExecutor {
    /// Execute a query and return its `top_k` best matches
    pub fn execute(query: &dyn QueryNode, ctx: &QueryContext, top_k: usize) -> Result<QueryResult> {
        let start = Instant::now();

        let matches = query.execute(ctx)?;
        let total_hits = matches.len();

        let scorer = Scorer::new(ctx, query.scoring_terms(ctx)?);
        let ranked = Self::collect_top_k(&scorer, &matches, top_k);

        let hits = ranked
            .into_iter()
            .map(|(score, doc_id)| {
                let value = ctx.index().stored(doc_id).ok_or_else(|| {
                    LexisError::Internal(format!("{} matched but has no stored value", doc_id))
                })?;
                Ok(ScoredResult::new(doc_id, value, score))
            })
            .collect::<Result<Vec<_>>>()?;

        let stats = QueryStats {
            docs_matched: total_hits,
            terms_scored: scorer.term_count() as u64,
            expansion_cache_hits: ctx.cache_hits(),
            expansion_cache_misses: ctx.cache_misses(),
            execution_time_us: start.elapsed().as_micros() as u64,
        };

        debug!(
            query_type = query.query_type(),
            total_hits,
            returned = hits.len(),
            elapsed_us = stats.execution_time_us,
            "query executed"
        );

        Ok(QueryResult {
            hits,
            total_hits,
            stats,
        })
    }

    /// Best `top_k` documents by score, in rank order
    fn collect_top_k(scorer: &Scorer, matches: &RoaringBitmap, top_k: usize) -> Vec<(f32, DocId)> {
        if top_k == 0 || matches.is_empty() {
            return Vec::new();
        }

        // Min-heap on the rank key: the root is the weakest hit kept so far
        let mut heap: BinaryHeap<Reverse<RankKey>> = BinaryHeap::with_capacity(top_k + 1);

        for doc in matches.iter() {
            let key = (OrderedFloat(scorer.score(DocId(doc))), Reverse(doc));

            if heap.len() < top_k {
                heap.push(Reverse(key));
            } else if let Some(Reverse(weakest)) = heap.peek() {
                if key > *weakest {
                    heap.pop();
                    heap.push(Reverse(key));
                }
            }
        }

        // Ascending Reverse(key) is descending key
        heap.into_sorted_vec()
            .into_iter()
            .map(|Reverse((OrderedFloat(score), Reverse(doc)))| (score, DocId(doc)))
            .collect()
    }
}
