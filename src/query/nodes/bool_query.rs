//! Boolean query - combines clauses with must/should/must_not
//!
//! - `must`: all must match (intersection)
//! - `should`: at least one must match when there is no `must` clause,
//!   otherwise they only add to the score
//! - `must_not`: excluded (difference)
//!
//! A query with only `must_not` clauses matches nothing: exclusion needs
//! a positive set to subtract from.

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::WeightedTerm;
use crate::Result;
use roaring::RoaringBitmap;

#[derive(Clone, Debug)]
pub struct BoolQuery {
    pub must: Vec<Box<dyn QueryNode>>,
    pub should: Vec<Box<dyn QueryNode>>,
    pub must_not: Vec<Box<dyn QueryNode>>,
    pub boost: f32,
}

impl Default for BoolQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl BoolQuery {
    pub fn new() -> Self {
        Self {
            must: Vec::new(),
            should: Vec::new(),
            must_not: Vec::new(),
            boost: 1.0,
        }
    }

    pub fn must(mut self, query: impl QueryNode + 'static) -> Self {
        self.must.push(Box::new(query));
        self
    }

    pub fn should(mut self, query: impl QueryNode + 'static) -> Self {
        self.should.push(Box::new(query));
        self
    }

    pub fn must_not(mut self, query: impl QueryNode + 'static) -> Self {
        self.must_not.push(Box::new(query));
        self
    }

    pub fn must_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.must.push(query);
        self
    }

    pub fn should_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.should.push(query);
        self
    }

    pub fn must_not_boxed(mut self, query: Box<dyn QueryNode>) -> Self {
        self.must_not.push(query);
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    pub fn clause_count(&self) -> usize {
        self.must.len() + self.should.len() + self.must_not.len()
    }

    /// Must clauses ordered cheapest first
    fn ordered_must<'q>(&'q self, ctx: &QueryContext) -> Vec<&'q dyn QueryNode> {
        let mut clauses: Vec<(f64, &dyn QueryNode)> = self
            .must
            .iter()
            .map(|q| (q.estimate_cost(ctx), q.as_ref()))
            .collect();
        clauses.sort_by(|a, b| a.0.total_cmp(&b.0));
        clauses.into_iter().map(|(_, q)| q).collect()
    }
}

impl QueryNode for BoolQuery {
    fn execute(&self, ctx: &QueryContext) -> Result<RoaringBitmap> {
        let mut result: Option<RoaringBitmap> = None;

        for query in self.ordered_must(ctx) {
            let matches = query.execute(ctx)?;
            let narrowed = match result {
                Some(r) => r & matches,
                None => matches,
            };
            // Early exit if intersection is empty
            if narrowed.is_empty() {
                return Ok(narrowed);
            }
            result = Some(narrowed);
        }

        if result.is_none() && !self.should.is_empty() {
            let mut should_matches = RoaringBitmap::new();
            for query in &self.should {
                should_matches |= query.execute(ctx)?;
            }
            result = Some(should_matches);
        }

        let Some(mut result) = result else {
            return Ok(RoaringBitmap::new());
        };

        for query in &self.must_not {
            if result.is_empty() {
                break;
            }
            result -= query.execute(ctx)?;
        }

        Ok(result)
    }

    fn scoring_terms(&self, ctx: &QueryContext) -> Result<Vec<WeightedTerm>> {
        let mut terms = Vec::new();
        for query in self.must.iter().chain(self.should.iter()) {
            for mut term in query.scoring_terms(ctx)? {
                term.boost *= self.boost;
                terms.push(term);
            }
        }
        Ok(terms)
    }

    fn estimate_cost(&self, ctx: &QueryContext) -> f64 {
        let must_cost = self
            .must
            .iter()
            .map(|q| q.estimate_cost(ctx))
            .fold(f64::MAX, f64::min);

        let should_cost: f64 = self.should.iter().map(|q| q.estimate_cost(ctx)).sum();

        let must_not_cost: f64 = self.must_not.iter().map(|q| q.estimate_cost(ctx)).sum();

        let base_cost = if must_cost < f64::MAX {
            must_cost
        } else {
            should_cost
        };

        base_cost + should_cost * 0.1 + must_not_cost * 0.1
    }

    fn query_type(&self) -> &'static str {
        "bool"
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn clone_box(&self) -> Box<dyn QueryNode> {
        Box::new(self.clone())
    }
}
