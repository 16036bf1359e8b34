//! Term dictionary using FST (Finite State Transducer)
//!
//! The FST maps each term to its ordinal, an index into the parallel
//! posting list array held by the index. Lookups are O(|key|) and prefix
//! enumeration walks only the matching subtree, in sorted order.

use std::io;

use fst::automaton::Str;
use fst::{Automaton, IntoStreamer, Map, MapBuilder, Streamer};

/// Term dictionary backed by FST
pub struct TermDictionary {
    fst: Map<Vec<u8>>,
}

impl TermDictionary {
    /// Create a term dictionary from serialized FST bytes
    pub fn new(fst_data: Vec<u8>) -> io::Result<Self> {
        let fst = Map::new(fst_data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self { fst })
    }

    /// An empty dictionary
    pub fn empty() -> io::Result<Self> {
        TermDictionaryBuilder::new().build()
    }

    /// Look up a term and return its ordinal
    pub fn get(&self, term: &str) -> Option<usize> {
        self.fst.get(term.as_bytes()).map(|ord| ord as usize)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.fst.contains_key(term.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.fst.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fst.is_empty()
    }

    /// All terms starting with `prefix`, in lexicographic order
    ///
    /// Stops after `limit` terms when one is given.
    pub fn prefix_search(&self, prefix: &str, limit: Option<usize>) -> Vec<(String, usize)> {
        let automaton = Str::new(prefix).starts_with();
        let mut stream = self.fst.search(automaton).into_stream();
        let mut results = Vec::new();
        while let Some((key, ord)) = stream.next() {
            if limit.is_some_and(|l| results.len() >= l) {
                break;
            }
            // Keys are inserted from &str, so this only skips on corruption
            if let Ok(term) = std::str::from_utf8(key) {
                results.push((term.to_string(), ord as usize));
            }
        }
        results
    }

    /// Iterate over all terms in the dictionary
    pub fn iter_terms(&self) -> Vec<(String, usize)> {
        let mut results = Vec::with_capacity(self.len());
        let mut stream = self.fst.stream();
        while let Some((key, ord)) = stream.next() {
            if let Ok(term) = std::str::from_utf8(key) {
                results.push((term.to_string(), ord as usize));
            }
        }
        results
    }

    /// The raw FST data (for serialization)
    pub fn fst_bytes(&self) -> &[u8] {
        self.fst.as_fst().as_bytes()
    }

    /// Largest ordinal stored, used to validate against the postings array
    pub fn max_ordinal(&self) -> Option<usize> {
        let mut stream = self.fst.stream();
        let mut max = None;
        while let Some((_, ord)) = stream.next() {
            max = max.max(Some(ord as usize));
        }
        max
    }
}

impl std::fmt::Debug for TermDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermDictionary")
            .field("terms", &self.len())
            .finish()
    }
}

/// Builder for term dictionaries
#[derive(Default)]
pub struct TermDictionaryBuilder {
    terms: Vec<(String, u64)>,
}

impl TermDictionaryBuilder {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            terms: Vec::with_capacity(capacity),
        }
    }

    /// Add a term with its ordinal
    pub fn add(&mut self, term: String, ordinal: usize) {
        self.terms.push((term, ordinal as u64));
    }

    /// Build the term dictionary
    pub fn build(mut self) -> io::Result<TermDictionary> {
        // FST requires sorted, unique input
        self.terms.sort_by(|a, b| a.0.cmp(&b.0));

        let mut fst_builder = MapBuilder::memory();
        for (term, ordinal) in &self.terms {
            fst_builder
                .insert(term.as_bytes(), *ordinal)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        }

        let fst_data = fst_builder
            .into_inner()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        TermDictionary::new(fst_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TermDictionary {
        let mut builder = TermDictionaryBuilder::new();
        for (ord, term) in ["ache", "cell", "epidemic", "miscle", "muscle", "pain", "schwann"]
            .iter()
            .enumerate()
        {
            builder.add(term.to_string(), ord);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_term_dictionary_builder() {
        let dict = sample();

        assert_eq!(dict.len(), 7);
        assert!(dict.contains("muscle"));
        assert!(!dict.contains("muscles"));
        assert_eq!(dict.get("ache"), Some(0));
        assert_eq!(dict.get("schwann"), Some(6));
        assert_eq!(dict.max_ordinal(), Some(6));
    }

    #[test]
    fn test_builder_sorts_input() {
        let mut builder = TermDictionaryBuilder::new();
        builder.add("zeta".to_string(), 0);
        builder.add("alpha".to_string(), 1);
        let dict = builder.build().unwrap();

        let terms: Vec<_> = dict.iter_terms().into_iter().map(|(t, _)| t).collect();
        assert_eq!(terms, vec!["alpha", "zeta"]);
        assert_eq!(dict.get("zeta"), Some(0));
    }

    #[test]
    fn test_duplicate_terms_rejected() {
        let mut builder = TermDictionaryBuilder::new();
        builder.add("same".to_string(), 0);
        builder.add("same".to_string(), 1);
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_prefix_search() {
        let dict = sample();

        let terms: Vec<_> = dict
            .prefix_search("m", None)
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(terms, vec!["miscle", "muscle"]);

        assert!(dict.prefix_search("x", None).is_empty());
        assert_eq!(dict.prefix_search("", None).len(), 7);
        assert_eq!(dict.prefix_search("", Some(2)).len(), 2);
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = TermDictionary::empty().unwrap();
        assert!(dict.is_empty());
        assert!(dict.get("anything").is_none());
        assert!(dict.prefix_search("a", None).is_empty());
        assert_eq!(dict.max_ordinal(), None);
    }

    #[test]
    fn test_from_fst_bytes() {
        let dict = sample();
        let copy = TermDictionary::new(dict.fst_bytes().to_vec()).unwrap();
        assert_eq!(copy.get("pain"), Some(5));

        assert!(TermDictionary::new(vec![1, 2, 3]).is_err());
    }
}
