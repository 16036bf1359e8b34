use super::types::DocId;

/// Stored original text of every document, addressed by DocId
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentStore {
    documents: Vec<String>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: Vec<String>) -> Self {
        Self { documents }
    }

    /// Append a document, returning its id
    ///
    /// Returns `None` once the id space is exhausted.
    pub fn push(&mut self, text: String) -> Option<DocId> {
        let doc_id = DocId::from_usize(self.documents.len())?;
        self.documents.push(text);
        Some(doc_id)
    }

    pub fn get(&self, doc_id: DocId) -> Option<&str> {
        self.documents.get(doc_id.as_usize()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in DocId order
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &str)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, text)| (DocId(i as u32), text.as_str()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut store = DocumentStore::new();
        assert_eq!(store.push("Muscle pain".to_string()), Some(DocId(0)));
        assert_eq!(store.push("Epidemic".to_string()), Some(DocId(1)));

        assert_eq!(store.get(DocId(0)), Some("Muscle pain"));
        assert_eq!(store.get(DocId(2)), None);
        assert_eq!(store.len(), 2);

        let ids: Vec<_> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![DocId(0), DocId(1)]);
    }
}
