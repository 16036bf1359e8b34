//! Posting lists and their compact on-disk encoding
//!
//! In memory a posting list is a `Vec<Posting>` sorted by document. On disk
//! each list is written as a vbyte stream:
//! - posting count
//! - per posting: docid delta, term frequency, position deltas

use std::io;

use roaring::RoaringBitmap;

use super::types::{DocId, Posting, TermStats};

/// Variable-byte encoding for integers
pub fn encode_vbyte(value: u32, output: &mut Vec<u8>) {
    let mut v = value;
    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            output.push(byte | 0x80); // high bit marks the last byte
            break;
        } else {
            output.push(byte);
        }
    }
}

/// Decode a variable-byte encoded integer
pub fn decode_vbyte(input: &[u8], pos: &mut usize) -> io::Result<u32> {
    let mut result: u32 = 0;
    let mut shift = 0;

    loop {
        let byte = *input.get(*pos).ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "Unexpected end of vbyte")
        })?;
        *pos += 1;

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 != 0 {
            return Ok(result);
        }

        shift += 7;
        if shift > 28 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "VByte value too large",
            ));
        }
    }
}

/// All postings of one term, ascending by document
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a posting; documents must arrive in ascending order
    pub fn push(&mut self, posting: Posting) -> io::Result<()> {
        if let Some(last) = self.postings.last() {
            if posting.doc_id <= last.doc_id {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "posting for {} out of order after {}",
                        posting.doc_id, last.doc_id
                    ),
                ));
            }
        }
        self.postings.push(posting);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Number of documents containing the term
    pub fn doc_frequency(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn stats(&self) -> TermStats {
        TermStats {
            doc_frequency: self.doc_frequency(),
            total_term_frequency: self
                .postings
                .iter()
                .map(|p| p.term_frequency as u64)
                .sum(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Posting> {
        self.postings.iter()
    }

    /// Look up the posting for a document
    pub fn get(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|idx| &self.postings[idx])
    }

    /// Term frequency in `doc_id`, 0 when the document lacks the term
    pub fn term_frequency(&self, doc_id: DocId) -> u32 {
        self.get(doc_id).map(|p| p.term_frequency).unwrap_or(0)
    }

    /// Document set as a bitmap
    pub fn doc_bitmap(&self) -> RoaringBitmap {
        let mut bitmap = RoaringBitmap::new();
        for posting in &self.postings {
            bitmap.insert(posting.doc_id.as_u32());
        }
        bitmap
    }

    /// Encode into a compact byte stream
    pub fn encode(&self, output: &mut Vec<u8>) {
        encode_vbyte(self.postings.len() as u32, output);

        let mut prev_doc = 0u32;
        for posting in &self.postings {
            encode_vbyte(posting.doc_id.as_u32() - prev_doc, output);
            prev_doc = posting.doc_id.as_u32();

            encode_vbyte(posting.term_frequency, output);
            encode_vbyte(posting.positions.len() as u32, output);

            let mut prev_pos = 0u32;
            for &pos in &posting.positions {
                encode_vbyte(pos - prev_pos, output);
                prev_pos = pos;
            }
        }
    }

    /// Decode a list written by [`PostingList::encode`]
    pub fn decode(input: &[u8], pos: &mut usize) -> io::Result<Self> {
        let count = decode_vbyte(input, pos)? as usize;
        // Each posting takes at least three bytes
        if count > input.len().saturating_sub(*pos) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "posting count exceeds available data",
            ));
        }

        let mut list = PostingList {
            postings: Vec::with_capacity(count),
        };
        let mut prev_doc: Option<u32> = None;

        for _ in 0..count {
            let delta = decode_vbyte(input, pos)?;
            let doc = match prev_doc {
                None => delta,
                Some(prev) => {
                    if delta == 0 {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "duplicate document in posting list",
                        ));
                    }
                    prev.checked_add(delta).ok_or_else(|| {
                        io::Error::new(io::ErrorKind::InvalidData, "docid overflow")
                    })?
                }
            };
            prev_doc = Some(doc);

            let term_frequency = decode_vbyte(input, pos)?;
            let position_count = decode_vbyte(input, pos)? as usize;
            if position_count > input.len().saturating_sub(*pos) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "position count exceeds available data",
                ));
            }

            let mut positions = Vec::with_capacity(position_count);
            let mut prev_pos = 0u32;
            for _ in 0..position_count {
                let p = prev_pos
                    .checked_add(decode_vbyte(input, pos)?)
                    .ok_or_else(|| {
                        io::Error::new(io::ErrorKind::InvalidData, "position overflow")
                    })?;
                positions.push(p);
                prev_pos = p;
            }

            list.postings.push(Posting {
                doc_id: DocId(doc),
                term_frequency,
                positions,
            });
        }

        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vbyte_encoding() {
        let test_values = [0, 1, 127, 128, 255, 256, 16383, 16384, u32::MAX >> 4];

        for &value in &test_values {
            let mut buf = Vec::new();
            encode_vbyte(value, &mut buf);

            let mut pos = 0;
            let decoded = decode_vbyte(&buf, &mut pos).unwrap();
            assert_eq!(value, decoded, "Failed for value {}", value);
            assert_eq!(pos, buf.len());
        }
    }

    #[test]
    fn test_vbyte_truncated() {
        let mut pos = 0;
        assert!(decode_vbyte(&[0x01], &mut pos).is_err());
    }

    #[test]
    fn test_push_rejects_out_of_order() {
        let mut list = PostingList::new();
        list.push(Posting::new(DocId(2), 1)).unwrap();
        assert!(list.push(Posting::new(DocId(2), 1)).is_err());
        assert!(list.push(Posting::new(DocId(1), 1)).is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_lookup_and_bitmap() {
        let mut list = PostingList::new();
        list.push(Posting::with_positions(DocId(0), vec![0])).unwrap();
        list.push(Posting::with_positions(DocId(5), vec![1, 3])).unwrap();
        list.push(Posting::with_positions(DocId(9), vec![2])).unwrap();

        assert_eq!(list.term_frequency(DocId(5)), 2);
        assert_eq!(list.term_frequency(DocId(4)), 0);
        assert_eq!(list.doc_bitmap().iter().collect::<Vec<_>>(), vec![0, 5, 9]);

        let stats = list.stats();
        assert_eq!(stats.doc_frequency, 3);
        assert_eq!(stats.total_term_frequency, 4);
    }

    #[test]
    fn test_encode_decode_with_positions() {
        let mut list = PostingList::new();
        list.push(Posting::with_positions(DocId(3), vec![0, 7, 200])).unwrap();
        list.push(Posting::with_positions(DocId(1000), vec![4])).unwrap();

        let mut buf = Vec::new();
        list.encode(&mut buf);

        let mut pos = 0;
        let decoded = PostingList::decode(&buf, &mut pos).unwrap();
        assert_eq!(decoded, list);
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        // count says 50 postings but only a few bytes follow
        let mut buf = Vec::new();
        encode_vbyte(50, &mut buf);
        buf.extend_from_slice(&[0x81, 0x81]);

        let mut pos = 0;
        assert!(PostingList::decode(&buf, &mut pos).is_err());
    }
}
