//! Sequence collection: the concatenated encoded text plus the boundary
//! table mapping global offsets to named sequences.

use crate::alphabet::{Alphabet, TERMINAL_SENTINEL};
use crate::error::{EncodingError, Result};

/// The concatenated encoded text with its per-sequence boundary table.
///
/// The text is immutable after construction and always ends with the
/// terminal sentinel. A global offset belongs to sequence `i` such that
/// `starts[i] <= offset < starts[i + 1]` (end of text for the last).
#[derive(Debug)]
pub struct SequenceCollection {
    text: Vec<u8>,
    starts: Vec<u64>,
    names: Vec<String>,
}

impl SequenceCollection {
    /// Encodes the raw text and appends the terminal sentinel.
    ///
    /// `starts` and `names` come from the sequence-file collaborator and
    /// must be parallel, with `starts` strictly increasing within the text.
    pub fn new(
        raw: &[u8],
        starts: Vec<usize>,
        names: Vec<String>,
        alphabet: &Alphabet,
    ) -> Result<Self> {
        if starts.len() != names.len() {
            return Err(EncodingError::UnevenSequenceNames {
                starts: starts.len(),
                names: names.len(),
            }
            .into());
        }
        for (i, window) in starts.windows(2).enumerate() {
            if window[0] >= window[1] {
                return Err(EncodingError::InvalidSequenceStart(window[1], i + 1).into());
            }
        }
        if let Some(&last) = starts.last() {
            if last >= raw.len() {
                return Err(
                    EncodingError::InvalidSequenceStart(last, starts.len() - 1).into()
                );
            }
        }

        let mut text = alphabet.encode(raw)?;
        text.push(TERMINAL_SENTINEL);

        Ok(Self {
            text,
            starts: starts.into_iter().map(|s| s as u64).collect(),
            names,
        })
    }

    /// The encoded text, terminal sentinel included
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_sequences(&self) -> usize {
        self.starts.len()
    }

    /// Maps a global offset to the index of its owning sequence
    pub fn sequence_of(&self, offset: u64) -> usize {
        sequence_of(&self.starts, offset)
    }

    /// Global `[start, end)` range of sequence `i`
    pub fn sequence_range(&self, i: usize) -> (usize, usize) {
        let start = self.starts[i] as usize;
        let end = self
            .starts
            .get(i + 1)
            .map_or(self.text.len(), |&s| s as usize);
        (start, end)
    }
}

/// Binary search over the boundary table for the sequence owning `offset`
pub(crate) fn sequence_of(starts: &[u64], offset: u64) -> usize {
    starts.partition_point(|&start| start <= offset).saturating_sub(1)
}

#[cfg(test)]
mod testing {
    use super::*;
    use anyhow::Result;

    fn dna() -> Alphabet {
        Alphabet::new(true, false, false, b'%')
    }

    #[test]
    fn test_appends_terminal_sentinel() -> Result<()> {
        let coll =
            SequenceCollection::new(b"ACGT", vec![0], vec!["1".to_string()], &dna())?;
        assert_eq!(coll.text(), b"ACGT$");
        assert_eq!(coll.len(), 5);
        Ok(())
    }

    #[test]
    fn test_sequence_of() -> Result<()> {
        // Two sequences: [0, 5) and [5, 10)
        let coll = SequenceCollection::new(
            b"ACGT|TTAA",
            vec![0, 5],
            vec!["1".to_string(), "2".to_string()],
            &Alphabet::new(true, false, false, b'|'),
        )?;
        assert_eq!(coll.sequence_of(0), 0);
        assert_eq!(coll.sequence_of(4), 0);
        assert_eq!(coll.sequence_of(5), 1);
        assert_eq!(coll.sequence_of(9), 1);
        assert_eq!(coll.sequence_range(0), (0, 5));
        // The last sequence runs to the end of the text, sentinel included
        assert_eq!(coll.sequence_range(1), (5, 10));
        Ok(())
    }

    #[test]
    fn test_rejects_unsorted_starts() {
        let res = SequenceCollection::new(
            b"ACGTACGT",
            vec![4, 4],
            vec!["1".to_string(), "2".to_string()],
            &dna(),
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_rejects_start_past_text() {
        let res =
            SequenceCollection::new(b"ACGT", vec![9], vec!["1".to_string()], &dna());
        assert!(res.is_err());
    }

    #[test]
    fn test_rejects_uneven_names() {
        let res = SequenceCollection::new(b"ACGT", vec![0], vec![], &dna());
        assert!(res.is_err());
    }
}
