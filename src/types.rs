//! Option records consumed by the query engine and the result records it
//! produces. Result lists preserve the caller's query ordering via
//! `query_num` rather than completion order.

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// How suffix comparisons were bounded at build time.
///
/// `Full` compares suffixes to completion; `MaxQueryLen(n)` compares only
/// the first `n` symbols, which is sufficient when queries never exceed `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortType {
    Full,
    MaxQueryLen(usize),
}

impl SortType {
    /// Bound on suffix comparisons, if any
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Full => None,
            Self::MaxQueryLen(n) => Some(*n),
        }
    }

    /// Wire encoding: zero means a full sort
    pub(crate) fn to_u64(self) -> u64 {
        match self {
            Self::Full => 0,
            Self::MaxQueryLen(n) => n as u64,
        }
    }

    pub(crate) fn from_u64(val: u64) -> Self {
        if val == 0 {
            Self::Full
        } else {
            Self::MaxQueryLen(val as usize)
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "Full"),
            Self::MaxQueryLen(n) => write!(f, "MaxQueryLen({n})"),
        }
    }
}

/// Everything needed to build and persist an index.
///
/// `text`, `sequence_starts`, and `sequence_names` are the triple produced
/// by the sequence-file collaborator.
#[derive(Debug, Clone)]
pub struct BuildArgs {
    /// Raw concatenated text, not yet encoded
    pub text: Vec<u8>,
    /// Destination for the persisted index
    pub path: PathBuf,
    /// Global offset of each input sequence, strictly increasing
    pub sequence_starts: Vec<usize>,
    /// Name of each input sequence, parallel to `sequence_starts`
    pub sequence_names: Vec<String>,
    /// Read the persisted index back in low-memory mode
    pub low_memory: bool,
    /// Bound suffix comparisons to this many symbols
    pub max_query_len: Option<usize>,
    pub is_dna: bool,
    pub allow_ambiguity: bool,
    pub ignore_softmask: bool,
    pub num_partitions: usize,
    /// Optional 1/0 pattern selecting partition-key positions
    pub seed_mask: Option<String>,
    /// Seeds pivot sampling; equal seeds give byte-identical files
    pub random_seed: u64,
    /// Raw input byte separating logical sequences
    pub sequence_delimiter: u8,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            text: vec![],
            path: PathBuf::new(),
            sequence_starts: vec![0],
            sequence_names: vec!["1".to_string()],
            low_memory: false,
            max_query_len: None,
            is_dna: true,
            allow_ambiguity: false,
            ignore_softmask: false,
            num_partitions: 1,
            seed_mask: None,
            random_seed: 42,
            sequence_delimiter: b'%',
        }
    }
}

/// Header record embedded in the persisted file, read back verbatim on load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub filename: String,
    pub modified: SystemTime,
    pub file_size: u64,
    pub file_version: u8,
    pub is_dna: bool,
    pub allow_ambiguity: bool,
    pub ignore_softmask: bool,
    pub text_len: usize,
    pub len_suffixes: usize,
    pub num_sequences: usize,
    pub sequence_starts: Vec<usize>,
    pub sequence_names: Vec<String>,
    pub sort_type: SortType,
}

/// Options for `count`
#[derive(Debug, Clone)]
pub struct CountOptions {
    pub queries: Vec<String>,
    pub max_query_len: Option<usize>,
}

/// Options for `locate`
#[derive(Debug, Clone)]
pub struct LocateOptions {
    pub queries: Vec<String>,
    pub max_query_len: Option<usize>,
}

/// Options for `extract`
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub queries: Vec<String>,
    pub max_query_len: Option<usize>,
    /// Context to include before each match, clamped to the sequence start
    pub prefix_len: Option<usize>,
    /// Context to include after each match; absent means to the sequence end
    pub suffix_len: Option<usize>,
}

/// Options for the diagnostic `list` dump
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Ranks to show; empty means all
    pub ranks: Vec<usize>,
    pub show_rank: bool,
    pub show_suffix: bool,
    pub show_lcp: bool,
    /// Truncate suffix text to this many characters
    pub len: Option<usize>,
    /// Cap on the number of lines
    pub number: Option<usize>,
    /// Output file; absent means stdout
    pub output: Option<PathBuf>,
}

/// Number of times a query was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountResult {
    /// The ordinal position of the original query
    pub query_num: usize,
    pub query: String,
    pub count: usize,
}

/// Inclusive rank range of all suffixes matching a query prefix.
///
/// When nothing matches, `count` is zero and both bounds hold the rank at
/// which the query would insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BisectResult {
    pub query_num: usize,
    pub query: String,
    pub count: usize,
    pub first_position: usize,
    pub last_position: usize,
}

/// One occurrence of a query, mapped into its owning sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Global text offset of the match
    pub suffix: usize,
    /// Position of the match in the suffix array
    pub rank: usize,
    pub sequence_name: String,
    /// Offset of the match within the named sequence
    pub sequence_position: usize,
}

/// All occurrences of one query, ordered by ascending rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateResult {
    pub query_num: usize,
    pub query: String,
    pub positions: Vec<Position>,
}

/// One occurrence of a query with its surrounding context window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSequence {
    /// Global text offset of the match
    pub suffix: usize,
    /// Position of the match in the suffix array
    pub rank: usize,
    pub sequence_name: String,
    /// Global offset where the owning sequence begins
    pub sequence_start: usize,
    /// Context window within the owning sequence
    pub sequence_range: (usize, usize),
    /// Offset of the match start relative to the window start
    pub suffix_offset: usize,
}

/// All occurrences of one query with context, ordered by ascending rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractResult {
    pub query_num: usize,
    pub query: String,
    pub sequences: Vec<ExtractedSequence>,
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_sort_type_wire_encoding() {
        assert_eq!(SortType::Full.to_u64(), 0);
        assert_eq!(SortType::MaxQueryLen(12).to_u64(), 12);
        assert_eq!(SortType::from_u64(0), SortType::Full);
        assert_eq!(SortType::from_u64(12), SortType::MaxQueryLen(12));
    }

    #[test]
    fn test_sort_type_display() {
        assert_eq!(SortType::Full.to_string(), "Full");
        assert_eq!(SortType::MaxQueryLen(3).to_string(), "MaxQueryLen(3)");
    }
}
