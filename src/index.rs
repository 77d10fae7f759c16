//! The query engine over a persisted suffix-array index.
//!
//! All query primitives compose one range-search capability: `bisect`
//! narrows the suffix array to the inclusive rank range of suffixes
//! prefixed by the query, optionally restricted to a previous result's
//! range when the caller extends an already-matched prefix. `count`,
//! `locate`, and `extract` are built on top of it.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::builder::SuffixBuilder;
use crate::collection::sequence_of;
use crate::error::{QueryError, Result};
use crate::header::IndexHeader;
use crate::store::{self, StoredIndex, TextAccess, U64Access};
use crate::types::{
    BisectResult, BuildArgs, CountOptions, CountResult, ExtractOptions,
    ExtractResult, ExtractedSequence, ListOptions, LocateOptions, LocateResult,
    Metadata, Position, SortType,
};

/// An immutable suffix-array index loaded from disk.
///
/// Construction goes through [`SuffixArrayIndex::write`], which builds and
/// persists the index; [`SuffixArrayIndex::read`] loads a persisted file in
/// either access mode. Queries never mutate the index, so a loaded index is
/// freely shared across threads.
#[derive(Debug)]
pub struct SuffixArrayIndex {
    path: PathBuf,
    header: IndexHeader,
    starts: Vec<u64>,
    names: Vec<String>,
    order: U64Access,
    lcp: U64Access,
    text: TextAccess,
    file_size: u64,
    modified: SystemTime,
}

impl SuffixArrayIndex {
    /// Builds an index from the raw inputs and persists it at
    /// `args.path`. Returns the path of the written file.
    pub fn write(args: &BuildArgs) -> Result<PathBuf> {
        let builder = SuffixBuilder::build(args)?;
        store::write(&builder, &args.path)?;
        Ok(args.path.clone())
    }

    /// Loads a persisted index.
    ///
    /// `low_memory` selects the access strategy: fully materialized arrays,
    /// or pages served on demand from a memory map. Query results are
    /// identical in both modes.
    pub fn read<P: AsRef<Path>>(path: P, low_memory: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let StoredIndex {
            header,
            starts,
            names,
            order,
            lcp,
            text,
            file_size,
            modified,
        } = store::read(&path, low_memory)?;
        Ok(Self {
            path,
            header,
            starts,
            names,
            order,
            lcp,
            text,
            file_size,
            modified,
        })
    }

    /// The header record embedded in the file, plus filesystem facts
    pub fn metadata(&self) -> Metadata {
        Metadata {
            filename: self.path.display().to_string(),
            modified: self.modified,
            file_size: self.file_size,
            file_version: self.header.version,
            is_dna: self.header.is_dna,
            allow_ambiguity: self.header.allow_ambiguity,
            ignore_softmask: self.header.ignore_softmask,
            text_len: self.header.text_len as usize,
            len_suffixes: self.header.num_suffixes as usize,
            num_sequences: self.header.num_sequences as usize,
            sequence_starts: self.starts.iter().map(|&s| s as usize).collect(),
            sequence_names: self.names.clone(),
            sort_type: SortType::from_u64(self.header.max_query_len),
        }
    }

    pub fn num_suffixes(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn text(&self) -> &[u8] {
        self.text.as_slice()
    }

    pub(crate) fn order(&self) -> &[u64] {
        self.order.as_slice()
    }

    pub(crate) fn lcp(&self) -> &[u64] {
        self.lcp.as_slice()
    }

    /// Binary search for the inclusive rank range of suffixes prefixed by
    /// `query`.
    ///
    /// When nothing matches, `count` is zero and both bounds hold the rank
    /// at which the query would insert. A `prefix_result` from an earlier
    /// bisect whose query is a prefix of this one restricts the search to
    /// that range, so extending a match costs time proportional to the
    /// narrowed range; the caller is responsible for the prefix
    /// relationship.
    pub fn bisect(
        &self,
        query_num: usize,
        query: &str,
        max_query_len: Option<usize>,
        prefix_result: Option<&BisectResult>,
    ) -> Result<BisectResult> {
        if query.is_empty() {
            return Err(QueryError::EmptyQuery(query_num).into());
        }
        let limit = self.comparison_limit(max_query_len);
        let bounds = match prefix_result {
            Some(prev) if prev.count > 0 => {
                (prev.first_position, prev.last_position + 1)
            }
            Some(prev) => (prev.first_position, prev.first_position),
            None => (0, self.num_suffixes()),
        };
        let (first, last) = self.bisect_range(query.as_bytes(), limit, bounds);
        let count = last - first;
        Ok(BisectResult {
            query_num,
            query: query.to_string(),
            count,
            first_position: first,
            last_position: if count > 0 { last - 1 } else { first },
        })
    }

    /// Runs bisect per query, preserving the caller's query order
    pub fn count(&self, args: &CountOptions) -> Result<Vec<CountResult>> {
        args.queries
            .iter()
            .enumerate()
            .map(|(query_num, query)| {
                let res = self.bisect(query_num, query, args.max_query_len, None)?;
                Ok(CountResult {
                    query_num,
                    query: query.clone(),
                    count: res.count,
                })
            })
            .collect()
    }

    /// Bisects each query and maps every matching rank to its owning
    /// sequence. Positions are ordered by ascending rank.
    pub fn locate(&self, args: &LocateOptions) -> Result<Vec<LocateResult>> {
        args.queries
            .iter()
            .enumerate()
            .map(|(query_num, query)| {
                let res = self.bisect(query_num, query, args.max_query_len, None)?;
                let positions = self
                    .matching_ranks(&res)
                    .map(|rank| {
                        let suffix = self.order()[rank] as usize;
                        let seq = sequence_of(&self.starts, suffix as u64);
                        Position {
                            suffix,
                            rank,
                            sequence_name: self.names[seq].clone(),
                            sequence_position: suffix - self.starts[seq] as usize,
                        }
                    })
                    .collect();
                Ok(LocateResult {
                    query_num,
                    query: query.clone(),
                    positions,
                })
            })
            .collect()
    }

    /// Like locate, but each match carries a context window within its
    /// owning sequence. Zero-match queries yield empty lists, not errors.
    pub fn extract(&self, args: &ExtractOptions) -> Result<Vec<ExtractResult>> {
        let prefix_len = args.prefix_len.unwrap_or(0);
        args.queries
            .iter()
            .enumerate()
            .map(|(query_num, query)| {
                let res = self.bisect(query_num, query, args.max_query_len, None)?;
                let sequences = self
                    .matching_ranks(&res)
                    .map(|rank| {
                        let suffix = self.order()[rank] as usize;
                        let seq = sequence_of(&self.starts, suffix as u64);
                        let seq_start = self.starts[seq] as usize;
                        let seq_end = self
                            .starts
                            .get(seq + 1)
                            .map_or(self.header.text_len as usize, |&s| s as usize);

                        let window_start =
                            seq_start.max(suffix.saturating_sub(prefix_len));
                        let window_end = args.suffix_len.map_or(seq_end, |n| {
                            seq_end.min(suffix + query.len() + n)
                        });

                        ExtractedSequence {
                            suffix,
                            rank,
                            sequence_name: self.names[seq].clone(),
                            sequence_start: seq_start,
                            sequence_range: (
                                window_start - seq_start,
                                window_end - seq_start,
                            ),
                            suffix_offset: suffix - window_start,
                        }
                    })
                    .collect();
                Ok(ExtractResult {
                    query_num,
                    query: query.clone(),
                    sequences,
                })
            })
            .collect()
    }

    /// Writes the diagnostic suffix-array dump
    pub fn list(&self, args: &ListOptions) -> Result<()> {
        crate::list::list(self, args)
    }

    /// Decoded substring of the stored text starting at a global offset,
    /// bounded by `len` or the end of the text
    pub fn string_at(&self, pos: usize, len: Option<usize>) -> Result<String> {
        let text = self.text();
        if pos >= text.len() {
            return Err(QueryError::OffsetOutOfRange(pos, text.len()).into());
        }
        let end = len.map_or(text.len(), |n| text.len().min(pos + n));
        Ok(std::str::from_utf8(&text[pos..end])?.to_string())
    }

    /// Ranks covered by a bisect result, empty when nothing matched
    fn matching_ranks(&self, res: &BisectResult) -> std::ops::Range<usize> {
        if res.count > 0 {
            res.first_position..res.last_position + 1
        } else {
            res.first_position..res.first_position
        }
    }

    /// Per-call bound combined with the bound baked in at build time
    fn comparison_limit(&self, max_query_len: Option<usize>) -> usize {
        let built = match SortType::from_u64(self.header.max_query_len) {
            SortType::Full => usize::MAX,
            SortType::MaxQueryLen(n) => n,
        };
        max_query_len.unwrap_or(usize::MAX).min(built)
    }

    /// Half-open rank range of suffixes prefixed by `query` within
    /// `bounds`; both ends equal the insertion point when nothing matches.
    fn bisect_range(
        &self,
        query: &[u8],
        limit: usize,
        bounds: (usize, usize),
    ) -> (usize, usize) {
        let window = &self.order()[bounds.0..bounds.1];
        let first = bounds.0
            + window.partition_point(|&s| {
                self.compare(s as usize, query, limit) == Ordering::Less
            });
        let last = bounds.0
            + window.partition_point(|&s| {
                self.compare(s as usize, query, limit) != Ordering::Greater
            });
        (first, last)
    }

    /// Orders the suffix at `offset` against the query, where `Equal`
    /// means the (bounded) query is a prefix of the suffix
    fn compare(&self, offset: usize, query: &[u8], limit: usize) -> Ordering {
        let text = self.text();
        let query = &query[..query.len().min(limit)];
        let suffix = &text[offset..];
        for (i, &qc) in query.iter().enumerate() {
            match suffix.get(i) {
                // Suffix exhausted at the end of the text
                None => return Ordering::Less,
                Some(&sc) if sc != qc => return sc.cmp(&qc),
                Some(_) => {}
            }
        }
        Ordering::Equal
    }
}
