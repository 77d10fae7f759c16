//! # sufidx
//!
//! A partitioned suffix-array index for concatenated sequence text.
//!
//! The crate builds a suffix array and LCP array over one immutable text
//! (typically concatenated genomic sequences), persists both in a compact
//! versioned binary format, and answers substring queries without
//! re-scanning the text:
//!
//! - `count`: how many times a query occurs
//! - `locate`: every occurrence, mapped into its named source sequence
//! - `extract`: occurrences with surrounding context windows
//! - `bisect`: the raw rank range, chainable to extend a matched prefix
//! - `list`: a diagnostic dump of the suffix array
//!
//! Construction buckets candidate suffixes into disjoint, order-respecting
//! partitions that are sorted independently (and in parallel), then
//! concatenated. A persisted index can be loaded fully into memory or
//! memory-mapped (`low_memory`), with identical query results.
//!
//! ```no_run
//! use sufidx::{BuildArgs, CountOptions, SuffixArrayIndex};
//!
//! # fn main() -> sufidx::Result<()> {
//! let path = SuffixArrayIndex::write(&BuildArgs {
//!     text: b"ACGTNNACGT".to_vec(),
//!     path: "genome.sidx".into(),
//!     ..BuildArgs::default()
//! })?;
//! let index = SuffixArrayIndex::read(&path, false)?;
//! let counts = index.count(&CountOptions {
//!     queries: vec!["ACG".to_string()],
//!     max_query_len: None,
//! })?;
//! assert_eq!(counts[0].count, 2);
//! # Ok(())
//! # }
//! ```

mod alphabet;
mod builder;
mod collection;
mod error;
mod header;
mod index;
mod list;
mod partition;
mod store;
mod types;

pub use alphabet::{Alphabet, SEQUENCE_SENTINEL, TERMINAL_SENTINEL};
pub use builder::SuffixBuilder;
pub use collection::SequenceCollection;
pub use error::{
    EncodingError, Error, FormatError, PartitionError, QueryError, Result,
};
pub use header::{IndexHeader, FORMAT, SIZE_HEADER};
pub use index::SuffixArrayIndex;
pub use partition::{Partition, Partitioner, SeedMask, KEY_WINDOW};
pub use types::{
    BisectResult, BuildArgs, CountOptions, CountResult, ExtractOptions,
    ExtractResult, ExtractedSequence, ListOptions, LocateOptions, LocateResult,
    Metadata, Position, SortType,
};

#[cfg(test)]
mod testing {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Build the small worked example ("ACGTNNACGT", one sequence "1",
    /// DNA, no ambiguity) and return the persisted path.
    fn example_index(dir: &TempDir, name: &str) -> Result<PathBuf> {
        let path = SuffixArrayIndex::write(&BuildArgs {
            text: b"ACGTNNACGT".to_vec(),
            path: dir.path().join(name),
            ..BuildArgs::default()
        })?;
        Ok(path)
    }

    #[test]
    fn test_write_then_metadata() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;

        let index = SuffixArrayIndex::read(&path, false)?;
        let meta = index.metadata();
        assert_eq!(meta.file_version, FORMAT);
        assert!(meta.is_dna);
        assert!(!meta.allow_ambiguity);
        assert!(!meta.ignore_softmask);
        assert_eq!(meta.text_len, 11);
        assert_eq!(meta.len_suffixes, 9);
        assert_eq!(meta.num_sequences, 1);
        assert_eq!(meta.sequence_starts, vec![0]);
        assert_eq!(meta.sequence_names, vec!["1".to_string()]);
        assert_eq!(meta.sort_type, SortType::Full);
        assert_eq!(meta.file_size, fs::metadata(&path)?.len());
        Ok(())
    }

    #[test]
    fn test_count() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;

        for low_memory in [false, true] {
            let index = SuffixArrayIndex::read(&path, low_memory)?;
            let res = index.count(&CountOptions {
                queries: vec!["AC".into(), "GG".into(), "CG".into()],
                max_query_len: None,
            })?;
            let got: Vec<_> = res
                .iter()
                .map(|r| (r.query_num, r.query.as_str(), r.count))
                .collect();
            assert_eq!(got, vec![(0, "AC", 2), (1, "GG", 0), (2, "CG", 2)]);
        }
        Ok(())
    }

    #[test]
    fn test_locate() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;

        for low_memory in [false, true] {
            let index = SuffixArrayIndex::read(&path, low_memory)?;
            let res = index.locate(&LocateOptions {
                queries: vec!["ACG".into(), "GGC".into()],
                max_query_len: None,
            })?;
            assert_eq!(res.len(), 2);
            let positions: Vec<_> = res[0]
                .positions
                .iter()
                .map(|p| {
                    (p.suffix, p.rank, p.sequence_name.as_str(), p.sequence_position)
                })
                .collect();
            assert_eq!(positions, vec![(6, 1, "1", 6), (0, 2, "1", 0)]);
            assert!(res[1].positions.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_extract() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;

        for low_memory in [false, true] {
            let index = SuffixArrayIndex::read(&path, low_memory)?;
            let res = index.extract(&ExtractOptions {
                queries: vec!["CGT".into(), "GG".into()],
                max_query_len: None,
                prefix_len: Some(1),
                suffix_len: None,
            })?;
            assert_eq!(res.len(), 2);
            let got: Vec<_> = res[0]
                .sequences
                .iter()
                .map(|s| {
                    (
                        s.suffix,
                        s.rank,
                        s.sequence_name.as_str(),
                        s.sequence_start,
                        s.sequence_range,
                        s.suffix_offset,
                    )
                })
                .collect();
            assert_eq!(
                got,
                vec![
                    (7, 3, "1", 0, (6, 11), 1),
                    (1, 4, "1", 0, (0, 11), 1),
                ]
            );
            assert!(res[1].sequences.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_bisect_and_chaining() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;
        let index = SuffixArrayIndex::read(&path, false)?;

        let ac = index.bisect(0, "AC", None, None)?;
        assert_eq!((ac.count, ac.first_position, ac.last_position), (2, 1, 2));

        // Extending a known prefix narrows within its range
        let direct = index.bisect(0, "ACG", None, None)?;
        let chained = index.bisect(0, "ACG", None, Some(&ac))?;
        assert_eq!(chained, direct);
        assert_eq!(
            (direct.count, direct.first_position, direct.last_position),
            (2, 1, 2)
        );

        // A miss reports the insertion point in both bounds
        let miss = index.bisect(0, "GG", None, None)?;
        assert_eq!((miss.count, miss.first_position, miss.last_position), (0, 5, 5));
        Ok(())
    }

    #[test]
    fn test_counts_agree_across_primitives() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;
        let index = SuffixArrayIndex::read(&path, false)?;

        for query in ["A", "AC", "ACG", "T", "GG", "NN", "ACGTNNACGT"] {
            let queries = vec![query.to_string()];
            let count = index.count(&CountOptions {
                queries: queries.clone(),
                max_query_len: None,
            })?[0]
                .count;
            let bisect = index.bisect(0, query, None, None)?;
            let located = index.locate(&LocateOptions {
                queries: queries.clone(),
                max_query_len: None,
            })?[0]
                .positions
                .len();
            let extracted = index.extract(&ExtractOptions {
                queries,
                max_query_len: None,
                prefix_len: None,
                suffix_len: None,
            })?[0]
                .sequences
                .len();
            assert_eq!(count, located, "query {query}");
            assert_eq!(count, extracted, "query {query}");
            if count > 0 {
                assert_eq!(
                    count,
                    bisect.last_position - bisect.first_position + 1
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_list_output() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;
        let out = dir.path().join("list.out");

        for low_memory in [false, true] {
            let index = SuffixArrayIndex::read(&path, low_memory)?;
            index.list(&ListOptions {
                show_rank: true,
                show_suffix: true,
                show_lcp: true,
                output: Some(out.clone()),
                ..ListOptions::default()
            })?;
            let expected = concat!(
                " 0 10  0 $\n",
                " 1  6  0 ACGT$\n",
                " 2  0  4 ACGTNNACGT$\n",
                " 3  7  0 CGT$\n",
                " 4  1  3 CGTNNACGT$\n",
                " 5  8  0 GT$\n",
                " 6  2  2 GTNNACGT$\n",
                " 7  9  0 T$\n",
                " 8  3  1 TNNACGT$\n",
            );
            assert_eq!(fs::read_to_string(&out)?, expected);
        }
        Ok(())
    }

    #[test]
    fn test_list_filters_and_caps() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;
        let index = SuffixArrayIndex::read(&path, false)?;
        let out = dir.path().join("list.out");

        index.list(&ListOptions {
            ranks: vec![2, 4],
            show_suffix: true,
            len: Some(4),
            output: Some(out.clone()),
            ..ListOptions::default()
        })?;
        assert_eq!(fs::read_to_string(&out)?, " 0 ACGT\n 1 CGTN\n");

        index.list(&ListOptions {
            number: Some(2),
            output: Some(out.clone()),
            ..ListOptions::default()
        })?;
        assert_eq!(fs::read_to_string(&out)?, "10\n 6\n");
        Ok(())
    }

    #[test]
    fn test_round_trip_identical_across_modes() -> Result<()> {
        let dir = TempDir::new()?;
        let path = SuffixArrayIndex::write(&BuildArgs {
            text: b"GATTACAGATTACATTTGCGCAAGATT".to_vec(),
            path: dir.path().join("g.sidx"),
            num_partitions: 4,
            ..BuildArgs::default()
        })?;

        let mem = SuffixArrayIndex::read(&path, false)?;
        let mapped = SuffixArrayIndex::read(&path, true)?;
        let queries: Vec<String> = ["GATT", "TTA", "C", "zzz", "GATTACA"]
            .iter()
            .map(ToString::to_string)
            .collect();

        let opts = CountOptions {
            queries: queries.clone(),
            max_query_len: None,
        };
        // "zzz" is not in the DNA alphabet but is a legal query; it simply
        // cannot match anything
        assert_eq!(mem.count(&opts)?, mapped.count(&opts)?);

        let opts = LocateOptions {
            queries: queries.clone(),
            max_query_len: None,
        };
        assert_eq!(mem.locate(&opts)?, mapped.locate(&opts)?);

        let opts = ExtractOptions {
            queries,
            max_query_len: None,
            prefix_len: Some(2),
            suffix_len: Some(3),
        };
        assert_eq!(mem.extract(&opts)?, mapped.extract(&opts)?);
        Ok(())
    }

    #[test]
    fn test_idempotent_builds() -> Result<()> {
        let dir = TempDir::new()?;
        let args = BuildArgs {
            text: b"ACGTACGTTTGCACGTNNACGT".to_vec(),
            num_partitions: 4,
            random_seed: 99,
            ..BuildArgs::default()
        };
        let a = SuffixArrayIndex::write(&BuildArgs {
            path: dir.path().join("a.sidx"),
            ..args.clone()
        })?;
        let b = SuffixArrayIndex::write(&BuildArgs {
            path: dir.path().join("b.sidx"),
            ..args
        })?;
        assert_eq!(fs::read(a)?, fs::read(b)?);
        Ok(())
    }

    #[test]
    fn test_bounded_sort_queries() -> Result<()> {
        let dir = TempDir::new()?;
        let path = SuffixArrayIndex::write(&BuildArgs {
            text: b"TTTAGC".to_vec(),
            path: dir.path().join("t.sidx"),
            is_dna: false,
            max_query_len: Some(2),
            ..BuildArgs::default()
        })?;
        let index = SuffixArrayIndex::read(&path, false)?;
        assert_eq!(index.metadata().sort_type, SortType::MaxQueryLen(2));

        // Queries longer than the build bound are truncated to it
        let res = index.count(&CountOptions {
            queries: vec!["TT".into(), "TTT".into()],
            max_query_len: None,
        })?;
        assert_eq!(res[0].count, 2);
        assert_eq!(res[1].count, 2);
        Ok(())
    }

    #[test]
    fn test_string_at() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;
        let index = SuffixArrayIndex::read(&path, true)?;

        assert_eq!(index.string_at(6, None)?, "ACGT$");
        assert_eq!(index.string_at(0, Some(4))?, "ACGT");
        assert!(index.string_at(100, None).is_err());
        Ok(())
    }

    #[test]
    fn test_empty_query_is_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;
        let index = SuffixArrayIndex::read(&path, false)?;
        assert!(index.bisect(0, "", None, None).is_err());
        Ok(())
    }

    #[test]
    fn test_read_rejects_corrupt_version() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;

        let mut bytes = fs::read(&path)?;
        bytes[4] = FORMAT + 1;
        let bad = dir.path().join("bad.sidx");
        fs::write(&bad, bytes)?;

        for low_memory in [false, true] {
            let res = SuffixArrayIndex::read(&bad, low_memory);
            assert!(matches!(
                res,
                Err(Error::FormatError(FormatError::UnsupportedVersion(_, _)))
            ));
        }
        Ok(())
    }

    #[test]
    fn test_read_rejects_truncated_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = example_index(&dir, "1.sidx")?;

        let bytes = fs::read(&path)?;
        let cut = dir.path().join("cut.sidx");
        fs::write(&cut, &bytes[..bytes.len() / 2])?;

        for low_memory in [false, true] {
            assert!(SuffixArrayIndex::read(&cut, low_memory).is_err());
        }
        Ok(())
    }

    #[test]
    fn test_build_rejects_bad_dna_character() {
        let res = SuffixArrayIndex::write(&BuildArgs {
            text: b"ACGTQ".to_vec(),
            path: std::env::temp_dir().join("never-written.sidx"),
            ..BuildArgs::default()
        });
        assert!(matches!(
            res,
            Err(Error::EncodingError(EncodingError::DisallowedCharacter(b'Q', 4)))
        ));
    }
}
