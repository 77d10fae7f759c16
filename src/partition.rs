//! Partitioner: buckets candidate suffixes into disjoint, order-respecting
//! key ranges so each bucket can be sorted independently and the sorted
//! buckets concatenated without a global merge.
//!
//! The key of a suffix is its leading symbols packed big-endian into a
//! `u64`, so key order agrees with lexicographic suffix order and every
//! suffix of an earlier partition compares `<=` every suffix of a later one.

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::alphabet::Alphabet;
use crate::error::{PartitionError, Result};

/// Widest partition key, in symbols
pub const KEY_WINDOW: usize = 8;

/// A parsed seed mask: a "1"/"0" pattern over the key window.
///
/// Care positions must be contiguous from position 0. A care position
/// after a don't-care position would let two suffixes land in different
/// partitions in an order that disagrees with their lexicographic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedMask {
    /// Total pattern width in symbols
    pub width: usize,
    /// Number of care positions
    pub weight: usize,
}

impl SeedMask {
    pub fn new(pattern: &str) -> Result<Self> {
        let bytes = pattern.as_bytes();
        if bytes.len() > KEY_WINDOW {
            return Err(
                PartitionError::SeedMaskTooWide(bytes.len(), KEY_WINDOW).into()
            );
        }
        let mut weight = 0;
        let mut seen_zero = false;
        for &b in bytes {
            match b {
                b'1' => {
                    if seen_zero {
                        return Err(PartitionError::GappedSeedMask.into());
                    }
                    weight += 1;
                }
                b'0' => seen_zero = true,
                _ => return Err(PartitionError::InvalidSeedMaskCharacter(b).into()),
            }
        }
        if weight == 0 {
            return Err(PartitionError::EmptySeedMask.into());
        }
        Ok(Self {
            width: bytes.len(),
            weight,
        })
    }
}

/// One bucket of candidate suffix starts covering the key range `[low, high)`
#[derive(Debug)]
pub struct Partition {
    pub low: u64,
    pub high: u64,
    pub offsets: Vec<u64>,
}

/// Splits candidate suffixes into contiguous ascending key ranges
#[derive(Debug)]
pub struct Partitioner {
    num_partitions: usize,
    key_len: usize,
    random_seed: u64,
}

impl Partitioner {
    /// Validates the partition count and seed mask up front, before any
    /// sort work begins.
    ///
    /// The key length is further capped by `max_query_len` so that suffixes
    /// considered equal under a bounded sort always share a bucket.
    pub fn new(
        num_partitions: usize,
        seed_mask: Option<&str>,
        max_query_len: Option<usize>,
        random_seed: u64,
    ) -> Result<Self> {
        if num_partitions == 0 {
            return Err(PartitionError::ZeroPartitions.into());
        }
        let mut key_len = match seed_mask {
            Some(pattern) => SeedMask::new(pattern)?.weight,
            None => KEY_WINDOW,
        };
        if let Some(mql) = max_query_len {
            if mql > 0 && mql < key_len {
                key_len = mql;
            }
        }
        Ok(Self {
            num_partitions,
            key_len,
            random_seed,
        })
    }

    /// Packs the leading `key_len` symbols of the suffix at `offset` into a
    /// numeric key. Positions past the end of the text pack as zero, below
    /// every symbol, so a truncated suffix keys before any extension of it.
    pub fn key(&self, text: &[u8], offset: usize) -> u64 {
        let mut key = 0u64;
        for pos in 0..self.key_len {
            let symbol = text.get(offset + pos).copied().unwrap_or(0);
            key = (key << 8) | u64::from(symbol);
        }
        key << (8 * (KEY_WINDOW - self.key_len))
    }

    /// Buckets every candidate suffix start into a partition.
    ///
    /// Candidates are the offsets whose symbol is indexable under the
    /// alphabet policy; excluded offsets stay in the text but not in the
    /// index. Bucket boundaries are key quantiles of a sample drawn with an
    /// RNG seeded from `random_seed`, so equal seeds bucket identically.
    pub fn split(&self, text: &[u8], alphabet: &Alphabet) -> Result<Vec<Partition>> {
        let candidates: Vec<u64> = text
            .iter()
            .enumerate()
            .filter(|(_, &symbol)| alphabet.is_indexable(symbol))
            .map(|(i, _)| i as u64)
            .collect();

        // No candidates means no boundaries to sample; one empty
        // full-range partition covers the (vacuous) key space
        if candidates.is_empty() {
            return Ok(vec![Partition {
                low: 0,
                high: u64::MAX,
                offsets: vec![],
            }]);
        }

        let boundaries = self.select_boundaries(text, &candidates);
        let mut partitions: Vec<Partition> = (0..self.num_partitions)
            .map(|i| Partition {
                low: if i == 0 { 0 } else { boundaries[i - 1] },
                high: boundaries.get(i).copied().unwrap_or(u64::MAX),
                offsets: vec![],
            })
            .collect();

        for &offset in &candidates {
            let key = self.key(text, offset as usize);
            let bucket = boundaries.partition_point(|&b| b <= key);
            partitions[bucket].offsets.push(offset);
        }

        Ok(partitions)
    }

    /// Key quantiles of a seeded random sample of the candidates.
    ///
    /// Returns `num_partitions - 1` ascending boundary keys; a suffix with
    /// key `k` belongs to the first partition whose boundary exceeds `k`.
    fn select_boundaries(&self, text: &[u8], candidates: &[u64]) -> Vec<u64> {
        if self.num_partitions == 1 || candidates.is_empty() {
            return vec![];
        }

        let mut rng = SmallRng::seed_from_u64(self.random_seed);
        let sample_size = (self.num_partitions * 256).min(candidates.len());
        let mut sample: Vec<u64> = (0..sample_size)
            .map(|_| {
                let pick = rng.random_range(0..candidates.len());
                self.key(text, candidates[pick] as usize)
            })
            .collect();
        sample.sort_unstable();

        (1..self.num_partitions)
            .map(|i| sample[i * sample.len() / self.num_partitions])
            .collect()
    }
}
