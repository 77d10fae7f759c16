//! Suffix/LCP builder.
//!
//! Each partition is sorted independently with an LCP-aware merge sort that
//! produces the partition's LCP values as a by-product of merging. Sorted
//! partitions are concatenated in ascending key order; the LCP at each
//! partition boundary is recomputed by explicit comparison since it cannot
//! be known from in-partition data.

use std::cmp::{max, min, Ordering};
use std::mem;
use std::time::Instant;

use log::info;

use crate::alphabet::Alphabet;
use crate::collection::SequenceCollection;
use crate::error::Result;
use crate::header::IndexHeader;
use crate::partition::Partitioner;
use crate::types::{BuildArgs, SortType};

/// A fully built (not yet persisted) suffix array with its LCP array
#[derive(Debug)]
pub struct SuffixBuilder {
    collection: SequenceCollection,
    alphabet: Alphabet,
    sort_type: SortType,
    order: Vec<u64>,
    lcp: Vec<u64>,
}

impl SuffixBuilder {
    /// Encodes the text, buckets candidate suffixes, sorts every bucket on
    /// worker threads, and stitches the buckets into the global order.
    pub fn build(args: &BuildArgs) -> Result<Self> {
        let alphabet = Alphabet::new(
            args.is_dna,
            args.allow_ambiguity,
            args.ignore_softmask,
            args.sequence_delimiter,
        );
        let collection = SequenceCollection::new(
            &args.text,
            args.sequence_starts.clone(),
            args.sequence_names.clone(),
            &alphabet,
        )?;

        let sort_type = match args.max_query_len {
            Some(n) if n > 0 => SortType::MaxQueryLen(n),
            _ => SortType::Full,
        };

        let partitioner = Partitioner::new(
            args.num_partitions,
            args.seed_mask.as_deref(),
            args.max_query_len,
            args.random_seed,
        )?;
        let partitions = partitioner.split(collection.text(), &alphabet)?;
        let num_suffixes: usize = partitions.iter().map(|p| p.offsets.len()).sum();
        info!(
            "Split {num_suffixes} candidate suffixes into {} partitions",
            partitions.len()
        );

        let mut builder = Self {
            collection,
            alphabet,
            sort_type,
            order: Vec::with_capacity(num_suffixes),
            lcp: Vec::with_capacity(num_suffixes),
        };

        let now = Instant::now();
        let mut sorted: Vec<Option<(Vec<u64>, Vec<u64>)>> =
            partitions.iter().map(|_| None).collect();
        let num_threads = num_cpus::get().clamp(1, partitions.len().max(1));
        let per_thread = partitions.len().div_ceil(num_threads);
        std::thread::scope(|scope| {
            for (parts, outputs) in partitions
                .chunks(per_thread)
                .zip(sorted.chunks_mut(per_thread))
            {
                let builder = &builder;
                scope.spawn(move || {
                    for (part, out) in parts.iter().zip(outputs.iter_mut()) {
                        *out = Some(builder.sort_partition(&part.offsets));
                    }
                });
            }
        });
        info!(
            "Sorted {num_suffixes} suffixes in {} partitions in {:?}",
            partitions.len(),
            now.elapsed()
        );

        for (part_order, mut part_lcp) in sorted.into_iter().flatten() {
            if part_order.is_empty() {
                continue;
            }
            if let Some(&prev_last) = builder.order.last() {
                // Boundary LCP between the last suffix of the previous
                // partition and the first of this one
                part_lcp[0] = builder.find_lcp(
                    prev_last as usize,
                    part_order[0] as usize,
                    0,
                    builder.comparison_limit(),
                ) as u64;
            }
            builder.order.extend_from_slice(&part_order);
            builder.lcp.append(&mut part_lcp);
        }

        Ok(builder)
    }

    pub fn collection(&self) -> &SequenceCollection {
        &self.collection
    }

    pub fn sort_type(&self) -> SortType {
        self.sort_type
    }

    /// Suffix rank -> text offset, over all indexed suffixes
    pub fn order(&self) -> &[u64] {
        &self.order
    }

    /// Longest common prefix between consecutive suffixes in `order`
    pub fn lcp(&self) -> &[u64] {
        &self.lcp
    }

    pub fn num_suffixes(&self) -> usize {
        self.order.len()
    }

    /// The header this builder persists
    pub(crate) fn header(&self) -> IndexHeader {
        IndexHeader::new(
            self.alphabet.is_dna,
            self.alphabet.allow_ambiguity,
            self.alphabet.ignore_softmask,
            self.collection.len() as u64,
            self.num_suffixes() as u64,
            self.collection.num_sequences() as u64,
            self.sort_type.to_u64(),
        )
    }

    /// How deep any two suffixes are compared
    fn comparison_limit(&self) -> usize {
        match self.sort_type {
            SortType::Full => self.collection.len(),
            SortType::MaxQueryLen(n) => n,
        }
    }

    /// Length of the common prefix of the suffixes at `a` and `b`, counted
    /// from `skip` known-equal symbols, capped at `cap` symbols and the end
    /// of the text.
    fn find_lcp(&self, a: usize, b: usize, skip: usize, cap: usize) -> usize {
        let text = self.collection.text();
        let end_a = min(a + cap, text.len());
        let end_b = min(b + cap, text.len());
        skip + ((a + skip)..end_a)
            .zip((b + skip)..end_b)
            .take_while(|&(x, y)| text[x] == text[y])
            .count()
    }

    fn sort_partition(&self, offsets: &[u64]) -> (Vec<u64>, Vec<u64>) {
        let n = offsets.len();
        if n == 0 {
            return (vec![], vec![]);
        }
        let mut target = offsets.to_vec();
        let mut work = target.clone();
        let mut lcp = vec![0u64; n];
        let mut lcp_w = vec![0u64; n];
        self.merge_sort(&mut work, &mut target, n, &mut lcp, &mut lcp_w);
        (target, lcp)
    }

    /// Bottom-up halves sorted recursively, then merged with LCPs carried
    /// along; `target`/`lcp` hold the result.
    fn merge_sort(
        &self,
        work: &mut [u64],
        target: &mut [u64],
        n: usize,
        lcp: &mut [u64],
        lcp_w: &mut [u64],
    ) {
        if n == 1 {
            lcp[0] = 0;
        } else {
            let mid = n / 2;
            self.merge_sort(
                &mut target[..mid],
                &mut work[..mid],
                mid,
                &mut lcp_w[..mid],
                &mut lcp[..mid],
            );
            self.merge_sort(
                &mut target[mid..],
                &mut work[mid..],
                n - mid,
                &mut lcp_w[mid..],
                &mut lcp[mid..],
            );
            self.merge(work, mid, lcp_w, target, lcp);
        }
    }

    /// Merges the two sorted halves of `source`, computing each target LCP
    /// from the halves' LCPs and at most one direct comparison per step.
    fn merge(
        &self,
        source: &mut [u64],
        mid: usize,
        source_lcp: &mut [u64],
        target: &mut [u64],
        target_lcp: &mut [u64],
    ) {
        let text = self.collection.text();
        let text_len = text.len();
        let limit = self.comparison_limit();

        let (mut x, mut y) = source.split_at_mut(mid);
        let (mut lcp_x, mut lcp_y) = source_lcp.split_at_mut(mid);
        let mut len_x = x.len();
        let mut len_y = y.len();
        // LCP of the last-taken suffix against the head of the other side
        let mut m = 0u64;
        let mut idx_x = 0;
        let mut idx_y = 0;
        let mut idx_target = 0;

        while idx_x < len_x && idx_y < len_y {
            let l_x = lcp_x[idx_x];
            match l_x.cmp(&m) {
                Ordering::Greater => {
                    target[idx_target] = x[idx_x];
                    target_lcp[idx_target] = l_x;
                }
                Ordering::Less => {
                    target[idx_target] = y[idx_y];
                    target_lcp[idx_target] = m;
                    m = l_x;
                }
                Ordering::Equal => {
                    // The larger offset is the shorter suffix; it wins ties
                    // because the sentinel ends it first
                    let shorter_suffix = max(x[idx_x], y[idx_y]);
                    let context = min(limit, text_len - shorter_suffix as usize);

                    let len_lcp = if (m as usize) < context {
                        self.find_lcp(
                            x[idx_x] as usize,
                            y[idx_y] as usize,
                            m as usize,
                            context,
                        )
                    } else {
                        context
                    };

                    if len_lcp >= context {
                        target[idx_target] = shorter_suffix;
                    } else {
                        let next_x = text[x[idx_x] as usize + len_lcp];
                        let next_y = text[y[idx_y] as usize + len_lcp];
                        target[idx_target] = match next_x.cmp(&next_y) {
                            Ordering::Equal => shorter_suffix,
                            Ordering::Less => x[idx_x],
                            Ordering::Greater => y[idx_y],
                        };
                    }

                    target_lcp[idx_target] = if target[idx_target] == x[idx_x] {
                        l_x
                    } else {
                        m
                    };
                    m = len_lcp as u64;
                }
            }

            if target[idx_target] == x[idx_x] {
                idx_x += 1;
            } else {
                // Took from the right: swap the roles of the two sides so
                // `m` keeps tracking the last-taken suffix
                idx_y += 1;
                mem::swap(&mut x, &mut y);
                mem::swap(&mut len_x, &mut len_y);
                mem::swap(&mut lcp_x, &mut lcp_y);
                mem::swap(&mut idx_x, &mut idx_y);
            }
            idx_target += 1;
        }

        while idx_x < len_x {
            target[idx_target] = x[idx_x];
            target_lcp[idx_target] = lcp_x[idx_x];
            idx_x += 1;
            idx_target += 1;
        }

        if idx_y < len_y {
            target[idx_target] = y[idx_y];
            target_lcp[idx_target] = m;
            idx_y += 1;
            idx_target += 1;

            while idx_y < len_y {
                target[idx_target] = y[idx_y];
                target_lcp[idx_target] = lcp_y[idx_y];
                idx_y += 1;
                idx_target += 1;
            }
        }
    }
}
