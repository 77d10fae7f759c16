//! Diagnostic listing of the suffix array.
//!
//! One line per rank: the text offset always, plus the rank index, LCP
//! value, and suffix text as selected by the `show_*` flags. Numeric
//! columns share a fixed width derived from the text length and are
//! right-aligned; the suffix text runs to the terminal sentinel unless
//! truncated.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::error::{QueryError, Result};
use crate::index::SuffixArrayIndex;
use crate::types::ListOptions;

pub(crate) fn list(index: &SuffixArrayIndex, args: &ListOptions) -> Result<()> {
    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_listing(index, args, &mut out)?;
            out.flush()?;
            Ok(())
        }
        None => write_listing(index, args, &mut io::stdout().lock()),
    }
}

pub(crate) fn write_listing<W: Write>(
    index: &SuffixArrayIndex,
    args: &ListOptions,
    out: &mut W,
) -> Result<()> {
    let text = index.text();
    let order = index.order();
    let lcp = index.lcp();
    let width = text.len().to_string().len();

    let ranks: Vec<usize> = if args.ranks.is_empty() {
        (0..order.len()).collect()
    } else {
        args.ranks.clone()
    };
    let cap = args.number.unwrap_or(ranks.len());

    for &rank in ranks.iter().take(cap) {
        let Some(&suffix) = order.get(rank) else {
            return Err(QueryError::RankOutOfRange(rank, order.len()).into());
        };
        let suffix = suffix as usize;

        let mut line = String::new();
        if args.show_rank {
            line.push_str(&format!("{rank:>width$} "));
        }
        line.push_str(&format!("{suffix:>width$}"));
        if args.show_lcp {
            line.push_str(&format!(" {:>width$}", lcp[rank]));
        }
        if args.show_suffix {
            let end = args.len.map_or(text.len(), |n| text.len().min(suffix + n));
            line.push(' ');
            line.push_str(std::str::from_utf8(&text[suffix..end])?);
        }
        line.push('\n');
        out.write_all(line.as_bytes())?;
    }

    Ok(())
}
