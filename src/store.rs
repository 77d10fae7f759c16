//! Index store: serialization of a built index to the versioned binary
//! format and deserialization with a choice of two access strategies.
//!
//! With `low_memory = false` every section is materialized into owned
//! vectors; with `low_memory = true` the file is memory-mapped and the
//! `u64` arrays and the text are served zero-copy from the map, paging from
//! disk on access. Query code sees one slice view either way.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use bytemuck::{cast_slice, pod_collect_to_vec};
use byteorder::{ByteOrder, LittleEndian};
use log::info;
use memmap2::Mmap;

use crate::builder::SuffixBuilder;
use crate::error::{FormatError, Result};
use crate::header::{IndexHeader, SIZE_HEADER};

/// A `u64` array section, fully materialized or served from a memory map
#[derive(Debug)]
pub(crate) enum U64Access {
    Mem(Vec<u64>),
    Mapped {
        mmap: Arc<Mmap>,
        offset: usize,
        len: usize,
    },
}

impl U64Access {
    /// One view over both strategies; the mapped arm relies on the format
    /// placing every array at an 8-byte-aligned offset.
    pub fn as_slice(&self) -> &[u64] {
        match self {
            Self::Mem(vals) => vals,
            Self::Mapped { mmap, offset, len } => {
                cast_slice(&mmap[*offset..*offset + 8 * *len])
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Mem(vals) => vals.len(),
            Self::Mapped { len, .. } => *len,
        }
    }
}

/// The encoded text section, fully materialized or memory-mapped
#[derive(Debug)]
pub(crate) enum TextAccess {
    Mem(Vec<u8>),
    Mapped {
        mmap: Arc<Mmap>,
        offset: usize,
        len: usize,
    },
}

impl TextAccess {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Mem(text) => text,
            Self::Mapped { mmap, offset, len } => &mmap[*offset..*offset + *len],
        }
    }
}

/// A deserialized index file, ready for the query engine
#[derive(Debug)]
pub(crate) struct StoredIndex {
    pub header: IndexHeader,
    pub starts: Vec<u64>,
    pub names: Vec<String>,
    pub order: U64Access,
    pub lcp: U64Access,
    pub text: TextAccess,
    pub file_size: u64,
    pub modified: SystemTime,
}

/// Serializes a built index to `path`.
///
/// The output is deterministic for identical builder state: fixed header,
/// then `sequence_starts`, `order`, `lcp`, the encoded text, and the
/// length-prefixed sequence names. Returns the number of bytes written.
pub(crate) fn write(builder: &SuffixBuilder, path: &Path) -> Result<u64> {
    let collection = builder.collection();
    let mut file = BufWriter::new(File::create(path)?);
    let mut bytes_out = 0u64;

    let header = builder.header();
    header.write_bytes(&mut file)?;
    bytes_out += SIZE_HEADER as u64;

    for section in [collection.starts(), builder.order(), builder.lcp()] {
        let bytes: &[u8] = cast_slice(section);
        file.write_all(bytes)?;
        bytes_out += bytes.len() as u64;
    }

    file.write_all(collection.text())?;
    bytes_out += collection.text().len() as u64;

    for name in collection.names() {
        let mut len = [0u8; 8];
        LittleEndian::write_u64(&mut len, name.len() as u64);
        file.write_all(&len)?;
        file.write_all(name.as_bytes())?;
        bytes_out += 8 + name.len() as u64;
    }

    file.flush()?;
    info!("Wrote {bytes_out} bytes to {}", path.display());
    Ok(bytes_out)
}

/// Deserializes an index file, validating magic, version, and sizes first
pub(crate) fn read(path: &Path, low_memory: bool) -> Result<StoredIndex> {
    let file = File::open(path)?;
    let meta = file.metadata()?;
    if !meta.is_file() {
        return Err(FormatError::IncompatibleFile.into());
    }
    let file_size = meta.len();
    let modified = meta.modified()?;

    if low_memory {
        // Safety: the file is open and never modified while mapped
        let mmap = Arc::new(unsafe { Mmap::map(&file)? });
        let header = IndexHeader::from_buffer(&mmap)?;
        validate_sizes(&header, mmap.len())?;

        let num_suffixes = header.num_suffixes as usize;
        let starts: Vec<u64> = pod_collect_to_vec(
            &mmap[header.starts_pos()..header.order_pos()],
        );
        let names = parse_names(
            &mmap[header.names_pos as usize..],
            header.num_sequences as usize,
        )?;
        info!("Mapped {} ({file_size} bytes)", path.display());

        Ok(StoredIndex {
            header,
            starts,
            names,
            order: U64Access::Mapped {
                mmap: Arc::clone(&mmap),
                offset: header.order_pos(),
                len: num_suffixes,
            },
            lcp: U64Access::Mapped {
                mmap: Arc::clone(&mmap),
                offset: header.lcp_pos(),
                len: num_suffixes,
            },
            text: TextAccess::Mapped {
                mmap,
                offset: header.text_pos as usize,
                len: header.text_len as usize,
            },
            file_size,
            modified,
        })
    } else {
        let buffer = fs::read(path)?;
        let header = IndexHeader::from_buffer(&buffer)?;
        validate_sizes(&header, buffer.len())?;

        let starts: Vec<u64> =
            pod_collect_to_vec(&buffer[header.starts_pos()..header.order_pos()]);
        let order: Vec<u64> = pod_collect_to_vec(
            &buffer[header.order_pos()..header.lcp_pos()],
        );
        let lcp: Vec<u64> = pod_collect_to_vec(
            &buffer[header.lcp_pos()..header.text_pos as usize],
        );
        let text = buffer
            [header.text_pos as usize..header.names_pos as usize]
            .to_vec();
        let names = parse_names(
            &buffer[header.names_pos as usize..],
            header.num_sequences as usize,
        )?;
        info!("Loaded {} ({file_size} bytes)", path.display());

        Ok(StoredIndex {
            header,
            starts,
            names,
            order: U64Access::Mem(order),
            lcp: U64Access::Mem(lcp),
            text: TextAccess::Mem(text),
            file_size,
            modified,
        })
    }
}

/// A truncated file fails before any section is interpreted
fn validate_sizes(header: &IndexHeader, got: usize) -> Result<()> {
    let expected = header.names_pos as usize;
    if got < expected {
        return Err(FormatError::Truncated { got, expected }.into());
    }
    Ok(())
}

/// Parses `count` length-prefixed UTF-8 names from the tail of the file
fn parse_names(mut buffer: &[u8], count: usize) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        if buffer.len() < 8 {
            return Err(FormatError::Truncated {
                got: buffer.len(),
                expected: 8,
            }
            .into());
        }
        let len = LittleEndian::read_u64(&buffer[..8]) as usize;
        if buffer.len() < 8 + len {
            return Err(FormatError::Truncated {
                got: buffer.len(),
                expected: 8 + len,
            }
            .into());
        }
        names.push(std::str::from_utf8(&buffer[8..8 + len])?.to_string());
        buffer = &buffer[8 + len..];
    }
    Ok(names)
}
