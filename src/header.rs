//! Fixed-size header for persisted index files.
//!
//! The header carries the format version, alphabet flags, array lengths,
//! and the byte offsets of the variable sections. Array sections start at
//! 8-byte-aligned offsets so a memory map can serve them in place.

use byteorder::{ByteOrder, LittleEndian};
use std::io::{Read, Write};

use crate::error::{FormatError, Result};

/// Current magic number: "SIDX" in ASCII (in little-endian byte order)
const MAGIC: u32 = 0x5844_4953;

/// Current format version of the index file format
pub const FORMAT: u8 = 1;

/// Size of the header in bytes
pub const SIZE_HEADER: usize = 64;

/// Header structure for persisted index files.
///
/// The fixed layout is 64 bytes: magic (4), version (1), three alphabet
/// flags (3), then seven `u64` fields. The `sequence_starts`, `order`, and
/// `lcp` arrays follow immediately after the header; the text and the
/// sequence names sit at the recorded offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub magic: u32,
    pub version: u8,
    pub is_dna: bool,
    pub allow_ambiguity: bool,
    pub ignore_softmask: bool,
    /// Length of the encoded text, terminal sentinel included
    pub text_len: u64,
    /// Number of indexed suffixes (may be < `text_len`)
    pub num_suffixes: u64,
    pub num_sequences: u64,
    /// Comparison bound used at build time; zero means a full sort
    pub max_query_len: u64,
    /// Byte offset of the encoded text
    pub text_pos: u64,
    /// Byte offset of the serialized sequence names
    pub names_pos: u64,
}

impl IndexHeader {
    /// Byte offset of the `sequence_starts` array
    pub fn starts_pos(&self) -> usize {
        SIZE_HEADER
    }

    /// Byte offset of the `order` array
    pub fn order_pos(&self) -> usize {
        self.starts_pos() + 8 * self.num_sequences as usize
    }

    /// Byte offset of the `lcp` array
    pub fn lcp_pos(&self) -> usize {
        self.order_pos() + 8 * self.num_suffixes as usize
    }

    /// Parses and validates a header from a fixed-size byte array.
    ///
    /// The magic number and format version are checked here; an unsupported
    /// version is fatal and nothing past the header is read.
    pub fn from_bytes(buffer: &[u8; SIZE_HEADER]) -> Result<Self> {
        let magic = LittleEndian::read_u32(&buffer[0..4]);
        if magic != MAGIC {
            return Err(FormatError::InvalidMagicNumber(magic).into());
        }
        let version = buffer[4];
        if version != FORMAT {
            return Err(FormatError::UnsupportedVersion(version, FORMAT).into());
        }
        Ok(Self {
            magic,
            version,
            is_dna: buffer[5] == 1,
            allow_ambiguity: buffer[6] == 1,
            ignore_softmask: buffer[7] == 1,
            text_len: LittleEndian::read_u64(&buffer[8..16]),
            num_suffixes: LittleEndian::read_u64(&buffer[16..24]),
            num_sequences: LittleEndian::read_u64(&buffer[24..32]),
            max_query_len: LittleEndian::read_u64(&buffer[32..40]),
            text_pos: LittleEndian::read_u64(&buffer[40..48]),
            names_pos: LittleEndian::read_u64(&buffer[48..56]),
        })
    }

    /// Parses a header from the beginning of an arbitrarily sized buffer
    pub fn from_buffer(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < SIZE_HEADER {
            return Err(FormatError::Truncated {
                got: buffer.len(),
                expected: SIZE_HEADER,
            }
            .into());
        }
        let mut bytes = [0u8; SIZE_HEADER];
        bytes.copy_from_slice(&buffer[..SIZE_HEADER]);
        Self::from_bytes(&bytes)
    }

    /// Reads a header from a reader
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = [0u8; SIZE_HEADER];
        reader.read_exact(&mut buffer)?;
        Self::from_bytes(&buffer)
    }

    /// Serializes the header and writes it to a writer
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut buffer = [0u8; SIZE_HEADER];
        LittleEndian::write_u32(&mut buffer[0..4], self.magic);
        buffer[4] = self.version;
        buffer[5] = u8::from(self.is_dna);
        buffer[6] = u8::from(self.allow_ambiguity);
        buffer[7] = u8::from(self.ignore_softmask);
        LittleEndian::write_u64(&mut buffer[8..16], self.text_len);
        LittleEndian::write_u64(&mut buffer[16..24], self.num_suffixes);
        LittleEndian::write_u64(&mut buffer[24..32], self.num_sequences);
        LittleEndian::write_u64(&mut buffer[32..40], self.max_query_len);
        LittleEndian::write_u64(&mut buffer[40..48], self.text_pos);
        LittleEndian::write_u64(&mut buffer[48..56], self.names_pos);
        writer.write_all(&buffer)?;
        Ok(())
    }

    pub fn new(
        is_dna: bool,
        allow_ambiguity: bool,
        ignore_softmask: bool,
        text_len: u64,
        num_suffixes: u64,
        num_sequences: u64,
        max_query_len: u64,
    ) -> Self {
        let mut header = Self {
            magic: MAGIC,
            version: FORMAT,
            is_dna,
            allow_ambiguity,
            ignore_softmask,
            text_len,
            num_suffixes,
            num_sequences,
            max_query_len,
            text_pos: 0,
            names_pos: 0,
        };
        header.text_pos = (header.lcp_pos() + 8 * num_suffixes as usize) as u64;
        header.names_pos = header.text_pos + text_len;
        header
    }
}
