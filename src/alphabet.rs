//! Alphabet and encoding policy.
//!
//! Raw input characters are mapped to the internal symbol set before any
//! suffix is considered. Two sentinels sit below the alphabet in byte order:
//! [`SEQUENCE_SENTINEL`] separates logical sequences and [`TERMINAL_SENTINEL`]
//! is appended once at the very end of the text, so shorter suffixes sort
//! before longer suffixes sharing the same prefix.

use crate::error::{EncodingError, Result};

/// Sentinel appended once at the end of the concatenated text
pub const TERMINAL_SENTINEL: u8 = b'$';

/// Sentinel replacing the sequence delimiter between logical sequences
pub const SEQUENCE_SENTINEL: u8 = b'%';

/// Encoding policy for mapping raw input bytes to internal symbols.
///
/// In DNA mode the recognized alphabet is `{A,C,G,T}` plus the ambiguity
/// code `N`. Suffixes starting at `N` are kept in the text but excluded
/// from the index unless `allow_ambiguity` is set. Any other character is a
/// fatal [`EncodingError`]. Outside DNA mode every byte is accepted.
#[derive(Debug, Clone, Copy)]
pub struct Alphabet {
    pub is_dna: bool,
    pub allow_ambiguity: bool,
    pub ignore_softmask: bool,
    /// Raw input byte marking boundaries between logical sequences
    pub sequence_delimiter: u8,
}

impl Alphabet {
    pub fn new(
        is_dna: bool,
        allow_ambiguity: bool,
        ignore_softmask: bool,
        sequence_delimiter: u8,
    ) -> Self {
        Self {
            is_dna,
            allow_ambiguity,
            ignore_softmask,
            sequence_delimiter,
        }
    }

    /// Encodes raw input into the internal symbol set.
    ///
    /// Replaces the configured delimiter with [`SEQUENCE_SENTINEL`], folds
    /// soft-masked (lower-case) bases to upper-case when `ignore_softmask`
    /// is set, and validates every byte against the alphabet policy.
    pub fn encode(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut text = Vec::with_capacity(raw.len());
        for (i, &byte) in raw.iter().enumerate() {
            let symbol = if byte == self.sequence_delimiter {
                SEQUENCE_SENTINEL
            } else if byte.is_ascii_lowercase() && self.ignore_softmask {
                byte.to_ascii_uppercase()
            } else {
                byte
            };
            if !self.is_valid(symbol) {
                return Err(EncodingError::DisallowedCharacter(byte, i).into());
            }
            text.push(symbol);
        }
        Ok(text)
    }

    /// Whether a symbol is admitted into the encoded text
    fn is_valid(&self, symbol: u8) -> bool {
        if !self.is_dna {
            return true;
        }
        matches!(
            symbol,
            b'A' | b'C' | b'G' | b'T' | b'N'
                | b'a' | b'c' | b'g' | b't' | b'n'
                | TERMINAL_SENTINEL
                | SEQUENCE_SENTINEL
        )
    }

    /// Whether a suffix starting on this symbol is a candidate for the index.
    ///
    /// Sentinels are always indexed; the ambiguity code is indexed only when
    /// `allow_ambiguity` is set.
    pub fn is_indexable(&self, symbol: u8) -> bool {
        if symbol == TERMINAL_SENTINEL || symbol == SEQUENCE_SENTINEL {
            return true;
        }
        if !self.is_dna {
            return true;
        }
        match symbol {
            b'N' | b'n' => self.allow_ambiguity,
            _ => true,
        }
    }
}
