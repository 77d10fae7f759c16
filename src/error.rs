/// Custom Result type for sufidx operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the sufidx library, encompassing all possible error
/// cases that can occur while building, persisting, or querying an index.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors raised while encoding raw input text
    EncodingError(#[from] EncodingError),
    /// Errors raised while configuring or running the partitioner
    PartitionError(#[from] PartitionError),
    /// Errors raised while reading a persisted index file
    FormatError(#[from] FormatError),
    /// Errors raised by malformed query options
    QueryError(#[from] QueryError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// UTF-8 encoding/decoding errors
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Errors raised while encoding raw input into the internal alphabet.
///
/// All of these abort construction; the index is never partially built.
#[derive(thiserror::Error, Debug)]
pub enum EncodingError {
    /// A character outside the configured alphabet/ambiguity policy
    #[error("Disallowed character {ch:?} at text offset {1}", ch = *.0 as char)]
    DisallowedCharacter(u8, usize),

    /// Sequence start offsets must be strictly increasing and within the text
    #[error("Invalid sequence start {0} at index {1}")]
    InvalidSequenceStart(usize, usize),

    /// Every sequence start needs a parallel name
    #[error("Got {starts} sequence starts but {names} names")]
    UnevenSequenceNames { starts: usize, names: usize },
}

/// Errors raised before any sort work begins.
#[derive(thiserror::Error, Debug)]
pub enum PartitionError {
    /// At least one partition is required
    #[error("Number of partitions must be at least 1")]
    ZeroPartitions,

    /// The seed mask may not exceed the partition key window
    #[error("Seed mask of width {0} exceeds the {1}-symbol key window")]
    SeedMaskTooWide(usize, usize),

    /// Seed masks are 1/0 strings
    #[error("Invalid seed mask character {:?}", *.0 as char)]
    InvalidSeedMaskCharacter(u8),

    /// A mask with no care positions selects nothing
    #[error("Seed mask has no care positions")]
    EmptySeedMask,

    /// A care position after a don't-care position would break the
    /// lexicographic ordering between partitions
    #[error("Seed mask care positions must be contiguous from position 0")]
    GappedSeedMask,
}

/// Errors raised while validating a persisted index file.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// The magic number in the header does not match the expected value
    #[error("Invalid magic number: {0:#x}")]
    InvalidMagicNumber(u32),

    /// The format version in the header is not supported
    #[error("Unsupported format version: {0} (supported: {1})")]
    UnsupportedVersion(u8, u8),

    /// The file is smaller than its header claims
    #[error("File truncated: {got} bytes but expected at least {expected}")]
    Truncated { got: usize, expected: usize },

    /// The file being read is not a regular file
    #[error("File is not regular")]
    IncompatibleFile,
}

/// Errors raised by malformed query options.
///
/// These are fatal per call; other queries in a batch dispatched
/// individually by the caller are unaffected.
#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    /// Queries must be non-empty
    #[error("Empty query string (query {0})")]
    EmptyQuery(usize),

    /// A rank outside the suffix array was requested
    #[error("Rank {0} is out of range ({1} suffixes)")]
    RankOutOfRange(usize, usize),

    /// A text offset past the end of the stored text was requested
    #[error("Offset {0} is out of range (text length {1})")]
    OffsetOutOfRange(usize, usize),
}
