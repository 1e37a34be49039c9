//! Error taxonomy for the pulse decoding pipeline.
//!
//! Mirrors the five-way failure classification of the core: a pulse line can
//! fail to parse, fail to match any known protocol, fail bit mapping, fail
//! payload decoding, or decode successfully into a physically unreasonable
//! reading. Every variant is non-fatal at the dispatcher boundary — see
//! [`crate::dispatcher`].

use thiserror::Error;

/// Failure of [`crate::pulse::PreparePulse`] on a raw line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PulseParseError {
    #[error("pulse sequence contains non-digit characters: {0:?}")]
    InvalidCharacters(String),
    #[error("malformed pulse line: {0}")]
    Malformed(String),
}

/// Failure of the bit mapper ([`crate::protocols::convert`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("unknown digit group {group:?} (offset {offset}) for protocol {protocol}")]
    UnknownGroup {
        protocol: &'static str,
        group: String,
        offset: usize,
    },
    #[error(
        "sequence length {len} is not a multiple of group size {group_size} for protocol {protocol}"
    )]
    RaggedSequence {
        protocol: &'static str,
        len: usize,
        group_size: usize,
    },
}

/// Failure of a payload decoder parsing a bit-range out of the bit string.
/// Per spec.md §7, this should be unreachable once the bit mapper succeeds;
/// its presence indicates a bug in a protocol's field table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("payload decode failed for {protocol}: field {field}: {reason}")]
pub struct PayloadDecodeError {
    pub protocol: &'static str,
    pub field: &'static str,
    pub reason: String,
}

/// The complete error taxonomy for one pulse line traversing the pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid line: {0}")]
    InvalidLine(#[from] PulseParseError),

    #[error("no protocol matched signal (lengths={lengths:?}, seq_len={seq_len})")]
    NoMatch { lengths: Vec<u32>, seq_len: usize },

    #[error("bit mapping failed: {0}")]
    Mapping(#[from] MappingError),

    #[error("payload decode failed: {0}")]
    Payload(#[from] PayloadDecodeError),

    #[error("decoded reading out of physical range: {0}")]
    Unreasonable(String),
}
