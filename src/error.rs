//! Error types for reading and writing ICNS files.

use thiserror::Error;

use crate::icontype::OSType;

/// Errors produced by the run-length codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A record declared more bytes than remain in the input.
    #[error("truncated run-length record at offset {offset}: needed {needed} bytes but only {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The decoded stream does not have the length its pixel planes require.
    #[error("run-length stream decoded to {actual} bytes instead of {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// The error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error, or an embedded image that could not be decoded.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input does not start with the ICNS magic literal.
    #[error("not an icns file (wrong magic literal {found:?})")]
    BadMagic { found: [u8; 4] },

    /// The declared file length does not match the input (strict mode only).
    #[error("declared file length {declared} does not match actual length {actual}")]
    BadLength { declared: u32, actual: usize },

    /// A chunk's declared length runs past the end of the input.
    #[error("chunk '{ostype}' declares {declared} bytes but only {available} remain")]
    TruncatedChunk {
        ostype: OSType,
        declared: u32,
        available: usize,
    },

    /// A chunk's payload failed to decode.
    #[error("failed to decode '{ostype}' chunk: {source}")]
    ChunkDecode {
        ostype: OSType,
        #[source]
        source: Box<Error>,
    },

    /// The OSType is not known to the format registry.
    #[error("unsupported OSType: {0}")]
    Unsupported(OSType),

    /// Malformed run-length data.
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// A caller-side precondition was violated.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An asset has no pixel data (it came from a metadata-only parse).
    #[error("asset '{0}' has no decoded image")]
    MissingImage(OSType),

    /// A lookup on the icon family found nothing.
    #[error("{0}")]
    NotFound(String),
}

/// Result type alias using the crate's `Error` type.
pub type Result<T> = std::result::Result<T, Error>;
