//! Custom error types shared by the PAK and UTOC decoders.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A magic constant did not match.
    #[error("bad magic in {context}")]
    BadMagic { context: &'static str },

    /// A version value outside the enumerated set, or a declared version
    /// inconsistent with the one being probed.
    #[error("unsupported container version: {0}")]
    UnsupportedVersion(u32),

    /// An encrypted index or body was encountered; parsing stops here.
    ///
    /// Carries the encryption key GUID when the container declared one, so a
    /// caller can arrange a key before retrying with an external tool.
    #[error("container is encrypted, decryption is not supported")]
    EncryptedContainer { encryption_guid: Option<u128> },

    /// A read ran past the end of the buffer or file.
    #[error("truncated data: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A field failed a structural invariant.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// A convenience `Result` type alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
