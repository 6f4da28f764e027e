//! Server-side error type.
//!
//! Handlers convert every one of these into a protocol reply; only a failed
//! control transport travels further up and ends the session.

use std::fmt;

/// Categorised server error.
#[derive(Debug, Clone)]
pub struct FtpdError {
    pub kind: FtpdErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpdErrorKind {
    /// Algorithm is not part of the registry.
    UnknownHashAlgorithm,
    /// Path does not exist on the backend.
    NotFound,
    /// Path exists but is not a regular file.
    NotRegularFile,
    /// Byte range with `end < start` or past the end of the file.
    InvalidRange,
    /// Malformed command argument.
    InvalidArgument,
    /// Stream ended before the requested number of bytes was read.
    UnexpectedEof,
    /// Local or transport I/O failure.
    Io,
    /// Storage backend reported a failure.
    Backend,
    /// The driver has no TLS configuration to offer.
    TlsUnavailable,
    /// TLS handshake failure.
    TlsFailed,
    /// Operation not implemented by the driver.
    Unsupported,
    /// Control connection is gone.
    Disconnected,
    /// Command line exceeded the read limit.
    LineTooLong,
    /// Path resolves outside the tree a driver serves.
    OutsideRoot,
}

pub type FtpdResult<T> = Result<T, FtpdError>;

// ── Construction helpers ─────────────────────────────────────────────

impl FtpdError {
    pub fn new(kind: FtpdErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    pub fn unknown_hash(name: &str) -> Self {
        Self::new(
            FtpdErrorKind::UnknownHashAlgorithm,
            format!("unknown hash algorithm '{}'", name),
        )
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(FtpdErrorKind::NotFound, msg)
    }

    pub fn not_regular_file(path: &str) -> Self {
        Self::new(
            FtpdErrorKind::NotRegularFile,
            format!("{} is not a regular file", path),
        )
    }

    pub fn invalid_range(start: u64, end: u64) -> Self {
        Self::new(
            FtpdErrorKind::InvalidRange,
            format!("invalid range {}-{}", start, end),
        )
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(FtpdErrorKind::InvalidArgument, msg)
    }

    pub fn unexpected_eof(expected: u64, got: u64) -> Self {
        Self::new(
            FtpdErrorKind::UnexpectedEof,
            format!("unexpected end of file after {} of {} bytes", got, expected),
        )
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(FtpdErrorKind::Io, msg)
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::new(FtpdErrorKind::Backend, msg)
    }

    pub fn tls_unavailable(msg: impl Into<String>) -> Self {
        Self::new(FtpdErrorKind::TlsUnavailable, msg)
    }

    pub fn tls_failed(msg: impl Into<String>) -> Self {
        Self::new(FtpdErrorKind::TlsFailed, msg)
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::new(FtpdErrorKind::Unsupported, msg)
    }

    pub fn disconnected(msg: impl Into<String>) -> Self {
        Self::new(FtpdErrorKind::Disconnected, msg)
    }

    pub fn line_too_long(limit: usize) -> Self {
        Self::new(
            FtpdErrorKind::LineTooLong,
            format!("command line longer than {} bytes", limit),
        )
    }

    pub fn outside_root(path: &str) -> Self {
        Self::new(
            FtpdErrorKind::OutsideRoot,
            format!("{} resolves outside the served directory", path),
        )
    }
}

impl fmt::Display for FtpdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FtpdError {}

impl From<std::io::Error> for FtpdError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(e.to_string()),
            std::io::ErrorKind::UnexpectedEof => {
                Self::new(FtpdErrorKind::UnexpectedEof, e.to_string())
            }
            _ => Self::io_error(e.to_string()),
        }
    }
}
