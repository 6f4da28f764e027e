//! Control-channel engine.
//!
//! Architecture:
//! - `types`: settings, file metadata, open flags, transfer type
//! - `error`: server-side error type
//! - `protocol`: reply codes and the single/multi-line reply grammar
//! - `connection`: control transport (plain or TLS) with its buffers
//! - `tls`: AUTH TLS upgrade of a live control channel
//! - `driver`: storage/authorization backend contracts
//! - `digest`: hash algorithm registry, digest engines, range hashing
//! - `client`: per-connection session state, reply writers, read loop
//! - `commands`: verb → handler dispatch
//! - `negotiation`: AUTH / PROT / PBSZ / FEAT / OPTS
//! - `status`: STAT (server), SYST, NOOP, CLNT, TYPE, QUIT
//! - `hashing`: HASH and the per-algorithm legacy verbs
//! - `file_ops`: SITE and its CHMOD / CHOWN / SYMLINK subcommands
//! - `directory`: STAT on a path
//! - `local`: `tokio::fs` backed driver rooted at a directory

pub mod types;
pub mod error;
pub mod protocol;
pub mod connection;
pub mod tls;
pub mod driver;
pub mod digest;
pub mod client;
pub mod commands;
pub mod negotiation;
pub mod status;
pub mod hashing;
pub mod file_ops;
pub mod directory;
pub mod local;

pub use types::*;
pub use error::{FtpdError, FtpdErrorKind, FtpdResult};
pub use client::ClientHandler;
pub use connection::ControlChannel;
pub use digest::{compute_hash, HashAlgorithm};
pub use driver::{ClientDriver, FileHandleProvider, FileTransfer, ServerDriver};
pub use local::LocalDriver;
