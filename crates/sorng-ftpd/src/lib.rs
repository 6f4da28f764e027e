//! # sorng-ftpd: FTP/FTPS Server Control Channel
//!
//! The command/reply engine of an FTP server, written against an abstract
//! storage driver so that protocol handling never touches a concrete
//! filesystem:
//! - **RFC 959**: command dispatch, single and multi-line replies, SITE, STAT
//! - **RFC 2228 / 4217**: AUTH TLS upgrade of a live control connection, PBSZ, PROT
//! - **RFC 2389**: FEAT / OPTS negotiation
//! - **draft-bryan-ftpext-hash**: HASH with a negotiated algorithm, plus the
//!   legacy XCRC / MD5 / XMD5 / XSHA* verbs with optional byte ranges
//!
//! Data-channel establishment and the listener live outside this crate.

pub mod ftpd;

pub use ftpd::*;
