//! Verb → handler dispatch.
//!
//! Every handler writes exactly one reply (or closes the session on QUIT).
//! An `Err` coming back from here means the control transport failed.

use crate::ftpd::client::ClientHandler;
use crate::ftpd::connection::ControlStream;
use crate::ftpd::digest::HashAlgorithm;
use crate::ftpd::error::FtpdResult;
use crate::ftpd::protocol::STATUS_SYNTAX_ERROR_NOT_RECOGNISED;

/// Legacy per-algorithm verbs advertised next to HASH.
pub const LEGACY_HASH_VERBS: [&str; 7] =
    ["XCRC", "MD5", "XMD5", "XSHA", "XSHA1", "XSHA256", "XSHA512"];

/// Algorithm behind a legacy verb.
pub fn legacy_hash_algorithm(verb: &str) -> Option<HashAlgorithm> {
    match verb {
        "XCRC" => Some(HashAlgorithm::Crc32),
        "MD5" | "XMD5" => Some(HashAlgorithm::Md5),
        "XSHA" | "XSHA1" => Some(HashAlgorithm::Sha1),
        "XSHA256" => Some(HashAlgorithm::Sha256),
        "XSHA512" => Some(HashAlgorithm::Sha512),
        _ => None,
    }
}

impl<S: ControlStream> ClientHandler<S> {
    /// Run the handler registered for `verb` with its raw parameter.
    pub async fn dispatch(&mut self, verb: &str, param: &str) -> FtpdResult<()> {
        let verb = verb.to_ascii_uppercase();
        let hash_enabled = self.settings.enable_hash;

        match verb.as_str() {
            "AUTH" => self.handle_auth().await,
            "PROT" => self.handle_prot(param).await,
            "PBSZ" => self.handle_pbsz().await,
            "FEAT" => self.handle_feat().await,
            "OPTS" => self.handle_opts(param).await,
            "SYST" => self.handle_syst().await,
            "STAT" => self.handle_stat(param).await,
            "SITE" => self.handle_site(param).await,
            "NOOP" => self.handle_noop().await,
            "CLNT" => self.handle_clnt(param).await,
            "TYPE" => self.handle_type(param).await,
            "QUIT" => self.handle_quit().await,
            "HASH" if hash_enabled => self.handle_hash(param).await,
            other => match legacy_hash_algorithm(other) {
                Some(algorithm) if hash_enabled => {
                    self.handle_legacy_hash(param, algorithm).await
                }
                _ => {
                    self.write_message(
                        STATUS_SYNTAX_ERROR_NOT_RECOGNISED,
                        &format!("Unknown command {}", other),
                    )
                    .await
                }
            },
        }
    }
}
