//! HASH (negotiated algorithm) and the legacy XCRC / MD5 / XMD5 / XSHA* verbs.
//!
//! ```text
//! HASH <file>                  213-Computing SHA-256 digest
//!                              213 SHA-256 0-5 2cf2…9824 <file>
//! XCRC <file> [start] [end]    250-Computing CRC32 digest
//!                              250 3610a686
//! ```
//!
//! Ranges only exist on the legacy verbs. HASH always covers the whole file;
//! RANG is not implemented.

use crate::ftpd::client::ClientHandler;
use crate::ftpd::connection::ControlStream;
use crate::ftpd::digest::{compute_hash, HashAlgorithm};
use crate::ftpd::error::{FtpdError, FtpdResult};
use crate::ftpd::protocol::*;
use crate::ftpd::types::FileInfo;
use log::warn;
use std::sync::Arc;

impl<S: ControlStream> ClientHandler<S> {
    pub(crate) async fn handle_hash(&mut self, param: &str) -> FtpdResult<()> {
        let algorithm = self.selected_hash;
        let info = match self.stat_regular_file(param, param).await? {
            Some(info) => info,
            None => return Ok(()),
        };
        let end = info.size;

        let digest = match self.hash_or_reply(param, algorithm, 0, end).await? {
            Some(digest) => digest,
            None => return Ok(()),
        };

        let name = algorithm.name();
        let reply = format!(
            "Computing {} digest\r\n{} {}-{} {} {}",
            name, name, 0, end, digest, param
        );
        self.write_message(STATUS_FILE_STATUS, &reply).await
    }

    /// `<file> [start] [end]`; missing bounds cover the whole file.
    pub(crate) async fn handle_legacy_hash(
        &mut self,
        param: &str,
        algorithm: HashAlgorithm,
    ) -> FtpdResult<()> {
        let args: Vec<&str> = param.splitn(3, ' ').collect();
        let path = args[0];

        let info = match self.stat_regular_file(path, param).await? {
            Some(info) => info,
            None => return Ok(()),
        };

        let (start, end) = match parse_range(&args[1..], info.size) {
            Ok(range) => range,
            Err(e) => {
                return self
                    .write_message(STATUS_SYNTAX_ERROR_PARAMETERS, &e.message)
                    .await
            }
        };

        let digest = match self.hash_or_reply(path, algorithm, start, end).await? {
            Some(digest) => digest,
            None => return Ok(()),
        };

        let reply = format!("Computing {} digest\r\n{}", algorithm.name(), digest);
        self.write_message(STATUS_FILE_OK, &reply).await
    }

    /// Stat `path` and require a regular file. Replies and returns `None`
    /// when the check fails.
    async fn stat_regular_file(
        &mut self,
        path: &str,
        param: &str,
    ) -> FtpdResult<Option<FileInfo>> {
        let info = match self.driver.stat(path).await {
            Ok(info) => info,
            Err(e) => {
                self.write_message(STATUS_ACTION_NOT_TAKEN, &format!("{}: {}", param, e))
                    .await?;
                return Ok(None);
            }
        };

        if !info.is_regular() {
            let err = FtpdError::not_regular_file(param);
            self.write_message(STATUS_ACTION_NOT_TAKEN_NO_FILE, &err.message)
                .await?;
            return Ok(None);
        }

        Ok(Some(info))
    }

    async fn hash_or_reply(
        &mut self,
        path: &str,
        algorithm: HashAlgorithm,
        start: u64,
        end: u64,
    ) -> FtpdResult<Option<String>> {
        let driver = Arc::clone(&self.driver);
        match compute_hash(driver.as_ref(), path, algorithm, start, end).await {
            Ok(digest) => Ok(Some(digest)),
            Err(e) => {
                warn!(
                    "FTP session {}: {} of {} failed: {}",
                    self.id, algorithm, path, e
                );
                self.write_message(STATUS_ACTION_NOT_TAKEN, &format!("{}: {}", path, e))
                    .await?;
                Ok(None)
            }
        }
    }
}

/// Parse optional `start` / `end` tokens against a file of `size` bytes.
pub fn parse_range(tokens: &[&str], size: u64) -> FtpdResult<(u64, u64)> {
    let start = match tokens.first() {
        Some(tok) => tok.parse::<u64>().map_err(|e| {
            FtpdError::invalid_argument(format!("invalid start offset {}: {}", tok, e))
        })?,
        None => 0,
    };
    let end = match tokens.get(1) {
        Some(tok) => tok.parse::<u64>().map_err(|e| {
            FtpdError::invalid_argument(format!("invalid end offset {}: {}", tok, e))
        })?,
        None => size,
    };

    if start > end || end > size {
        return Err(FtpdError::invalid_argument(format!(
            "invalid range {}-{} for a file of {} bytes",
            start, end, size
        )));
    }
    Ok((start, end))
}
