//! SITE and its file subcommands.
//!
//! ```text
//! SITE CHMOD 644 /path
//! SITE CHOWN 1000:1000 /path
//! SITE SYMLINK /target /link
//! ```

use crate::ftpd::client::ClientHandler;
use crate::ftpd::connection::ControlStream;
use crate::ftpd::error::FtpdResult;
use crate::ftpd::protocol::*;
use log::warn;

impl<S: ControlStream> ClientHandler<S> {
    pub(crate) async fn handle_site(&mut self, param: &str) -> FtpdResult<()> {
        if self.settings.disable_site {
            return self
                .write_message(STATUS_SYNTAX_ERROR_NOT_RECOGNISED, "SITE support is disabled")
                .await;
        }

        if let Some((sub, rest)) = param.split_once(' ') {
            match sub.to_ascii_uppercase().as_str() {
                "CHMOD" => return self.handle_chmod(rest).await,
                "CHOWN" => return self.handle_chown(rest).await,
                "SYMLINK" => return self.handle_symlink(rest).await,
                _ => {}
            }
        }

        self.write_message(
            STATUS_SYNTAX_ERROR_NOT_RECOGNISED,
            "Not understood SITE subcommand",
        )
        .await
    }

    async fn handle_chmod(&mut self, param: &str) -> FtpdResult<()> {
        let (mode, path) = match param.split_once(' ') {
            Some(parts) => parts,
            None => {
                return self
                    .write_message(STATUS_SYNTAX_ERROR_PARAMETERS, "Usage: SITE CHMOD <mode> <path>")
                    .await
            }
        };
        let mode = match u32::from_str_radix(mode, 8) {
            Ok(mode) => mode,
            Err(e) => {
                return self
                    .write_message(
                        STATUS_SYNTAX_ERROR_PARAMETERS,
                        &format!("invalid mode {}: {}", mode, e),
                    )
                    .await
            }
        };

        match self.driver.chmod(path, mode).await {
            Ok(()) => self.write_message(STATUS_OK, "SITE CHMOD command successful").await,
            Err(e) => {
                warn!("FTP session {}: chmod {}: {}", self.id, path, e);
                self.write_message(STATUS_ACTION_NOT_TAKEN, &format!("Couldn't chmod: {}", e))
                    .await
            }
        }
    }

    /// `<uid>[:<gid>] <path>`, numeric ids only.
    async fn handle_chown(&mut self, param: &str) -> FtpdResult<()> {
        let (owner, path) = match param.split_once(' ') {
            Some(parts) => parts,
            None => {
                return self
                    .write_message(
                        STATUS_SYNTAX_ERROR_PARAMETERS,
                        "Usage: SITE CHOWN <uid>[:<gid>] <path>",
                    )
                    .await
            }
        };
        let (uid, gid) = match parse_owner(owner) {
            Some(ids) => ids,
            None => {
                return self
                    .write_message(
                        STATUS_SYNTAX_ERROR_PARAMETERS,
                        &format!("invalid owner {}", owner),
                    )
                    .await
            }
        };

        match self.driver.chown(path, uid, gid).await {
            Ok(()) => self.write_message(STATUS_OK, "SITE CHOWN command successful").await,
            Err(e) => {
                warn!("FTP session {}: chown {}: {}", self.id, path, e);
                self.write_message(STATUS_ACTION_NOT_TAKEN, &format!("Couldn't chown: {}", e))
                    .await
            }
        }
    }

    async fn handle_symlink(&mut self, param: &str) -> FtpdResult<()> {
        let (target, link) = match param.split_once(' ') {
            Some(parts) => parts,
            None => {
                return self
                    .write_message(
                        STATUS_SYNTAX_ERROR_PARAMETERS,
                        "Usage: SITE SYMLINK <target> <link>",
                    )
                    .await
            }
        };

        match self.driver.symlink(target, link).await {
            Ok(()) => self.write_message(STATUS_OK, "SITE SYMLINK command successful").await,
            Err(e) => {
                warn!("FTP session {}: symlink {}: {}", self.id, link, e);
                self.write_message(STATUS_ACTION_NOT_TAKEN, &format!("Couldn't symlink: {}", e))
                    .await
            }
        }
    }
}

/// `1000` or `1000:100`.
fn parse_owner(owner: &str) -> Option<(u32, Option<u32>)> {
    match owner.split_once(':') {
        Some((uid, gid)) => Some((uid.parse().ok()?, Some(gid.parse().ok()?))),
        None => Some((owner.parse().ok()?, None)),
    }
}
