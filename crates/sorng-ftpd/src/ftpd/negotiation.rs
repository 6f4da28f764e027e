//! Capability negotiation: AUTH, PROT, PBSZ, FEAT, OPTS.

use crate::ftpd::client::ClientHandler;
use crate::ftpd::commands::LEGACY_HASH_VERBS;
use crate::ftpd::connection::{ControlChannel, ControlStream};
use crate::ftpd::digest::{HashAlgorithm, HASH_ALGORITHMS};
use crate::ftpd::error::FtpdResult;
use crate::ftpd::protocol::*;
use crate::ftpd::tls;
use log::{debug, info, warn};

/// FEAT entries every server advertises.
const BASE_FEATURES: [&str; 5] = ["CLNT", "UTF8", "SIZE", "MDTM", "REST STREAM"];

impl<S: ControlStream> ClientHandler<S> {
    // ─── AUTH ────────────────────────────────────────────────────

    /// AUTH TLS: acknowledge in plaintext, then swap the control channel for
    /// a TLS one over the same stream.
    pub(crate) async fn handle_auth(&mut self) -> FtpdResult<()> {
        if self.channel.is_secure() {
            return self
                .write_message(STATUS_BAD_COMMAND_SEQUENCE, "TLS is already active")
                .await;
        }

        let config = match self.server_driver.tls_config() {
            Ok(config) => config,
            Err(e) => {
                warn!("FTP session {}: no TLS config: {}", self.id, e);
                return self
                    .write_message(
                        STATUS_ACTION_NOT_TAKEN,
                        &format!("Cannot get a TLS config: {}", e),
                    )
                    .await;
            }
        };

        self.write_message(
            STATUS_AUTH_ACCEPTED,
            "AUTH command ok. Expecting TLS Negotiation.",
        )
        .await?;

        let plain = std::mem::replace(&mut self.channel, ControlChannel::Closed);
        self.channel = tls::upgrade_to_tls(plain, config).await?;
        info!("FTP session {} control channel upgraded to TLS", self.id);
        Ok(())
    }

    // ─── PROT / PBSZ ─────────────────────────────────────────────

    /// P for Private, anything else means Clear.
    pub(crate) async fn handle_prot(&mut self, param: &str) -> FtpdResult<()> {
        self.transfer_tls = param == "P";
        self.write_message(STATUS_OK, "OK").await
    }

    pub(crate) async fn handle_pbsz(&mut self) -> FtpdResult<()> {
        self.write_message(STATUS_OK, "Whatever").await
    }

    // ─── FEAT ────────────────────────────────────────────────────

    pub(crate) async fn handle_feat(&mut self) -> FtpdResult<()> {
        let mut features: Vec<String> = BASE_FEATURES.iter().map(|f| f.to_string()).collect();

        if !self.settings.disable_mlsd {
            features.push("MLSD".into());
        }
        if !self.settings.disable_mlst {
            features.push("MLST".into());
        }
        if !self.settings.disable_mfmt {
            features.push("MFMT".into());
        }
        if self.server_driver.tls_config().is_ok() {
            features.push("AUTH TLS".into());
        }
        if self.settings.enable_hash {
            features.push(hash_feature_line(self.selected_hash));
            features.extend(LEGACY_HASH_VERBS.iter().map(|v| v.to_string()));
        }

        self.write_multiline(STATUS_SYSTEM_STATUS, "Features:", &features, "End")
            .await
    }

    // ─── OPTS ────────────────────────────────────────────────────

    pub(crate) async fn handle_opts(&mut self, param: &str) -> FtpdResult<()> {
        let (option, value) = match param.split_once(' ') {
            Some((option, value)) => (option, Some(value)),
            None => (param, None),
        };

        if option.eq_ignore_ascii_case("UTF8") {
            return self.write_message(STATUS_OK, "I'm in UTF8 only anyway").await;
        }

        if option.eq_ignore_ascii_case("HASH") && self.settings.enable_hash {
            return match value {
                Some(name) => match HashAlgorithm::lookup(name) {
                    Some(algorithm) => {
                        debug!("FTP session {} selected hash {}", self.id, name);
                        self.selected_hash = algorithm;
                        self.write_message(STATUS_OK, name).await
                    }
                    None => {
                        self.write_message(
                            STATUS_SYNTAX_ERROR_PARAMETERS,
                            "Unknown algorithm, current selection not changed",
                        )
                        .await
                    }
                },
                None => {
                    let current = self.selected_hash.name();
                    self.write_message(STATUS_OK, current).await
                }
            };
        }

        self.write_message(STATUS_SYNTAX_ERROR_NOT_RECOGNISED, "Don't know this option")
            .await
    }
}

/// `CRC32;MD5;SHA-1;SHA-256*;SHA-512;` with the selection starred.
pub fn hash_feature_line(selected: HashAlgorithm) -> String {
    let mut line = String::new();
    for entry in HASH_ALGORITHMS {
        line.push_str(entry.name);
        if entry.algorithm == selected {
            line.push('*');
        }
        line.push(';');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_feature_line_marks_selection() {
        assert_eq!(
            hash_feature_line(HashAlgorithm::Sha256),
            "CRC32;MD5;SHA-1;SHA-256*;SHA-512;"
        );
        assert_eq!(
            hash_feature_line(HashAlgorithm::Crc32),
            "CRC32*;MD5;SHA-1;SHA-256;SHA-512;"
        );
    }
}
