//! Session and server status: STAT (server form), SYST, NOOP, CLNT, TYPE, QUIT.

use crate::ftpd::client::ClientHandler;
use crate::ftpd::connection::ControlStream;
use crate::ftpd::error::FtpdResult;
use crate::ftpd::protocol::*;
use crate::ftpd::types::TransferType;
use chrono::Utc;
use log::{debug, info};

impl<S: ControlStream> ClientHandler<S> {
    /// Without a parameter STAT describes the session; with one it
    /// describes a path (see `directory.rs`).
    pub(crate) async fn handle_stat(&mut self, param: &str) -> FtpdResult<()> {
        if param.is_empty() {
            self.handle_stat_server().await
        } else {
            self.handle_stat_path(param).await
        }
    }

    async fn handle_stat_server(&mut self) -> FtpdResult<()> {
        let elapsed = (Utc::now() - self.connected_at).num_seconds().max(0) as u64;

        let mut lines = vec![format!(
            "Connected to {} from {} for {}",
            self.settings.listen_addr,
            self.peer_label(),
            format_duration(elapsed),
        )];
        if self.user.is_empty() {
            lines.push("Not logged in yet".to_string());
        } else {
            lines.push(format!("Logged in as {}", self.user));
        }
        lines.push(self.settings.banner.clone());

        self.write_multiline(STATUS_FILE_STATUS, "Server status", &lines, "End of status")
            .await
    }

    pub(crate) async fn handle_syst(&mut self) -> FtpdResult<()> {
        self.write_message(STATUS_SYSTEM_TYPE, "UNIX Type: L8").await
    }

    pub(crate) async fn handle_noop(&mut self) -> FtpdResult<()> {
        self.write_message(STATUS_OK, "OK").await
    }

    pub(crate) async fn handle_clnt(&mut self, param: &str) -> FtpdResult<()> {
        self.clnt = param.to_string();
        self.write_message(STATUS_OK, "Good to know").await
    }

    pub(crate) async fn handle_type(&mut self, param: &str) -> FtpdResult<()> {
        match param {
            "I" => {
                self.transfer_type = TransferType::Binary;
                self.write_message(STATUS_OK, "Type set to binary").await
            }
            "A" => {
                self.transfer_type = TransferType::Ascii;
                self.write_message(STATUS_OK, "Type set to ASCII").await
            }
            _ => {
                self.write_message(STATUS_SYNTAX_ERROR_NOT_RECOGNISED, "Not understood")
                    .await
            }
        }
    }

    pub(crate) async fn handle_quit(&mut self) -> FtpdResult<()> {
        self.write_message(STATUS_CLOSING_CONTROL_CONN, "Goodbye").await?;
        info!("FTP session {} quit", self.id);
        if let Err(e) = self.channel.shutdown().await {
            debug!("FTP session {} shutdown: {}", self.id, e);
        }
        Ok(())
    }
}

/// Whole-second duration in the `1h2m3s` form.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
