//! Per-connection session. Owns the control channel and the negotiated
//! state every handler reads and mutates.
//!
//! Lifecycle: `new()` → `run()` sends the greeting, then reads one command
//! at a time and hands it to `dispatch()` until QUIT or end of stream.
//!
//! Handlers live in `negotiation.rs`, `status.rs`, `hashing.rs`,
//! `file_ops.rs` and `directory.rs` as further `impl` blocks.

use crate::ftpd::connection::{ControlChannel, ControlStream};
use crate::ftpd::digest::HashAlgorithm;
use crate::ftpd::driver::{ClientDriver, ServerDriver};
use crate::ftpd::error::{FtpdErrorKind, FtpdResult};
use crate::ftpd::protocol::{self, STATUS_SERVICE_READY, STATUS_SYNTAX_ERROR_NOT_RECOGNISED};
use crate::ftpd::types::{ServerSettings, TransferType};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

/// One connected client.
pub struct ClientHandler<S> {
    pub id: String,
    pub(crate) settings: Arc<ServerSettings>,
    pub(crate) server_driver: Arc<dyn ServerDriver>,
    pub(crate) driver: Arc<dyn ClientDriver>,
    pub(crate) channel: ControlChannel<S>,
    pub(crate) peer_addr: Option<SocketAddr>,
    pub(crate) connected_at: DateTime<Utc>,
    /// Authenticated user, empty until login.
    pub(crate) user: String,
    /// Name declared through CLNT. Advisory only.
    pub(crate) clnt: String,
    /// PROT P was requested for data transfers.
    pub(crate) transfer_tls: bool,
    pub(crate) selected_hash: HashAlgorithm,
    pub(crate) transfer_type: TransferType,
}

impl<S: ControlStream> ClientHandler<S> {
    pub fn new(
        stream: S,
        peer_addr: Option<SocketAddr>,
        settings: Arc<ServerSettings>,
        server_driver: Arc<dyn ServerDriver>,
        driver: Arc<dyn ClientDriver>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            settings,
            server_driver,
            driver,
            channel: ControlChannel::new(stream),
            peer_addr,
            connected_at: Utc::now(),
            user: String::new(),
            clnt: String::new(),
            transfer_tls: false,
            selected_hash: HashAlgorithm::DEFAULT,
            transfer_type: TransferType::default(),
        }
    }

    // ─── Session loop ────────────────────────────────────────────

    /// Greet the client, then serve commands until QUIT or disconnect.
    pub async fn run(&mut self) -> FtpdResult<()> {
        info!("FTP session {} started from {}", self.id, self.peer_label());
        let banner = self.settings.banner.clone();
        let result = match self.write_message(STATUS_SERVICE_READY, &banner).await {
            Ok(()) => self.serve().await,
            Err(e) => Err(e),
        };
        info!("FTP session {} ended", self.id);
        result
    }

    async fn serve(&mut self) -> FtpdResult<()> {
        loop {
            let line = match self.channel.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) if e.kind == FtpdErrorKind::LineTooLong => {
                    warn!("FTP session {}: {}", self.id, e);
                    self.write_message(STATUS_SYNTAX_ERROR_NOT_RECOGNISED, "Command line too long")
                        .await?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            let (verb, param) = protocol::split_command(&line);
            self.dispatch(&verb, &param).await?;
            if self.channel.is_closed() {
                break;
            }
        }
        Ok(())
    }

    // ─── Replies ─────────────────────────────────────────────────

    /// Write one reply; line breaks in `message` produce a multi-line block.
    pub(crate) async fn write_message(&mut self, code: u16, message: &str) -> FtpdResult<()> {
        self.channel
            .send(&protocol::format_message(code, message))
            .await
    }

    /// Write a `code-header` / ` body` / `code footer` block.
    pub(crate) async fn write_multiline<L: AsRef<str>>(
        &mut self,
        code: u16,
        header: &str,
        body: &[L],
        footer: &str,
    ) -> FtpdResult<()> {
        self.channel
            .send(&protocol::format_multiline(code, header, body, footer))
            .await
    }

    // ─── State accessors ─────────────────────────────────────────

    /// Record the identity established by the authentication layer.
    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = user.into();
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn client_name(&self) -> &str {
        &self.clnt
    }

    /// Control channel runs under TLS.
    pub fn control_tls(&self) -> bool {
        self.channel.is_secure()
    }

    /// Data transfers must be protected (PROT P).
    pub fn transfer_tls(&self) -> bool {
        self.transfer_tls
    }

    pub fn selected_hash(&self) -> HashAlgorithm {
        self.selected_hash
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    pub(crate) fn peer_label(&self) -> String {
        self.peer_addr
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".into())
    }
}
