//! Explicit FTPS (RFC 4217): wraps a live plain control channel in TLS.

use crate::ftpd::connection::{ControlChannel, ControlStream};
use crate::ftpd::error::{FtpdError, FtpdResult};
use rustls::ServerConfig;
use std::sync::Arc;
use tokio::io::BufStream;
use tokio_rustls::TlsAcceptor;

/// Upgrade an existing **plain** control channel to TLS.
///
/// Called after the `234` reply has been flushed. Consumes the plain channel,
/// runs the server handshake on the same underlying stream and returns a
/// channel with fresh buffers bound to the TLS stream.
pub async fn upgrade_to_tls<S: ControlStream>(
    channel: ControlChannel<S>,
    config: Arc<ServerConfig>,
) -> FtpdResult<ControlChannel<S>> {
    let stream = channel.into_plain()?;
    let tls = TlsAcceptor::from(config)
        .accept(stream)
        .await
        .map_err(|e| FtpdError::tls_failed(format!("Explicit TLS handshake: {}", e)))?;
    Ok(ControlChannel::Tls(BufStream::new(tls)))
}
