//! Control-channel transport.
//!
//! The stream and its read/write buffers form one value. An AUTH TLS upgrade
//! consumes the plain variant and yields the TLS one, so no buffer can ever
//! outlive the stream it was bound to.

use crate::ftpd::error::{FtpdError, FtpdResult};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufStream,
};
use tokio_rustls::server::TlsStream;

/// Longest command line accepted, CRLF included.
pub const MAX_LINE_LEN: usize = 4096;

/// Any byte stream a control connection can run over.
pub trait ControlStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ControlStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Plain or TLS-wrapped control connection.
pub enum ControlChannel<S> {
    Plain(BufStream<S>),
    Tls(BufStream<TlsStream<S>>),
    /// After QUIT, or while an upgrade is in flight.
    Closed,
}

impl<S: ControlStream> ControlChannel<S> {
    pub fn new(stream: S) -> Self {
        Self::Plain(BufStream::new(stream))
    }

    /// Whether the control channel runs under TLS.
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Read one command line, without its CRLF. `None` at end of stream.
    ///
    /// Bytes that are not UTF-8 are replaced, never rejected. A line longer
    /// than `MAX_LINE_LEN` is skipped up to its newline and reported as
    /// `LineTooLong`; the channel stays usable.
    pub async fn read_line(&mut self) -> FtpdResult<Option<String>> {
        let raw = match self {
            Self::Plain(s) => read_capped(s).await?,
            Self::Tls(s) => read_capped(s).await?,
            Self::Closed => return Ok(None),
        };
        let raw = match raw {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let line = String::from_utf8_lossy(&raw)
            .trim_end_matches(|c| c == '\r' || c == '\n')
            .to_string();
        log::trace!(">>> {}", mask_password(&line));
        Ok(Some(line))
    }

    /// Write already-formatted reply text and flush it to the peer.
    pub async fn send(&mut self, text: &str) -> FtpdResult<()> {
        match self {
            Self::Plain(s) => {
                s.write_all(text.as_bytes()).await?;
                s.flush().await?;
            }
            Self::Tls(s) => {
                s.write_all(text.as_bytes()).await?;
                s.flush().await?;
            }
            Self::Closed => {
                return Err(FtpdError::disconnected("control channel is closed"));
            }
        }
        for line in text.lines() {
            log::trace!("<<< {}", line);
        }
        Ok(())
    }

    /// Flush, shut the stream down and leave the channel `Closed`.
    pub async fn shutdown(&mut self) -> FtpdResult<()> {
        let result = match self {
            Self::Plain(s) => s.shutdown().await,
            Self::Tls(s) => s.shutdown().await,
            Self::Closed => Ok(()),
        };
        *self = Self::Closed;
        result.map_err(FtpdError::from)
    }

    /// Release the raw stream of a plain channel for wrapping.
    pub fn into_plain(self) -> FtpdResult<S> {
        match self {
            Self::Plain(s) => Ok(s.into_inner()),
            Self::Tls(_) => Err(FtpdError::tls_failed(
                "cannot upgrade: connection is already TLS",
            )),
            Self::Closed => Err(FtpdError::disconnected("control channel is closed")),
        }
    }
}

async fn read_capped<R>(reader: &mut R) -> FtpdResult<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if n == MAX_LINE_LEN && !buf.ends_with(b"\n") {
        loop {
            buf.clear();
            let n = (&mut *reader)
                .take(MAX_LINE_LEN as u64)
                .read_until(b'\n', &mut buf)
                .await?;
            if n == 0 || buf.ends_with(b"\n") {
                break;
            }
        }
        return Err(FtpdError::line_too_long(MAX_LINE_LEN));
    }
    Ok(Some(buf))
}

fn mask_password(line: &str) -> String {
    match line.get(..5) {
        Some(verb) if verb.eq_ignore_ascii_case("PASS ") => "PASS ****".to_string(),
        _ => line.to_string(),
    }
}
