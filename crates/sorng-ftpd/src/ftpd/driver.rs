//! Storage / authorization backend contracts.
//!
//! `ServerDriver` answers server-wide questions (TLS). `ClientDriver` is the
//! per-session view of storage. A backend that can open a file already
//! positioned at an offset also implements `FileHandleProvider` and exposes
//! it through `ClientDriver::handle_provider`.

use crate::ftpd::error::{FtpdError, FtpdResult};
use crate::ftpd::types::{FileInfo, OpenFlags};
use rustls::ServerConfig;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncSeek};

/// An open file: readable, seekable, released on drop.
pub trait FileTransfer: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T> FileTransfer for T where T: AsyncRead + AsyncSeek + Send + Unpin {}

/// Server-wide driver.
pub trait ServerDriver: Send + Sync {
    /// TLS configuration for AUTH TLS, or why there is none.
    fn tls_config(&self) -> FtpdResult<Arc<ServerConfig>>;
}

/// Per-session storage driver.
#[async_trait::async_trait]
pub trait ClientDriver: Send + Sync {
    async fn stat(&self, path: &str) -> FtpdResult<FileInfo>;

    async fn open_file(
        &self,
        path: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> FtpdResult<Box<dyn FileTransfer>>;

    /// Offset-aware open, when the backend supports it.
    fn handle_provider(&self) -> Option<&dyn FileHandleProvider> {
        None
    }

    async fn read_dir(&self, path: &str) -> FtpdResult<Vec<FileInfo>> {
        Err(FtpdError::unsupported(format!("cannot list {}", path)))
    }

    async fn chmod(&self, path: &str, _mode: u32) -> FtpdResult<()> {
        Err(FtpdError::unsupported(format!("chmod not supported on {}", path)))
    }

    async fn chown(&self, path: &str, _uid: u32, _gid: Option<u32>) -> FtpdResult<()> {
        Err(FtpdError::unsupported(format!("chown not supported on {}", path)))
    }

    async fn symlink(&self, _target: &str, link: &str) -> FtpdResult<()> {
        Err(FtpdError::unsupported(format!("symlink not supported for {}", link)))
    }
}

/// Optional extension: hand out a file already positioned at `offset`.
#[async_trait::async_trait]
pub trait FileHandleProvider: Send + Sync {
    async fn get_handle(
        &self,
        path: &str,
        flags: OpenFlags,
        offset: u64,
    ) -> FtpdResult<Box<dyn FileTransfer>>;
}
