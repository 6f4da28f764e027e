//! Shared fixtures: an in-memory driver that counts opens, seeks and
//! releases, a TLS config pair, and helpers to talk to a running session.

#![allow(dead_code)]

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use sorng_ftpd::{
    ClientDriver, ClientHandler, FileHandleProvider, FileInfo, FileTransfer, FtpdError,
    FtpdResult, OpenFlags, ServerDriver, ServerSettings,
};
use std::collections::{HashMap, HashSet};
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncSeek, AsyncWriteExt, BufReader, DuplexStream,
    ReadBuf,
};
use tokio::task::JoinHandle;

// ─── File handle ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct HandleStats {
    pub opens: AtomicUsize,
    pub offset_opens: AtomicUsize,
    pub seeks: AtomicUsize,
    pub released: AtomicUsize,
}

impl HandleStats {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
    pub fn offset_opens(&self) -> usize {
        self.offset_opens.load(Ordering::SeqCst)
    }
    pub fn seeks(&self) -> usize {
        self.seeks.load(Ordering::SeqCst)
    }
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// In-memory file; optionally fails every read at or past `fail_at`.
pub struct MemoryHandle {
    data: Vec<u8>,
    pos: u64,
    fail_at: Option<u64>,
    stats: Arc<HandleStats>,
}

impl AsyncRead for MemoryHandle {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if let Some(limit) = this.fail_at {
            if this.pos >= limit {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::Other,
                    "simulated read fault",
                )));
            }
        }
        let end = match this.fail_at {
            Some(limit) => (limit as usize).min(this.data.len()),
            None => this.data.len(),
        };
        let start = (this.pos as usize).min(end);
        let n = (end - start).min(buf.remaining());
        buf.put_slice(&this.data[start..start + n]);
        this.pos += n as u64;
        Poll::Ready(Ok(()))
    }
}

impl AsyncSeek for MemoryHandle {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        let this = self.get_mut();
        this.stats.seeks.fetch_add(1, Ordering::SeqCst);
        match position {
            SeekFrom::Start(offset) => {
                this.pos = offset;
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "only absolute seeks are supported",
            )),
        }
    }

    fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Poll::Ready(Ok(self.pos))
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

// ─── Driver ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryDriver {
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
    offset_capable: bool,
    fail_at: Option<u64>,
    pub stats: Arc<HandleStats>,
    pub chmods: Mutex<Vec<(String, u32)>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, data: &[u8]) -> Self {
        self.files.insert(path.to_string(), data.to_vec());
        self
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        self.dirs.insert(path.to_string());
        self
    }

    /// Also implement the offset-aware handle extension.
    pub fn offset_capable(mut self) -> Self {
        self.offset_capable = true;
        self
    }

    pub fn fail_reads_at(mut self, offset: u64) -> Self {
        self.fail_at = Some(offset);
        self
    }

    fn handle(&self, path: &str, offset: u64) -> FtpdResult<Box<dyn FileTransfer>> {
        let data = self
            .files
            .get(path)
            .ok_or_else(|| FtpdError::not_found("no such file or directory"))?;
        Ok(Box::new(MemoryHandle {
            data: data.clone(),
            pos: offset,
            fail_at: self.fail_at,
            stats: Arc::clone(&self.stats),
        }))
    }
}

fn base_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[async_trait::async_trait]
impl ClientDriver for MemoryDriver {
    async fn stat(&self, path: &str) -> FtpdResult<FileInfo> {
        if let Some(data) = self.files.get(path) {
            return Ok(FileInfo::file(base_name(path), data.len() as u64));
        }
        if self.dirs.contains(path) {
            return Ok(FileInfo::directory(base_name(path)));
        }
        Err(FtpdError::not_found("no such file or directory"))
    }

    async fn open_file(
        &self,
        path: &str,
        _flags: OpenFlags,
        _mode: u32,
    ) -> FtpdResult<Box<dyn FileTransfer>> {
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        self.handle(path, 0)
    }

    fn handle_provider(&self) -> Option<&dyn FileHandleProvider> {
        if self.offset_capable {
            Some(self)
        } else {
            None
        }
    }

    async fn read_dir(&self, path: &str) -> FtpdResult<Vec<FileInfo>> {
        let prefix = format!("{}/", path);
        let mut entries: Vec<FileInfo> = self
            .files
            .iter()
            .filter(|(p, _)| p.starts_with(&prefix))
            .map(|(p, d)| FileInfo::file(base_name(p), d.len() as u64))
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn chmod(&self, path: &str, mode: u32) -> FtpdResult<()> {
        if !self.files.contains_key(path) {
            return Err(FtpdError::not_found("no such file or directory"));
        }
        self.chmods.lock().unwrap().push((path.to_string(), mode));
        Ok(())
    }
}

#[async_trait::async_trait]
impl FileHandleProvider for MemoryDriver {
    async fn get_handle(
        &self,
        path: &str,
        _flags: OpenFlags,
        offset: u64,
    ) -> FtpdResult<Box<dyn FileTransfer>> {
        self.stats.offset_opens.fetch_add(1, Ordering::SeqCst);
        self.handle(path, offset)
    }
}

// ─── Server driver / TLS ─────────────────────────────────────────────

pub struct TestServer {
    pub tls: Option<Arc<ServerConfig>>,
}

impl TestServer {
    pub fn plain() -> Self {
        Self { tls: None }
    }

    pub fn with_tls(config: Arc<ServerConfig>) -> Self {
        Self { tls: Some(config) }
    }
}

impl ServerDriver for TestServer {
    fn tls_config(&self) -> FtpdResult<Arc<ServerConfig>> {
        self.tls
            .clone()
            .ok_or_else(|| FtpdError::tls_unavailable("no certificate configured"))
    }
}

/// Self-signed `localhost` server config and a client config trusting it.
pub fn tls_configs() -> (Arc<ServerConfig>, Arc<ClientConfig>) {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_der = CertificateDer::from(cert.serialize_der().unwrap());
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(cert.serialize_private_key_der()));

    let server = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der.clone()], key_der)
        .unwrap();

    let mut roots = RootCertStore::empty();
    roots.add(cert_der).unwrap();
    let client = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    (Arc::new(server), Arc::new(client))
}

// ─── Session helpers ─────────────────────────────────────────────────

pub type SessionTask = JoinHandle<(ClientHandler<DuplexStream>, FtpdResult<()>)>;

pub fn hash_settings() -> ServerSettings {
    ServerSettings {
        enable_hash: true,
        banner: "test server".into(),
        ..ServerSettings::default()
    }
}

/// Build a handler on one end of a duplex pipe; the other end is returned.
pub fn handler(
    settings: ServerSettings,
    server: TestServer,
    driver: Arc<dyn ClientDriver>,
) -> (ClientHandler<DuplexStream>, DuplexStream) {
    let (client, server_side) = tokio::io::duplex(256 * 1024);
    let handler = ClientHandler::new(
        server_side,
        Some("127.0.0.1:50000".parse().unwrap()),
        Arc::new(settings),
        Arc::new(server),
        driver,
    );
    (handler, client)
}

/// Run a handler in the background; returns it with its result once done.
pub fn spawn(mut handler: ClientHandler<DuplexStream>) -> SessionTask {
    tokio::spawn(async move {
        let result = handler.run().await;
        (handler, result)
    })
}

/// Start a session and consume its greeting.
pub async fn start(
    settings: ServerSettings,
    server: TestServer,
    driver: Arc<dyn ClientDriver>,
) -> (BufReader<DuplexStream>, SessionTask) {
    let (h, client) = handler(settings, server, driver);
    let task = spawn(h);
    let mut client = BufReader::new(client);
    let greeting = read_reply(&mut client).await;
    assert!(greeting.starts_with("220 "), "{}", greeting);
    (client, task)
}

/// Read one complete reply, multi-line blocks included, CRLFs kept.
pub async fn read_reply<R: AsyncBufRead + Unpin>(reader: &mut R) -> String {
    let mut first = String::new();
    let n = reader.read_line(&mut first).await.unwrap();
    assert!(n > 0, "connection closed while waiting for a reply");
    let mut out = first.clone();
    if first.as_bytes().get(3) == Some(&b'-') {
        let terminator = format!("{} ", &first[..3]);
        loop {
            let mut line = String::new();
            let n = reader.read_line(&mut line).await.unwrap();
            assert!(n > 0, "connection closed inside a multi-line reply");
            out.push_str(&line);
            if line.starts_with(&terminator) {
                break;
            }
        }
    }
    out
}

/// Send one command line and return its reply.
pub async fn command(client: &mut BufReader<DuplexStream>, line: &str) -> String {
    client
        .get_mut()
        .write_all(format!("{}\r\n", line).as_bytes())
        .await
        .unwrap();
    read_reply(client).await
}

/// QUIT and hand back the finished handler.
pub async fn quit(
    mut client: BufReader<DuplexStream>,
    task: SessionTask,
) -> ClientHandler<DuplexStream> {
    assert_eq!(command(&mut client, "QUIT").await, "221 Goodbye\r\n");
    let (handler, result) = task.await.unwrap();
    assert!(result.is_ok(), "{:?}", result.err());
    handler
}
