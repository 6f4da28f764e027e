//! Hash algorithm registry and range-aware file hashing.
//!
//! The registry is a fixed, process-wide table: it is the single source of
//! truth for protocol names, and names are recovered from an algorithm by
//! walking it.

use crate::ftpd::driver::{ClientDriver, FileTransfer};
use crate::ftpd::error::{FtpdError, FtpdResult};
use crate::ftpd::types::OpenFlags;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::io::SeekFrom;
use std::str::FromStr;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithms offered by HASH and the legacy X* verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Crc32,
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

/// Registry entry: protocol name, algorithm, engine factory.
pub struct DigestEntry {
    pub name: &'static str,
    pub algorithm: HashAlgorithm,
    factory: fn() -> DigestEngine,
}

/// Every supported algorithm, in FEAT order.
pub static HASH_ALGORITHMS: &[DigestEntry] = &[
    DigestEntry {
        name: "CRC32",
        algorithm: HashAlgorithm::Crc32,
        factory: new_crc32,
    },
    DigestEntry {
        name: "MD5",
        algorithm: HashAlgorithm::Md5,
        factory: new_md5,
    },
    DigestEntry {
        name: "SHA-1",
        algorithm: HashAlgorithm::Sha1,
        factory: new_sha1,
    },
    DigestEntry {
        name: "SHA-256",
        algorithm: HashAlgorithm::Sha256,
        factory: new_sha256,
    },
    DigestEntry {
        name: "SHA-512",
        algorithm: HashAlgorithm::Sha512,
        factory: new_sha512,
    },
];

fn new_crc32() -> DigestEngine {
    DigestEngine::Crc32(crc32fast::Hasher::new())
}
fn new_md5() -> DigestEngine {
    DigestEngine::Md5(Md5::new())
}
fn new_sha1() -> DigestEngine {
    DigestEngine::Sha1(Sha1::new())
}
fn new_sha256() -> DigestEngine {
    DigestEngine::Sha256(Sha256::new())
}
fn new_sha512() -> DigestEngine {
    DigestEngine::Sha512(Sha512::new())
}

impl HashAlgorithm {
    /// Algorithm a fresh session starts with.
    pub const DEFAULT: HashAlgorithm = HashAlgorithm::Sha256;

    /// Look a protocol name up in the registry (case-sensitive).
    pub fn lookup(name: &str) -> Option<HashAlgorithm> {
        HASH_ALGORITHMS
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.algorithm)
    }

    /// Protocol name, by reverse lookup.
    pub fn name(self) -> &'static str {
        HASH_ALGORITHMS
            .iter()
            .find(|e| e.algorithm == self)
            .map(|e| e.name)
            .unwrap_or("")
    }

    /// Fresh streaming engine for this algorithm.
    pub fn engine(self) -> FtpdResult<DigestEngine> {
        HASH_ALGORITHMS
            .iter()
            .find(|e| e.algorithm == self)
            .map(|e| (e.factory)())
            .ok_or_else(|| FtpdError::unknown_hash(&format!("{:?}", self)))
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = FtpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| FtpdError::unknown_hash(s))
    }
}

/// Streaming digest state.
pub enum DigestEngine {
    Crc32(crc32fast::Hasher),
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl DigestEngine {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Crc32(h) => h.update(data),
            Self::Md5(h) => h.update(data),
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    /// Lowercase hex of the digest. CRC32 is rendered big-endian.
    pub fn finalize_hex(self) -> String {
        match self {
            Self::Crc32(h) => hex::encode(h.finalize().to_be_bytes()),
            Self::Md5(h) => hex::encode(h.finalize()),
            Self::Sha1(h) => hex::encode(h.finalize()),
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

/// Hex digest of bytes `[start, end)` of `path`.
///
/// Prefers the driver's offset-aware open; otherwise opens generically and
/// seeks when `start > 0`. Exactly `end - start` bytes must be readable.
/// The handle is dropped on every return path.
pub async fn compute_hash(
    driver: &dyn ClientDriver,
    path: &str,
    algorithm: HashAlgorithm,
    start: u64,
    end: u64,
) -> FtpdResult<String> {
    if end < start {
        return Err(FtpdError::invalid_range(start, end));
    }
    let mut engine = algorithm.engine()?;

    let mut file = match driver.handle_provider() {
        Some(provider) => {
            provider
                .get_handle(path, OpenFlags::read_only(), start)
                .await?
        }
        None => {
            let mut file = driver
                .open_file(path, OpenFlags::read_only(), 0o777)
                .await?;
            if start > 0 {
                file.seek(SeekFrom::Start(start)).await?;
            }
            file
        }
    };

    stream_into(&mut file, &mut engine, end - start).await?;
    Ok(engine.finalize_hex())
}

async fn stream_into(
    file: &mut Box<dyn FileTransfer>,
    engine: &mut DigestEngine,
    len: u64,
) -> FtpdResult<()> {
    let mut buf = vec![0u8; BUF_SIZE];
    let mut remaining = len;
    while remaining > 0 {
        let want = remaining.min(BUF_SIZE as u64) as usize;
        let n = file.read(&mut buf[..want]).await?;
        if n == 0 {
            return Err(FtpdError::unexpected_eof(len, len - remaining));
        }
        engine.update(&buf[..n]);
        remaining -= n as u64;
    }
    Ok(())
}

/// Hex digest of an in-memory buffer.
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> FtpdResult<String> {
    let mut engine = algorithm.engine()?;
    engine.update(data);
    Ok(engine.finalize_hex())
}
