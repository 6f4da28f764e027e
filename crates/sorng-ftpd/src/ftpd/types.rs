//! Shared types for the server crate.

use crate::ftpd::error::{FtpdError, FtpdResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Server settings ─────────────────────────────────────────────────

/// Server-wide settings, shared read-only by every session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// Address the listener is bound to (reported by STAT).
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Greeting sent on connect and echoed by STAT.
    #[serde(default = "default_banner")]
    pub banner: String,
    /// Reject every SITE command.
    #[serde(default)]
    pub disable_site: bool,
    /// Advertise and accept HASH, OPTS HASH and the XCRC/XMD5/XSHA* verbs.
    #[serde(default)]
    pub enable_hash: bool,
    #[serde(default)]
    pub disable_mlsd: bool,
    #[serde(default)]
    pub disable_mlst: bool,
    #[serde(default)]
    pub disable_mfmt: bool,
}

fn default_listen_addr() -> String {
    "0.0.0.0:21".into()
}
fn default_banner() -> String {
    "sorng-ftpd ready".into()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            banner: default_banner(),
            disable_site: false,
            enable_hash: false,
            disable_mlsd: false,
            disable_mlst: false,
            disable_mfmt: false,
        }
    }
}

impl ServerSettings {
    /// Parse settings from a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> FtpdResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| FtpdError::invalid_argument(format!("invalid settings: {}", e)))
    }
}

// ─── File metadata ───────────────────────────────────────────────────

/// Type of a backend filesystem entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// What a driver's `stat` reports about a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub kind: FileKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Unix permission bits, when the backend has them.
    pub mode: Option<u32>,
}

impl FileInfo {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::File,
            size,
            modified: None,
            mode: None,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::Directory,
            size: 0,
            modified: None,
            mode: None,
        }
    }

    pub fn is_regular(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// MLSx fact line: `type=file;size=5;modify=20260101120000; name`.
    pub fn fact_line(&self) -> String {
        let kind = match self.kind {
            FileKind::File => "file",
            FileKind::Directory => "dir",
            FileKind::Symlink => "OS.unix=symlink",
            FileKind::Other => "OS.unix=special",
        };
        let mut line = format!("type={};size={};", kind, self.size);
        if let Some(modified) = self.modified {
            line.push_str(&format!("modify={};", modified.format("%Y%m%d%H%M%S")));
        }
        if let Some(mode) = self.mode {
            line.push_str(&format!("UNIX.mode={:04o};", mode & 0o7777));
        }
        line.push(' ');
        line.push_str(&self.name);
        line
    }
}

// ─── Open flags ──────────────────────────────────────────────────────

/// How a driver should open a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
}

impl OpenFlags {
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }
}

// ─── Transfer type ───────────────────────────────────────────────────

/// Transfer type (RFC 959 TYPE command).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransferType {
    Ascii,
    Binary,
}

impl Default for TransferType {
    fn default() -> Self {
        Self::Binary
    }
}
