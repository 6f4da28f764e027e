//! Driver over a local directory tree, backed by `tokio::fs`.
//!
//! Every protocol path is resolved below `root`; `..` and prefix components
//! are dropped. Symlinks are followed, so each access also checks that the
//! canonical target still lies below the canonical root.

use crate::ftpd::driver::{ClientDriver, FileHandleProvider, FileTransfer};
use crate::ftpd::error::{FtpdError, FtpdResult};
use crate::ftpd::types::{FileInfo, FileKind, OpenFlags};
use chrono::{DateTime, Utc};
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncSeekExt;

pub struct LocalDriver {
    root: PathBuf,
}

impl LocalDriver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a protocol path onto the local tree.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            if let Component::Normal(part) = component {
                resolved.push(part);
            }
        }
        resolved
    }

    /// `resolve` plus a check that symlinks do not lead out of the root.
    /// A path that does not exist yet is checked through its parent.
    async fn confine(&self, path: &str) -> FtpdResult<PathBuf> {
        let local = self.resolve(path);
        let root = fs::canonicalize(&self.root).await?;
        let canonical = match fs::canonicalize(&local).await {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match local.parent() {
                    Some(parent) => fs::canonicalize(parent).await?,
                    None => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        };
        if !canonical.starts_with(&root) {
            return Err(FtpdError::outside_root(path));
        }
        Ok(local)
    }

    async fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> FtpdResult<fs::File> {
        let mut options = OpenOptions::new();
        options
            .read(flags.read)
            .write(flags.write)
            .append(flags.append)
            .create(flags.create)
            .truncate(flags.truncate);
        #[cfg(unix)]
        options.mode(mode);
        #[cfg(not(unix))]
        let _ = mode;

        Ok(options.open(self.confine(path).await?).await?)
    }
}

fn file_info(name: String, meta: &std::fs::Metadata) -> FileInfo {
    let kind = if meta.is_file() {
        FileKind::File
    } else if meta.is_dir() {
        FileKind::Directory
    } else if meta.file_type().is_symlink() {
        FileKind::Symlink
    } else {
        FileKind::Other
    };

    #[cfg(unix)]
    let mode = {
        use std::os::unix::fs::PermissionsExt;
        Some(meta.permissions().mode())
    };
    #[cfg(not(unix))]
    let mode = None;

    FileInfo {
        name,
        kind,
        size: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
        mode,
    }
}

#[async_trait::async_trait]
impl ClientDriver for LocalDriver {
    async fn stat(&self, path: &str) -> FtpdResult<FileInfo> {
        let local = self.confine(path).await?;
        let meta = fs::metadata(&local).await?;
        let name = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".into());
        Ok(file_info(name, &meta))
    }

    async fn open_file(
        &self,
        path: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> FtpdResult<Box<dyn FileTransfer>> {
        let file = self.open(path, flags, mode).await?;
        Ok(Box::new(file))
    }

    fn handle_provider(&self) -> Option<&dyn FileHandleProvider> {
        Some(self)
    }

    async fn read_dir(&self, path: &str) -> FtpdResult<Vec<FileInfo>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(self.confine(path).await?).await?;
        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            entries.push(file_info(
                entry.file_name().to_string_lossy().into_owned(),
                &meta,
            ));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    #[cfg(unix)]
    async fn chmod(&self, path: &str, mode: u32) -> FtpdResult<()> {
        use std::os::unix::fs::PermissionsExt;
        let local = self.confine(path).await?;
        fs::set_permissions(local, std::fs::Permissions::from_mode(mode)).await?;
        Ok(())
    }

    #[cfg(unix)]
    async fn chown(&self, path: &str, uid: u32, gid: Option<u32>) -> FtpdResult<()> {
        let local = self.confine(path).await?;
        tokio::task::spawn_blocking(move || std::os::unix::fs::chown(local, Some(uid), gid))
            .await
            .map_err(|e| FtpdError::backend(format!("chown task: {}", e)))??;
        Ok(())
    }

    #[cfg(unix)]
    async fn symlink(&self, target: &str, link: &str) -> FtpdResult<()> {
        let target = self.confine(target).await?;
        fs::symlink(target, self.confine(link).await?).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl FileHandleProvider for LocalDriver {
    async fn get_handle(
        &self,
        path: &str,
        flags: OpenFlags,
        offset: u64,
    ) -> FtpdResult<Box<dyn FileTransfer>> {
        let mut file = self.open(path, flags, 0o666).await?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_stays_below_root() {
        let driver = LocalDriver::new("/srv/ftp");
        assert_eq!(driver.resolve("/a/b.txt"), PathBuf::from("/srv/ftp/a/b.txt"));
        assert_eq!(driver.resolve("a/../../etc/passwd"), PathBuf::from("/srv/ftp/a/etc/passwd"));
        assert_eq!(driver.resolve("/"), PathBuf::from("/srv/ftp"));
    }
}
