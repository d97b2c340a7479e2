//! Scoped temp files and per-invocation work directories.
//!
//! Every temp input and conversion artifact is owned by a guard, so cleanup
//! happens on every exit path. Removal failures are logged and swallowed;
//! they never fail the invocation.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::warn;

use crate::Result;

static SEQ: AtomicU64 = AtomicU64::new(1);

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// `<prefix>_<millis>_<seq>` — the sequence number disambiguates concurrent
/// invocations that land on the same millisecond.
pub fn unique_stem(prefix: &str) -> String {
    let n = SEQ.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{}_{n}", now_millis())
}

/// A file path owned by one invocation, removed on drop.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    /// Reserve a uniquely named path under `dir`. The file itself is created
    /// by whoever writes to it (download, converter).
    pub fn reserve(dir: &Path, prefix: &str, ext: &str) -> Self {
        let path = dir.join(format!("{}.{ext}", unique_stem(prefix)));
        Self { path }
    }

    /// Take ownership of an existing file produced elsewhere.
    pub fn adopt(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove temp file {}: {e}", self.path.display()),
        }
    }
}

/// A per-invocation directory for rasterized pages, removed recursively on
/// drop.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    pub fn create(parent: &Path, prefix: &str) -> Result<Self> {
        let path = parent.join(unique_stem(prefix));
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove work dir {}: {e}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_stems_do_not_collide() {
        let a = unique_stem("temp");
        let b = unique_stem("temp");
        assert_ne!(a, b);
        assert!(a.starts_with("temp_"));
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path;
        {
            let temp = TempFile::reserve(dir.path(), "temp", "pdf");
            fs::write(temp.path(), b"%PDF-1.4").unwrap();
            path = temp.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn dropping_an_unwritten_temp_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let temp = TempFile::reserve(dir.path(), "temp", "pdf");
        drop(temp); // nothing was ever written; no panic, no error surfaced
    }

    #[test]
    fn work_dir_is_removed_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let path;
        {
            let work = WorkDir::create(dir.path(), "images").unwrap();
            fs::write(work.path().join("page-1.png"), b"png").unwrap();
            path = work.path().to_path_buf();
            assert!(path.is_dir());
        }
        assert!(!path.exists());
    }
}
