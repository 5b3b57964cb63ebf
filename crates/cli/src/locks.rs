//! Run lock
//!
//! A retention pass deletes real data, so two overlapping scheduled
//! invocations must never race each other. The lock is a flock'd file
//! under the state directory carrying the owner's PID; a lock left behind
//! by a dead process is detected and replaced.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Exclusive lock held for the duration of one retention run
pub struct RunLock {
    path: PathBuf,
    #[allow(dead_code)]
    file: File,
}

#[derive(Serialize, Deserialize)]
struct LockContent {
    pid: u32,
    started_at_ms: u64,
}

impl RunLock {
    /// Acquire the run lock under the given state directory.
    ///
    /// Fails when another live process holds it; a stale lock from a dead
    /// process is removed and acquisition retried.
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        let lock_path = state_dir.join("locks").join("run.lock");
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create lock directory")?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&lock_path)
            .context("Failed to open run lock file")?;

        if !try_flock_exclusive(&file)? {
            if Self::is_stale(&mut file)? {
                tracing::warn!("Removing stale run lock");
                drop(file);
                std::fs::remove_file(&lock_path)?;
                return Self::acquire(state_dir);
            }
            anyhow::bail!("Another retention run is already in progress");
        }

        Self::write_content(&mut file)?;
        Ok(Self {
            path: lock_path,
            file,
        })
    }

    fn is_stale(file: &mut File) -> Result<bool> {
        match Self::read_content(file) {
            Ok(content) => Ok(!is_process_alive(content.pid)),
            // Unreadable content: assume stale.
            Err(_) => Ok(true),
        }
    }

    fn write_content(file: &mut File) -> Result<()> {
        let content = LockContent {
            pid: std::process::id(),
            started_at_ms: now_ms(),
        };
        let serialized =
            serde_json::to_string(&content).context("Failed to serialize lock content")?;

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn read_content(file: &mut File) -> Result<LockContent> {
        file.seek(SeekFrom::Start(0))?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        serde_json::from_str(&raw).context("Failed to deserialize lock content")
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn try_flock_exclusive(file: &File) -> Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(_) => Ok(true),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(target_os = "linux")]
fn is_process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(target_os = "linux"))]
fn is_process_alive(_pid: u32) -> bool {
    // Conservative: assume the owner is alive when we cannot check.
    true
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
