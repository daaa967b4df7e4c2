//! Single-writer discipline for the vault file.
//!
//! Every read-modify-write of a vault runs while holding a `WriteGuard`.
//! Within a process the guard holds a mutex; across processes it owns a
//! `<vault>.lock` sidecar created with `create_new`, which the OS makes
//! exclusive.  The sidecar records the holder's pid and is removed when the
//! guard drops.
//!
//! A sidecar left by a crashed process is reclaimed once its recorded pid
//! no longer exists (Unix only).  An empty or unreadable sidecar is never
//! reclaimed; it counts as held until the timeout.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{CredVaultError, Result};

/// How long a writer waits for another writer before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between attempts to create the sidecar.
const RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// Exclusive write lock for one vault file.
#[derive(Debug)]
pub struct WriteLock {
    lock_path: PathBuf,
    timeout: Duration,
    local: Mutex<()>,
}

impl WriteLock {
    pub fn new(vault_path: &Path, timeout: Duration) -> Self {
        Self {
            lock_path: lock_path_for(vault_path),
            timeout,
            local: Mutex::new(()),
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Block until this caller is the only writer, or the timeout expires.
    pub fn acquire(&self) -> Result<WriteGuard<'_>> {
        // A panic in another writer leaves no partial state behind (writes
        // are rename-based), so a poisoned mutex is still usable.
        let local = self
            .local
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let started = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.lock_path)
            {
                Ok(mut file) => {
                    // Without a pid the lock is never reclaimed, only timed out.
                    let _ = writeln!(file, "{}", std::process::id());
                    debug!(lock = %self.lock_path.display(), "acquired vault write lock");
                    return Ok(WriteGuard {
                        _local: local,
                        lock_path: &self.lock_path,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let holder = read_holder(&self.lock_path);
                    if let Some(pid) = holder {
                        if !process_alive(pid) && self.reclaim_stale(pid)? {
                            continue;
                        }
                    }

                    if started.elapsed() >= self.timeout {
                        warn!(
                            lock = %self.lock_path.display(),
                            holder = ?holder,
                            "gave up waiting for vault write lock"
                        );
                        return Err(CredVaultError::LockTimeout {
                            lock: self.lock_path.clone(),
                            holder: holder
                                .map(|pid| format!("pid {pid}"))
                                .unwrap_or_else(|| "an unknown process".into()),
                        });
                    }
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl WriteLock {
    /// Remove a sidecar whose holder `pid` has exited.
    ///
    /// The pid is read again right before removal so a sidecar that another
    /// writer just recreated is left alone.  Returns `true` if it was removed.
    fn reclaim_stale(&self, pid: u32) -> Result<bool> {
        if read_holder(&self.lock_path) != Some(pid) {
            return Ok(false);
        }
        match fs::remove_file(&self.lock_path) {
            Ok(()) => {
                warn!(
                    lock = %self.lock_path.display(),
                    pid,
                    "removed stale vault write lock left by an exited process"
                );
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

/// The pid recorded in a sidecar, if it holds one.
fn read_holder(lock_path: &Path) -> Option<u32> {
    fs::read_to_string(lock_path).ok()?.trim().parse().ok()
}

/// Whether `pid` names a running process.
#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return true;
    }
    // SAFETY: signal 0 performs only the existence and permission checks.
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Without a portable liveness check every holder is assumed alive.
#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Proof of exclusive write access.  Releases the lock on drop.
#[derive(Debug)]
pub struct WriteGuard<'a> {
    _local: MutexGuard<'a, ()>,
    lock_path: &'a Path,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(self.lock_path) {
            warn!(lock = %self.lock_path.display(), error = %e, "failed to remove vault write lock");
        }
    }
}

/// `<dir>/main.vault.json` -> `<dir>/main.vault.json.lock`
fn lock_path_for(vault_path: &Path) -> PathBuf {
    let mut name = vault_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    vault_path.with_file_name(name)
}
