//! Cross-process exclusive access to the strip, via a filesystem marker.
//!
//! The DMA engine cannot tolerate two processes driving it at once, so every
//! invocation must hold the marker before touching the hardware. Presence of
//! the file means the strip is busy; atomic create-if-absent decides the
//! winner. The marker carries no owner PID and no expiry: a holder that
//! crashes leaves it behind, and the only recovery is deleting the file by
//! hand (the timeout message says so).

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Well-known marker location. Process-wide and deliberately not
/// configurable: concurrent invocations on one host must all contend for the
/// same file, whatever their arguments.
pub const LOCK_PATH: &str = "/tmp/ledfade.lock";

// ── Error type ──

/// Lock acquisition and release errors.
#[derive(Debug)]
pub enum LockError {
    /// The marker never disappeared within the poll budget.
    Timeout { path: PathBuf, polls: u32 },
    /// Filesystem failure creating or removing the marker. Fatal, no retry.
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Timeout { path, polls } => write!(
                f,
                "gave up waiting for lock marker {} to disappear after {} polls; \
                 if no other process is using the LEDs, a crashed holder may have \
                 left it behind: delete the file by hand",
                path.display(),
                polls
            ),
            LockError::Io { op, path, source } => {
                write!(f, "could not {op} lock marker {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LockError::Io { source, .. } => Some(source),
            LockError::Timeout { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LockError>;

// ── Configuration ──

/// Poll cadence and budget for acquisition.
///
/// Fixed constants, independent of the invocation's arguments. The defaults
/// bound the wait at roughly 30 seconds.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Sleep between create attempts while the marker exists.
    pub poll_interval: Duration,
    /// Failed attempts tolerated before giving up.
    pub max_polls: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        LockConfig {
            poll_interval: Duration::from_millis(100),
            max_polls: 300,
        }
    }
}

// ── Guard ──

/// Held exclusive access to the strip.
///
/// Acquiring creates the marker; [`release`](StripLock::release) removes it,
/// exactly once, consuming the guard. There is intentionally no `Drop`
/// cleanup: an abnormal exit leaves the marker in place, exactly as a
/// crashed process would, and the next acquirer's timeout message points at
/// it.
#[derive(Debug)]
pub struct StripLock {
    path: PathBuf,
}

impl StripLock {
    /// Acquire the process-wide marker at [`LOCK_PATH`].
    pub fn acquire(config: &LockConfig) -> Result<StripLock> {
        Self::acquire_at(Path::new(LOCK_PATH), config)
    }

    /// Acquire a marker at an explicit path.
    ///
    /// `create_new` is the correctness core: create-if-absent is atomic at
    /// the filesystem, so two racing processes never both win. `AlreadyExists`
    /// is the only retriable outcome; any other failure is immediately fatal.
    pub fn acquire_at(path: &Path, config: &LockConfig) -> Result<StripLock> {
        let mut polls: u32 = 0;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(_) => {
                    // The handle is dropped; the file's presence is the lock.
                    log::debug!("acquired lock marker {}", path.display());
                    return Ok(StripLock {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if polls >= config.max_polls {
                        return Err(LockError::Timeout {
                            path: path.to_path_buf(),
                            polls,
                        });
                    }
                    polls += 1;
                    thread::sleep(config.poll_interval);
                }
                Err(e) => {
                    return Err(LockError::Io {
                        op: "create",
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the marker, ending the hardware session.
    ///
    /// A failed removal is an error even after a successful fade: if the
    /// marker vanished underneath us, some other process or a human perturbed
    /// the lock, and the next acquirer's view of it is no longer reliable.
    pub fn release(self) -> Result<()> {
        std::fs::remove_file(&self.path).map_err(|e| LockError::Io {
            op: "remove",
            path: self.path.clone(),
            source: e,
        })?;
        log::debug!("released lock marker {}", self.path.display());
        Ok(())
    }
}
