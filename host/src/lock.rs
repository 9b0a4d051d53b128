//! Cross-process exclusion over the channel. The one-shot tool and the
//! resident service share the physical region, so each full transaction
//! runs under an advisory lock on a well-known file; the kernel drops
//! it when the holder exits.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use thiserror::Error;

pub const DEFAULT_LOCK_PATH: &str = "/run/rpu-ctl.lock";

#[derive(Debug, Error)]
pub enum LockError {
    #[error("cannot open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot lock {path}: {source}")]
    Acquire { path: PathBuf, source: Errno },
}

/// Handle on the lock file. Acquisition yields a [`LockGuard`]; the
/// exclusion lasts until the guard drops.
pub struct ChannelLock {
    path: PathBuf,
}

/// Held for the span of one transaction.
#[derive(Debug)]
pub struct LockGuard {
    _flock: Flock<File>,
}

impl ChannelLock {
    pub fn at(path: impl Into<PathBuf>) -> ChannelLock {
        ChannelLock { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(&self) -> Result<File, LockError> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|source| LockError::Open {
                path: self.path.clone(),
                source,
            })
    }

    /// Block until the channel is exclusively ours.
    pub fn acquire(&self) -> Result<LockGuard, LockError> {
        let file = self.open_file()?;
        let flock =
            Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, source)| LockError::Acquire {
                path: self.path.clone(),
                source,
            })?;
        Ok(LockGuard { _flock: flock })
    }

    /// Non-blocking variant: `None` while another sender holds the
    /// channel.
    pub fn try_acquire(&self) -> Result<Option<LockGuard>, LockError> {
        let file = self.open_file()?;
        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => Ok(Some(LockGuard { _flock: flock })),
            Err((_, Errno::EWOULDBLOCK)) => Ok(None),
            Err((_, source)) => Err(LockError::Acquire {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
