//! Resident control surface: a `write` FIFO taking an integer 0-3 and
//! a `status` file holding the last transaction outcome. The same
//! write/read contract the original kernel interface exposed, rendered
//! as plain files under a control directory.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use thiserror::Error;

use blink_common::hal::{ChannelHal, SignalSender};
use blink_common::sender::Transaction;
use blink_common::shared::CMD_RELEASE;

use crate::lock::{ChannelLock, LockError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("control directory error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot create control FIFO: {0}")]
    Fifo(nix::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("not an integer: {0:?}")]
    NotAnInteger(String),
    #[error("mode {0} out of range (must be 0-3)")]
    OutOfRange(u32),
}

pub struct ControlService {
    fifo: PathBuf,
    status: PathBuf,
}

impl ControlService {
    /// Create the control directory, the `write` FIFO and the `status`
    /// file (initially `NONE,NONE`).
    pub fn create(dir: &Path) -> Result<ControlService, ServiceError> {
        fs::create_dir_all(dir)?;
        let fifo = dir.join("write");
        if !fifo.exists() {
            mkfifo(&fifo, Mode::from_bits_truncate(0o622)).map_err(ServiceError::Fifo)?;
        }
        let status = dir.join("status");
        let service = ControlService { fifo, status };
        service.write_status("NONE,NONE")?;
        Ok(service)
    }

    pub fn fifo_path(&self) -> &Path {
        &self.fifo
    }

    pub fn status_path(&self) -> &Path {
        &self.status
    }

    /// Parse one request line. Out-of-range input is rejected before
    /// the channel is touched.
    pub fn parse_request(line: &str) -> Result<u32, ServiceError> {
        let mode: u32 = line
            .trim()
            .parse()
            .map_err(|_| ServiceError::NotAnInteger(line.trim().to_string()))?;
        if mode > CMD_RELEASE {
            return Err(ServiceError::OutOfRange(mode));
        }
        Ok(mode)
    }

    fn write_status(&self, line: &str) -> Result<(), ServiceError> {
        fs::write(&self.status, format!("{line}\n"))?;
        Ok(())
    }

    /// Serve requests forever. One transaction at a time: requests
    /// arrive line by line and are handled sequentially, and each send
    /// runs under the channel lock so the one-shot tool cannot overlap
    /// a transaction in flight.
    pub fn run<H>(
        &self,
        tx: &mut Transaction,
        hal: &mut H,
        lock: &ChannelLock,
    ) -> Result<(), ServiceError>
    where
        H: ChannelHal + SignalSender,
    {
        loop {
            // Opening the FIFO blocks until a writer shows up; EOF when
            // the last writer closes, then we reopen.
            let reader = BufReader::new(File::open(&self.fifo)?);
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match Self::parse_request(&line) {
                    Ok(mode) => {
                        let guard = lock.acquire()?;
                        match tx.send(hal, mode) {
                            Ok(()) => log::info!("mode {mode} acknowledged"),
                            Err(err) => log::warn!("mode {mode} failed: {err}"),
                        }
                        drop(guard);
                        self.write_status(&tx.status().to_string())?;
                    }
                    Err(err) => log::error!("rejected request {line:?}: {err}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_parse_within_range() {
        for (line, mode) in [("0", 0), (" 1\n", 1), ("2", 2), ("3", 3)] {
            assert_eq!(ControlService::parse_request(line).unwrap(), mode);
        }
    }

    #[test]
    fn out_of_range_and_garbage_are_rejected() {
        assert!(matches!(
            ControlService::parse_request("4"),
            Err(ServiceError::OutOfRange(4))
        ));
        assert!(matches!(
            ControlService::parse_request("fast"),
            Err(ServiceError::NotAnInteger(_))
        ));
        assert!(matches!(
            ControlService::parse_request("-1"),
            Err(ServiceError::NotAnInteger(_))
        ));
    }

    #[test]
    fn create_lays_out_the_control_directory() {
        let dir = tempfile::tempdir().unwrap();
        let service = ControlService::create(dir.path()).unwrap();

        assert!(service.fifo_path().exists());
        let status = fs::read_to_string(service.status_path()).unwrap();
        assert_eq!(status, "NONE,NONE\n");
    }

    #[test]
    fn create_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        ControlService::create(dir.path()).unwrap();
        ControlService::create(dir.path()).unwrap();
    }
}
