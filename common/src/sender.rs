//! Sending-side transaction module.
//!
//! One reusable implementation of the clear-ack / write-command /
//! signal / poll-for-ack handshake, instantiated by both the one-shot
//! tool and the resident service. A [`Transaction`] issues one
//! handshake at a time; callers that can race must serialize around
//! it for the whole transaction.

use core::fmt;

use thiserror::Error;

use crate::config::ChannelConfig;
use crate::hal::{ChannelHal, SignalSender};
use crate::layout::PlatformLayout;
use crate::shared;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The acknowledgment echo is one byte; larger commands would
    /// alias and are refused before the channel is touched.
    #[error("mode {0} does not fit the acknowledgment echo (max 255)")]
    InvalidMode(u32),
    /// No valid acknowledgment within the configured window. The
    /// command word is left as written; the caller decides whether to
    /// retry.
    #[error("timed out waiting for acknowledgment (last ack word {last_ack:#010x})")]
    AckTimeout { last_ack: u32 },
}

/// Outcome of the most recent transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionRecord {
    pub mode: u32,
    pub acked: bool,
}

/// Status line exposed to external callers: `"<mode>,ACK"`,
/// `"<mode>,NOACK"`, or `"NONE,NONE"` before any transaction.
#[derive(Debug, Clone, Copy)]
pub struct Status(Option<TransactionRecord>);

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "NONE,NONE"),
            Some(rec) => write!(f, "{},{}", rec.mode, if rec.acked { "ACK" } else { "NOACK" }),
        }
    }
}

pub struct Transaction {
    cmd_offset: usize,
    ack_offset: usize,
    ack_magic: u32,
    receiver_mask: u32,
    cfg: ChannelConfig,
    record: Option<TransactionRecord>,
}

impl Transaction {
    pub fn new(layout: &PlatformLayout, cfg: ChannelConfig) -> Transaction {
        Transaction {
            cmd_offset: layout.cmd_offset,
            ack_offset: layout.ack_offset,
            ack_magic: layout.ack_magic,
            receiver_mask: layout.receiver_mask,
            cfg,
            record: None,
        }
    }

    pub fn last(&self) -> Option<TransactionRecord> {
        self.record
    }

    pub fn status(&self) -> Status {
        Status(self.record)
    }

    /// Run one full transaction: clear the stale acknowledgment, write
    /// the command, raise the signal, then poll until the receiver
    /// echoes the command back under the magic pattern or the timeout
    /// elapses. Never retries on its own.
    pub fn send<H>(&mut self, hal: &mut H, mode: u32) -> Result<(), SendError>
    where
        H: ChannelHal + SignalSender,
    {
        if mode > shared::CMD_ECHO_MAX {
            return Err(SendError::InvalidMode(mode));
        }

        // A stale acknowledgment from the previous transaction must
        // never satisfy this one.
        hal.shm_write(self.ack_offset, shared::ACK_NONE);
        hal.publish(self.ack_offset, 4);
        hal.sleep_us(self.cfg.settle_us);

        hal.shm_write(self.cmd_offset, mode);
        hal.publish(self.cmd_offset, 4);

        log::debug!("command {mode} written, raising signal (mask {:#x})", self.receiver_mask);
        hal.signal_raise(self.receiver_mask);
        hal.sleep_us(self.cfg.settle_us);

        hal.sleep_us(self.cfg.poll_grace_us);
        let deadline = hal.now_us().saturating_add(self.cfg.ack_timeout_us);
        let mut ack;
        loop {
            hal.refresh(self.ack_offset, 4);
            ack = hal.shm_read(self.ack_offset);
            if shared::ack_matches(ack, self.ack_magic, mode) {
                self.record = Some(TransactionRecord { mode, acked: true });
                log::debug!("acknowledged: mode {mode} (ack {ack:#010x})");
                return Ok(());
            }
            if hal.now_us() >= deadline {
                break;
            }
            hal.sleep_us(self.cfg.poll_interval_us);
        }

        self.record = Some(TransactionRecord { mode, acked: false });
        log::warn!(
            "no acknowledgment for mode {mode} within {} us (last ack {ack:#010x})",
            self.cfg.ack_timeout_us
        );
        Err(SendError::AckTimeout { last_ack: ack })
    }
}


#[cfg(test)]
mod status_tests {
    use super::*;

    struct Render([u8; 16], usize);

    impl fmt::Write for Render {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0[self.1..self.1 + s.len()].copy_from_slice(s.as_bytes());
            self.1 += s.len();
            Ok(())
        }
    }

    fn render(status: Status) -> Render {
        use fmt::Write;
        let mut out = Render([0; 16], 0);
        write!(out, "{status}").unwrap();
        out
    }

    #[test]
    fn status_line_states() {
        let out = render(Status(None));
        assert_eq!(&out.0[..out.1], b"NONE,NONE");

        let out = render(Status(Some(TransactionRecord { mode: 1, acked: true })));
        assert_eq!(&out.0[..out.1], b"1,ACK");

        let out = render(Status(Some(TransactionRecord { mode: 3, acked: false })));
        assert_eq!(&out.0[..out.1], b"3,NOACK");
    }
}
