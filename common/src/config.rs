//! Timing parameters of the control channel.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("word offset {0:#x} falls outside the shared region")]
    OffsetOutOfRange(usize),
    #[error("word offset {0:#x} is not 4-byte aligned")]
    UnalignedOffset(usize),
    #[error("command and acknowledgment words overlap")]
    OverlappingWords,
    #[error("signal mask must have at least one bit set")]
    EmptyMask,
    #[error("acknowledgment timeout must exceed the poll interval")]
    TimeoutTooShort,
    #[error("poll interval must be nonzero")]
    ZeroPollInterval,
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    /// How long the sender polls for an acknowledgment before giving up.
    pub ack_timeout_us: u64,
    /// Interval between acknowledgment polls.
    pub poll_interval_us: u32,
    /// Settle delay after clearing the acknowledgment and after raising
    /// the signal, so the other core observes the writes in order.
    pub settle_us: u32,
    /// Grace period before the first acknowledgment poll, giving the
    /// receiver time to take the interrupt.
    pub poll_grace_us: u32,
    /// Period of the receiver's autonomous mode-rotation timer.
    pub tick_period_ms: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            ack_timeout_us: 1_000_000,
            poll_interval_us: 100,
            settle_us: 10,
            poll_grace_us: 100,
            tick_period_ms: 10_000,
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_us == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.ack_timeout_us <= u64::from(self.poll_interval_us) {
            return Err(ConfigError::TimeoutTooShort);
        }
        Ok(())
    }
}
