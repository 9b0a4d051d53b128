//! Receiving-side interrupt dispatcher.
//!
//! Runs in interrupt context on the real-time core: short, bounded,
//! never blocking. Clearing the pending bit in the status register
//! acknowledges the hardware signal itself; the protocol-level
//! acknowledgment is the word written back into the shared region.

use crate::arbiter::{BlinkMode, CommandEffect, ModeCell};
use crate::hal::{ChannelHal, SignalReceiver};
use crate::layout::PlatformLayout;
use crate::shared;

/// What one invocation of the handler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Status register read back zero: nothing pending. Cleared and
    /// ignored; never an error.
    Spurious,
    /// Pending bits belong to another channel. Cleared, no state
    /// change, no acknowledgment.
    Foreign,
    /// A mode command was applied and the override armed.
    Applied(BlinkMode),
    /// A release command dropped the override.
    Released,
}

pub struct Dispatcher {
    cmd_offset: usize,
    ack_offset: usize,
    ack_magic: u32,
    source_mask: u32,
}

impl Dispatcher {
    pub fn new(layout: &PlatformLayout) -> Dispatcher {
        Dispatcher {
            cmd_offset: layout.cmd_offset,
            ack_offset: layout.ack_offset,
            ack_magic: layout.ack_magic,
            source_mask: layout.source_mask,
        }
    }

    /// Interrupt entry point.
    pub fn handle_signal<H>(&self, hal: &mut H, cell: &ModeCell) -> SignalOutcome
    where
        H: ChannelHal + SignalReceiver,
    {
        // Capture the true hardware state before anything else.
        let status = hal.signal_status();

        if status == 0 {
            // Stuck or glitched line; clear everything and get out.
            hal.signal_clear(u32::MAX);
            return SignalOutcome::Spurious;
        }

        if status & self.source_mask == 0 {
            hal.signal_clear(u32::MAX);
            log::debug!("signal for foreign channel ignored (status {status:#010x})");
            return SignalOutcome::Foreign;
        }

        // Edge acknowledgment of the hardware signal, then a fresh view
        // of the command word.
        hal.signal_clear(self.source_mask);
        hal.refresh(self.cmd_offset, 4);
        let cmd = hal.shm_read(self.cmd_offset);

        let outcome = match cell.apply_command(cmd) {
            CommandEffect::Applied(mode) => {
                log::info!("command {cmd}: mode set to {mode:?} (override active)");
                SignalOutcome::Applied(mode)
            }
            CommandEffect::Released => {
                log::info!("command {cmd}: override released, tick resumes");
                SignalOutcome::Released
            }
        };

        let ack = shared::encode_ack(self.ack_magic, cmd);
        hal.shm_write(self.ack_offset, ack);
        hal.publish(self.ack_offset, 4);

        outcome
    }
}
