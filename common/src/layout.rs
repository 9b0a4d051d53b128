//! Physical memory map of the reference board.
//!
//! Everything here is platform configuration, not protocol logic. The
//! addresses describe where the shared control region, the signal
//! transport blocks, the legacy fallback word and the output register
//! live; the protocol modules only ever see the named fields.

use crate::config::ConfigError;

pub const SHARED_MEM_BASE: u64 = 0xFF99_0000;
pub const SHARED_MEM_SIZE: usize = 0x1000;
pub const SHM_CMD_OFFSET: usize = 0x00;
pub const SHM_ACK_OFFSET: usize = 0x04;

/// Magic pattern for the acknowledgment word; only the upper 24 bits
/// are compared, the low byte carries the echoed command.
pub const ACK_MAGIC: u32 = 0xDEAD_BEEF;

pub const LEGACY_MEM_BASE: u64 = 0x4000_0000;
/// Written to the legacy word at receiver start-up; any value above 2
/// means "no fallback override".
pub const LEGACY_NO_OVERRIDE: u32 = 3;

/// Sender-side signal block (trigger + observation).
pub const SIGNAL_TX_BASE: u64 = 0xFF30_0000;
pub const SIG_TRIG_OFFSET: usize = 0x00;
pub const SIG_OBS_OFFSET: usize = 0x04;

/// Receiver-side signal block (status + mask + enable/disable).
pub const SIGNAL_RX_BASE: u64 = 0xFF31_0000;
pub const SIG_STATUS_OFFSET: usize = 0x10;
pub const SIG_MASK_OFFSET: usize = 0x14;
pub const SIG_ENABLE_OFFSET: usize = 0x18;
pub const SIG_DISABLE_OFFSET: usize = 0x1C;

/// Channel bit the sender writes into the trigger register.
pub const MASK_RECEIVER_CH: u32 = 0x100;
/// Source bit the receiver sees in its status register.
pub const MASK_SENDER_SRC: u32 = 0x01;

pub const OUTPUT_BASE: u64 = 0x8000_0000;
pub const OUTPUT_DATA_OFFSET: usize = 0x00;
pub const OUTPUT_DIR_OFFSET: usize = 0x04;

#[derive(Debug, Clone)]
pub struct PlatformLayout {
    pub shared_base: u64,
    pub shared_size: usize,
    pub cmd_offset: usize,
    pub ack_offset: usize,
    pub ack_magic: u32,

    pub legacy_base: u64,

    pub signal_tx_base: u64,
    pub trig_offset: usize,
    pub obs_offset: usize,

    pub signal_rx_base: u64,
    pub status_offset: usize,
    pub mask_offset: usize,
    pub enable_offset: usize,
    pub disable_offset: usize,

    pub receiver_mask: u32,
    pub source_mask: u32,

    pub output_base: u64,
    pub output_data_offset: usize,
    pub output_dir_offset: usize,
}

impl Default for PlatformLayout {
    fn default() -> Self {
        Self {
            shared_base: SHARED_MEM_BASE,
            shared_size: SHARED_MEM_SIZE,
            cmd_offset: SHM_CMD_OFFSET,
            ack_offset: SHM_ACK_OFFSET,
            ack_magic: ACK_MAGIC,
            legacy_base: LEGACY_MEM_BASE,
            signal_tx_base: SIGNAL_TX_BASE,
            trig_offset: SIG_TRIG_OFFSET,
            obs_offset: SIG_OBS_OFFSET,
            signal_rx_base: SIGNAL_RX_BASE,
            status_offset: SIG_STATUS_OFFSET,
            mask_offset: SIG_MASK_OFFSET,
            enable_offset: SIG_ENABLE_OFFSET,
            disable_offset: SIG_DISABLE_OFFSET,
            receiver_mask: MASK_RECEIVER_CH,
            source_mask: MASK_SENDER_SRC,
            output_base: OUTPUT_BASE,
            output_data_offset: OUTPUT_DATA_OFFSET,
            output_dir_offset: OUTPUT_DIR_OFFSET,
        }
    }
}

impl PlatformLayout {
    /// Check the map once at start-up, before any region is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for &offset in &[self.cmd_offset, self.ack_offset] {
            if offset % 4 != 0 {
                return Err(ConfigError::UnalignedOffset(offset));
            }
            if offset + 4 > self.shared_size {
                return Err(ConfigError::OffsetOutOfRange(offset));
            }
        }
        if self.cmd_offset.abs_diff(self.ack_offset) < 4 {
            return Err(ConfigError::OverlappingWords);
        }
        if self.receiver_mask == 0 || self.source_mask == 0 {
            return Err(ConfigError::EmptyMask);
        }
        Ok(())
    }
}
