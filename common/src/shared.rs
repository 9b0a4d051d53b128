//! Wire format of the shared control region.
//!
//! Two 32-bit words: the command word (sender writes, receiver reads)
//! and the acknowledgment word (receiver writes, sender reads). A third
//! word in an independent legacy region selects a mode directly without
//! acknowledgment.

/// Command values 0..=2 select a blink mode directly.
pub const CMD_SLOW: u32 = 0;
pub const CMD_FAST: u32 = 1;
pub const CMD_RANDOM: u32 = 2;
/// Any command value >= 3 releases the override.
pub const CMD_RELEASE: u32 = 3;

/// The acknowledgment word is zero until the receiver has applied a
/// command.
pub const ACK_NONE: u32 = 0;

/// Largest command the acknowledgment echo can represent exactly.
pub const CMD_ECHO_MAX: u32 = 0xFF;

/// Build the acknowledgment for a command: the magic pattern in the
/// upper 24 bits, the command echoed in the low byte.
pub fn encode_ack(magic: u32, cmd: u32) -> u32 {
    (magic & 0xFFFF_FF00) | (cmd & 0xFF)
}

/// True if the word carries the magic pattern, whatever the echo says.
pub fn ack_has_magic(ack: u32, magic: u32) -> bool {
    (ack & 0xFFFF_FF00) == (magic & 0xFFFF_FF00)
}

/// The command byte echoed back by the receiver.
pub fn ack_echo(ack: u32) -> u32 {
    ack & 0xFF
}

/// A valid acknowledgment for this specific command: magic pattern
/// present and the low byte echoing the command.
pub fn ack_matches(ack: u32, magic: u32, cmd: u32) -> bool {
    ack_has_magic(ack, magic) && ack_echo(ack) == (cmd & 0xFF)
}
