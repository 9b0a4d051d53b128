//! In-memory stand-in for the two-core board.
//!
//! [`SimBoard`] models the shared control region, the signal transport
//! registers, the legacy fallback word, the output register and a
//! virtual clock. Each side of the channel holds its own [`SimHal`]
//! over one shared board, so the real sender transaction from
//! `blink-common` runs unmodified against the simulated receiver.

mod board;
mod rtcore;
mod slot;

pub use board::{SimBoard, SimHal};
pub use rtcore::RtCore;
pub use slot::SlotQueue;
