#![no_std]

pub mod arbiter;
pub mod config;
pub mod dispatcher;
pub mod hal;
pub mod layout;
pub mod pattern;
pub mod sender;
pub mod shared;

pub use arbiter::{arbitrate, BlinkMode, ModeCell};
pub use config::ChannelConfig;
pub use dispatcher::{Dispatcher, SignalOutcome};
pub use hal::{ChannelHal, SignalReceiver, SignalSender};
pub use layout::PlatformLayout;
pub use pattern::PatternGenerator;
pub use sender::{SendError, Transaction};
