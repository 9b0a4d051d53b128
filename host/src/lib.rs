//! Control-core side of the blink channel.
//!
//! Maps the physical regions through `/dev/mem` and exposes the same
//! transaction module two ways: the `rpu-ctl` one-shot tool and the
//! `rpu-ctld` resident service with its file-like control surface.

pub mod devmem;
pub mod hal;
pub mod lock;
pub mod service;

pub use devmem::{MapError, PhysMap};
pub use hal::DevMemHal;
pub use lock::{ChannelLock, LockError, LockGuard};
pub use service::{ControlService, ServiceError};
