//! `ChannelHal` over `/dev/mem` mappings.

use std::sync::atomic::{fence, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use blink_common::hal::{ChannelHal, SignalSender};
use blink_common::layout::PlatformLayout;

use crate::devmem::{MapError, PhysMap, DEV_MEM};

const SIGNAL_BLOCK_SIZE: usize = 0x1000;
const LEGACY_BLOCK_SIZE: usize = 0x1000;

pub struct DevMemHal {
    shared: PhysMap,
    signal: PhysMap,
    legacy: PhysMap,
    trig_offset: usize,
    obs_offset: usize,
    started: Instant,
}

impl DevMemHal {
    /// Map all three regions. Any failure is fatal before any shared
    /// state is mutated.
    pub fn open(layout: &PlatformLayout) -> Result<DevMemHal, MapError> {
        let shared = PhysMap::open(DEV_MEM, layout.shared_base, layout.shared_size)?;
        let signal = PhysMap::open(DEV_MEM, layout.signal_tx_base, SIGNAL_BLOCK_SIZE)?;
        let legacy = PhysMap::open(DEV_MEM, layout.legacy_base, LEGACY_BLOCK_SIZE)?;
        log::debug!(
            "mapped shared {:#x}, signal {:#x}, legacy {:#x}",
            layout.shared_base,
            layout.signal_tx_base,
            layout.legacy_base
        );
        Ok(DevMemHal {
            shared,
            signal,
            legacy,
            trig_offset: layout.trig_offset,
            obs_offset: layout.obs_offset,
            started: Instant::now(),
        })
    }
}

impl ChannelHal for DevMemHal {
    fn shm_read(&mut self, offset: usize) -> u32 {
        self.shared.read_u32(offset)
    }

    fn shm_write(&mut self, offset: usize, value: u32) {
        self.shared.write_u32(offset, value);
    }

    fn legacy_read(&mut self) -> u32 {
        self.legacy.read_u32(0)
    }

    fn legacy_write(&mut self, value: u32) {
        self.legacy.write_u32(0, value);
    }

    fn publish(&mut self, _offset: usize, _len: usize) {
        // The mapping is non-cached; ordering is all that is left to
        // enforce.
        fence(Ordering::SeqCst);
    }

    fn refresh(&mut self, _offset: usize, _len: usize) {
        fence(Ordering::SeqCst);
    }

    fn now_us(&self) -> u64 {
        self.started.elapsed().as_micros() as u64
    }

    fn sleep_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

impl SignalSender for DevMemHal {
    fn signal_raise(&mut self, mask: u32) {
        self.signal.write_u32(self.trig_offset, mask);
        fence(Ordering::SeqCst);
    }

    fn signal_observe(&mut self) -> u32 {
        self.signal.read_u32(self.obs_offset)
    }
}
