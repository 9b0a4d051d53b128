//! The simulated board and its HAL.

use std::sync::atomic::{fence, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use blink_common::hal::{ChannelHal, SignalReceiver, SignalSender};
use blink_common::layout::PlatformLayout;

/// Shared hardware state visible to both simulated cores. Backed by
/// atomics so two OS threads can stand in for the two cores.
pub struct SimBoard {
    shared: Vec<AtomicU32>,
    legacy: AtomicU32,
    /// Receiver-side status register: pending source bits.
    pending: AtomicU32,
    output: AtomicU32,
    output_dir: AtomicU32,
    clock_us: AtomicU64,
    receiver_mask: u32,
    source_mask: u32,
}

impl SimBoard {
    pub fn new(layout: &PlatformLayout) -> Arc<SimBoard> {
        let words = layout.shared_size / 4;
        Arc::new(SimBoard {
            shared: (0..words).map(|_| AtomicU32::new(0)).collect(),
            legacy: AtomicU32::new(0),
            pending: AtomicU32::new(0),
            output: AtomicU32::new(0),
            output_dir: AtomicU32::new(u32::MAX),
            clock_us: AtomicU64::new(0),
            receiver_mask: layout.receiver_mask,
            source_mask: layout.source_mask,
        })
    }

    /// Open a HAL handle for one side of the channel.
    pub fn hal(self: &Arc<SimBoard>) -> SimHal {
        SimHal {
            board: Arc::clone(self),
        }
    }

    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::SeqCst)
    }

    /// Model another source asserting its bit in the receiver's status
    /// register.
    pub fn inject_pending(&self, bits: u32) {
        self.pending.fetch_or(bits, Ordering::SeqCst);
    }

    pub fn output(&self) -> u32 {
        self.output.load(Ordering::SeqCst)
    }

    pub fn write_output(&self, value: u32) {
        self.output.store(value, Ordering::SeqCst);
    }

    /// Direction register: 0 = all lines driven as outputs.
    pub fn set_output_direction(&self, tri: u32) {
        self.output_dir.store(tri, Ordering::SeqCst);
    }

    pub fn output_direction(&self) -> u32 {
        self.output_dir.load(Ordering::SeqCst)
    }

    pub fn legacy(&self) -> u32 {
        self.legacy.load(Ordering::SeqCst)
    }

    pub fn set_legacy(&self, value: u32) {
        self.legacy.store(value, Ordering::SeqCst);
    }

    pub fn now_us(&self) -> u64 {
        self.clock_us.load(Ordering::SeqCst)
    }

    fn word(&self, offset: usize) -> &AtomicU32 {
        debug_assert!(offset % 4 == 0, "unaligned shared access at {offset:#x}");
        &self.shared[offset / 4]
    }
}

/// One core's handle onto the board.
pub struct SimHal {
    board: Arc<SimBoard>,
}

impl SimHal {
    pub fn board(&self) -> &Arc<SimBoard> {
        &self.board
    }
}

impl ChannelHal for SimHal {
    fn shm_read(&mut self, offset: usize) -> u32 {
        self.board.word(offset).load(Ordering::SeqCst)
    }

    fn shm_write(&mut self, offset: usize, value: u32) {
        self.board.word(offset).store(value, Ordering::SeqCst);
    }

    fn legacy_read(&mut self) -> u32 {
        self.board.legacy.load(Ordering::SeqCst)
    }

    fn legacy_write(&mut self, value: u32) {
        self.board.legacy.store(value, Ordering::SeqCst);
    }

    fn publish(&mut self, _offset: usize, _len: usize) {
        fence(Ordering::SeqCst);
    }

    fn refresh(&mut self, _offset: usize, _len: usize) {
        fence(Ordering::SeqCst);
    }

    fn now_us(&self) -> u64 {
        self.board.clock_us.load(Ordering::SeqCst)
    }

    fn sleep_us(&mut self, us: u32) {
        // Virtual time; yield so the other "core" gets scheduled in
        // threaded tests.
        self.board.clock_us.fetch_add(u64::from(us), Ordering::SeqCst);
        std::thread::yield_now();
    }
}

impl SignalSender for SimHal {
    fn signal_raise(&mut self, mask: u32) {
        // The interconnect translates the trigger-side channel bit into
        // the receiver's source bit.
        if mask & self.board.receiver_mask != 0 {
            self.board
                .pending
                .fetch_or(self.board.source_mask, Ordering::SeqCst);
        }
    }

    fn signal_observe(&mut self) -> u32 {
        // Observation mirrors pendency until the receiver clears it.
        if self.board.pending.load(Ordering::SeqCst) & self.board.source_mask != 0 {
            self.board.receiver_mask
        } else {
            0
        }
    }
}

impl SignalReceiver for SimHal {
    fn signal_status(&mut self) -> u32 {
        self.board.pending.load(Ordering::SeqCst)
    }

    fn signal_clear(&mut self, mask: u32) {
        self.board.pending.fetch_and(!mask, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blink_common::hal::{SignalReceiver, SignalSender};

    #[test]
    fn raise_sets_source_bit_and_clear_drops_it() {
        let layout = PlatformLayout::default();
        let board = SimBoard::new(&layout);
        let mut tx = board.hal();
        let mut rx = board.hal();

        tx.signal_raise(layout.receiver_mask);
        assert_eq!(rx.signal_status(), layout.source_mask);
        assert_eq!(tx.signal_observe(), layout.receiver_mask);

        rx.signal_clear(layout.source_mask);
        assert_eq!(rx.signal_status(), 0);
        assert_eq!(tx.signal_observe(), 0);
    }

    #[test]
    fn foreign_trigger_bits_do_not_reach_this_channel() {
        let layout = PlatformLayout::default();
        let board = SimBoard::new(&layout);
        let mut tx = board.hal();
        let mut rx = board.hal();

        tx.signal_raise(0x4000);
        assert_eq!(rx.signal_status(), 0);
    }

    #[test]
    fn shared_words_are_visible_to_both_handles() {
        let board = SimBoard::new(&PlatformLayout::default());
        let mut a = board.hal();
        let mut b = board.hal();

        a.shm_write(0x04, 0xDEAD_BE01);
        assert_eq!(b.shm_read(0x04), 0xDEAD_BE01);
    }
}
