//! Hardware access traits for the control channel.
//!
//! The same protocol code runs on the control core (over mapped
//! physical memory) and against the simulated board in tests; these
//! traits are the seam. The shared region is mapped identically on
//! both cores with no cache coherence assumed: every cross-core write
//! must be followed by [`ChannelHal::publish`] and every cross-core
//! read preceded by [`ChannelHal::refresh`].

/// Access to the shared control region, the legacy fallback word and a
/// time source. Required by both sides of the channel.
pub trait ChannelHal {
    /// Volatile read of a word in the shared control region.
    fn shm_read(&mut self, offset: usize) -> u32;

    /// Volatile write of a word in the shared control region.
    fn shm_write(&mut self, offset: usize, value: u32);

    /// Read the legacy fallback word. Must return a fresh view.
    fn legacy_read(&mut self) -> u32;

    /// Write the legacy fallback word and make it visible to the other
    /// core.
    fn legacy_write(&mut self, value: u32);

    /// Store barrier plus cache flush of a shared-region range, making
    /// prior writes visible to the other core.
    fn publish(&mut self, offset: usize, len: usize);

    /// Cache invalidate plus load fence of a shared-region range, so
    /// the next read observes the other core's writes.
    fn refresh(&mut self, offset: usize, len: usize);

    /// Monotonic microsecond clock.
    fn now_us(&self) -> u64;

    /// Bounded busy-wait or sleep.
    fn sleep_us(&mut self, us: u32);
}

/// Sending side of the signal transport.
pub trait SignalSender {
    /// Assert the channel bit in the trigger register.
    fn signal_raise(&mut self, mask: u32);

    /// Observation register: which raised channels are still pending
    /// at the receiver. Diagnostic only.
    fn signal_observe(&mut self) -> u32;
}

/// Receiving side of the signal transport.
pub trait SignalReceiver {
    /// Current pending source bits in the status register.
    fn signal_status(&mut self) -> u32;

    /// Clear pending source bits. Required before returning from the
    /// handler.
    fn signal_clear(&mut self, mask: u32);
}
