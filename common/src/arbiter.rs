//! Mode arbitration between the interrupt-delivered override, the
//! legacy fallback word and autonomous rotation.
//!
//! The cell is the only state shared between the interrupt handler,
//! the periodic timer callback and the producer task. Mode and
//! override flag live in one atomic word: the handler
//! ([`ModeCell::apply_command`]) stores it, the timer callback
//! ([`ModeCell::tick`]) compare-exchanges it so a command landing
//! mid-tick is never overwritten, and the producer just loads. No
//! lock, so the handler never blocks.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::shared;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BlinkMode {
    Slow = 0,
    Fast = 1,
    Random = 2,
}

impl BlinkMode {
    /// Interpret a command or legacy word. Values above 2 select no
    /// mode.
    pub fn from_word(raw: u32) -> Option<BlinkMode> {
        match raw {
            shared::CMD_SLOW => Some(BlinkMode::Slow),
            shared::CMD_FAST => Some(BlinkMode::Fast),
            shared::CMD_RANDOM => Some(BlinkMode::Random),
            _ => None,
        }
    }

    /// Round-robin successor: SLOW -> FAST -> RANDOM -> SLOW.
    pub fn next(self) -> BlinkMode {
        match self {
            BlinkMode::Slow => BlinkMode::Fast,
            BlinkMode::Fast => BlinkMode::Random,
            BlinkMode::Random => BlinkMode::Slow,
        }
    }

    fn from_raw(raw: u32) -> BlinkMode {
        // The cell only ever stores valid discriminants.
        BlinkMode::from_word(raw).unwrap_or(BlinkMode::Slow)
    }
}

/// What a delivered command did to the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEffect {
    /// Command 0..=2: the mode was applied and the override armed.
    Applied(BlinkMode),
    /// Command >= 3: the override was released; the periodic tick owns
    /// the mode again.
    Released,
}

/// One periodic-tick decision, as a pure function: while the override
/// is active the tick changes nothing; otherwise a legacy word in
/// 0..=2 pins that mode, and anything else rotates round-robin.
pub fn arbitrate(override_active: bool, legacy: u32, current: BlinkMode) -> BlinkMode {
    if override_active {
        return current;
    }
    match BlinkMode::from_word(legacy) {
        Some(mode) => mode,
        None => current.next(),
    }
}

/// Current output mode plus the override flag, packed into one word so
/// the pair is always read and written together.
pub struct ModeCell {
    state: AtomicU32,
}

const OVERRIDE_BIT: u32 = 1 << 31;

impl ModeCell {
    pub const fn new() -> ModeCell {
        ModeCell {
            state: AtomicU32::new(BlinkMode::Slow as u32),
        }
    }

    pub fn mode(&self) -> BlinkMode {
        BlinkMode::from_raw(self.state.load(Ordering::Acquire) & !OVERRIDE_BIT)
    }

    pub fn override_active(&self) -> bool {
        self.state.load(Ordering::Acquire) & OVERRIDE_BIT != 0
    }

    /// Interrupt-path update. Runs inside the handler; must not block.
    pub fn apply_command(&self, cmd: u32) -> CommandEffect {
        match BlinkMode::from_word(cmd) {
            Some(mode) => {
                self.state.store(mode as u32 | OVERRIDE_BIT, Ordering::Release);
                CommandEffect::Applied(mode)
            }
            None => {
                self.state.fetch_and(!OVERRIDE_BIT, Ordering::AcqRel);
                CommandEffect::Released
            }
        }
    }

    /// Periodic-tick update. Returns the mode in effect afterwards.
    /// Compare-exchange so a command applied between the load and the
    /// store restarts the decision instead of being clobbered.
    pub fn tick(&self, legacy: u32) -> BlinkMode {
        let mut state = self.state.load(Ordering::Acquire);
        loop {
            let current = BlinkMode::from_raw(state & !OVERRIDE_BIT);
            let next = arbitrate(state & OVERRIDE_BIT != 0, legacy, current);
            let updated = (state & OVERRIDE_BIT) | next as u32;
            if updated == state {
                return next;
            }
            match self
                .state
                .compare_exchange(state, updated, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    if BlinkMode::from_word(legacy).is_some() {
                        log::info!("tick: legacy fallback word set mode to {:?}", next);
                    } else {
                        log::info!("tick: switching to {:?} mode", next);
                    }
                    return next;
                }
                Err(observed) => state = observed,
            }
        }
    }
}

impl Default for ModeCell {
    fn default() -> Self {
        ModeCell::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_cycles_through_all_modes() {
        assert_eq!(BlinkMode::Slow.next(), BlinkMode::Fast);
        assert_eq!(BlinkMode::Fast.next(), BlinkMode::Random);
        assert_eq!(BlinkMode::Random.next(), BlinkMode::Slow);
    }

    #[test]
    fn override_freezes_the_tick() {
        for legacy in [0, 1, 2, 3, 9] {
            assert_eq!(arbitrate(true, legacy, BlinkMode::Fast), BlinkMode::Fast);
        }
    }

    #[test]
    fn legacy_in_range_pins_the_mode() {
        assert_eq!(arbitrate(false, 0, BlinkMode::Fast), BlinkMode::Slow);
        assert_eq!(arbitrate(false, 2, BlinkMode::Slow), BlinkMode::Random);
        // Same mode again: held, not rotated.
        assert_eq!(arbitrate(false, 1, BlinkMode::Fast), BlinkMode::Fast);
    }

    #[test]
    fn legacy_out_of_range_rotates() {
        assert_eq!(arbitrate(false, 3, BlinkMode::Slow), BlinkMode::Fast);
        assert_eq!(arbitrate(false, 0xFFFF_FFFF, BlinkMode::Random), BlinkMode::Slow);
    }

    #[test]
    fn cell_starts_slow_without_override() {
        let cell = ModeCell::new();
        assert_eq!(cell.mode(), BlinkMode::Slow);
        assert!(!cell.override_active());
    }

    #[test]
    fn command_arms_override_and_release_drops_it() {
        let cell = ModeCell::new();
        assert_eq!(
            cell.apply_command(2),
            CommandEffect::Applied(BlinkMode::Random)
        );
        assert!(cell.override_active());
        assert_eq!(cell.mode(), BlinkMode::Random);

        assert_eq!(cell.apply_command(5), CommandEffect::Released);
        assert!(!cell.override_active());
        // Release leaves the mode to the next tick.
        assert_eq!(cell.mode(), BlinkMode::Random);
    }

    #[test]
    fn tick_respects_override_then_fallback_then_rotation() {
        let cell = ModeCell::new();
        cell.apply_command(1);
        assert_eq!(cell.tick(0), BlinkMode::Fast); // override wins

        cell.apply_command(4);
        assert_eq!(cell.tick(0), BlinkMode::Slow); // fallback applies
        assert_eq!(cell.tick(9), BlinkMode::Fast); // rotation resumes
    }
}
