//! Simulated real-time core: dispatcher, periodic tick and the
//! producer/consumer pattern pipeline wired to one [`SimBoard`].

use std::sync::Arc;

use blink_common::arbiter::{BlinkMode, ModeCell};
use blink_common::config::{ChannelConfig, ConfigError};
use blink_common::dispatcher::{Dispatcher, SignalOutcome};
use blink_common::hal::ChannelHal;
use blink_common::layout::{PlatformLayout, LEGACY_NO_OVERRIDE};
use blink_common::pattern::{PatternGenerator, PatternStep};

use crate::board::{SimBoard, SimHal};
use crate::slot::SlotQueue;

pub struct RtCore {
    board: Arc<SimBoard>,
    hal: SimHal,
    dispatcher: Dispatcher,
    cell: ModeCell,
    queue: Arc<SlotQueue<u32>>,
    pattern: PatternGenerator,
}

impl RtCore {
    /// Start-up: validate the configuration, drive the output lines as
    /// outputs and park the legacy word out of range, exactly once.
    pub fn new(
        board: Arc<SimBoard>,
        layout: &PlatformLayout,
        cfg: ChannelConfig,
        seed: u64,
    ) -> Result<RtCore, ConfigError> {
        layout.validate()?;
        cfg.validate()?;

        let mut hal = board.hal();
        hal.legacy_write(LEGACY_NO_OVERRIDE);
        board.set_output_direction(0);

        Ok(RtCore {
            board,
            hal,
            dispatcher: Dispatcher::new(layout),
            cell: ModeCell::new(),
            queue: Arc::new(SlotQueue::new()),
            pattern: PatternGenerator::new(seed),
        })
    }

    /// Interrupt delivery: what the hardware would do when the trigger
    /// register is written.
    pub fn on_signal(&mut self) -> SignalOutcome {
        self.dispatcher.handle_signal(&mut self.hal, &self.cell)
    }

    /// The periodic timer callback.
    pub fn timer_tick(&mut self) -> BlinkMode {
        let legacy = self.hal.legacy_read();
        self.cell.tick(legacy)
    }

    /// One producer step: hold for the mode's cadence, then submit the
    /// next value, displacing any unconsumed one.
    pub fn producer_step(&mut self) -> PatternStep {
        let step = self.pattern.next(self.cell.mode());
        self.hal.sleep_us(step.hold_ms * 1000);
        self.queue.send_latest(step.value);
        step
    }

    /// One consumer step: take the freshest value and drive the output
    /// register. Returns the value written, if any was pending.
    pub fn consume(&mut self) -> Option<u32> {
        let value = self.queue.try_recv()?;
        self.board.write_output(value);
        Some(value)
    }

    pub fn mode(&self) -> BlinkMode {
        self.cell.mode()
    }

    pub fn override_active(&self) -> bool {
        self.cell.override_active()
    }

    pub fn queue(&self) -> Arc<SlotQueue<u32>> {
        Arc::clone(&self.queue)
    }

    pub fn board(&self) -> &Arc<SimBoard> {
        &self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> RtCore {
        let layout = PlatformLayout::default();
        let board = SimBoard::new(&layout);
        RtCore::new(board, &layout, ChannelConfig::default(), 11).unwrap()
    }

    #[test]
    fn startup_parks_legacy_and_drives_outputs() {
        let core = core();
        assert_eq!(core.board().legacy(), LEGACY_NO_OVERRIDE);
        assert_eq!(core.board().output_direction(), 0);
        assert_eq!(core.mode(), BlinkMode::Slow);
        assert!(!core.override_active());
    }

    #[test]
    fn bad_config_aborts_startup() {
        let layout = PlatformLayout::default();
        let board = SimBoard::new(&layout);
        let cfg = ChannelConfig {
            poll_interval_us: 0,
            ..ChannelConfig::default()
        };
        assert!(RtCore::new(board, &layout, cfg, 0).is_err());
    }

    #[test]
    fn producer_then_consumer_reaches_the_output_register() {
        let mut core = core();
        let step = core.producer_step();
        assert_eq!(core.consume(), Some(step.value));
        assert_eq!(core.board().output(), step.value);
        assert_eq!(core.consume(), None);
    }

    #[test]
    fn tick_rotates_when_legacy_is_parked() {
        let mut core = core();
        assert_eq!(core.timer_tick(), BlinkMode::Fast);
        assert_eq!(core.timer_tick(), BlinkMode::Random);
        assert_eq!(core.timer_tick(), BlinkMode::Slow);
    }
}
