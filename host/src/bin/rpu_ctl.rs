//! One-shot sender: map the channel, run a single transaction, print
//! the outcome and the raw register values.

use std::path::PathBuf;

use clap::Parser;

use blink_common::config::ChannelConfig;
use blink_common::hal::{ChannelHal, SignalSender};
use blink_common::layout::PlatformLayout;
use blink_common::sender::Transaction;
use blink_host::lock::DEFAULT_LOCK_PATH;
use blink_host::{ChannelLock, DevMemHal};

#[derive(Parser)]
#[command(name = "rpu-ctl", about = "Send a blink-mode command to the real-time core")]
struct Args {
    /// Mode to send: 0=SLOW, 1=FAST, 2=RANDOM, 3=release control
    #[arg(value_parser = clap::value_parser!(u32).range(0..=3))]
    mode: u32,

    /// Acknowledgment timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Lock file shared with rpu-ctld
    #[arg(long, default_value = DEFAULT_LOCK_PATH)]
    lock_file: PathBuf,
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let layout = PlatformLayout::default();
    layout.validate()?;
    let cfg = ChannelConfig {
        ack_timeout_us: args.timeout_ms * 1000,
        ..ChannelConfig::default()
    };
    cfg.validate()?;

    let mut hal = DevMemHal::open(&layout)?;
    let mut tx = Transaction::new(&layout, cfg);

    // The resident service sends under the same lock; hold it for the
    // whole transaction so the two never interleave on the region.
    let lock = ChannelLock::at(&args.lock_file);
    let guard = lock.acquire()?;
    let result = tx.send(&mut hal, args.mode);
    drop(guard);

    // Raw register dump for diagnostics, success or not.
    let cmd = hal.shm_read(layout.cmd_offset);
    let ack = hal.shm_read(layout.ack_offset);
    let obs = hal.signal_observe();
    println!("command word:  {cmd}");
    println!("ack word:      {ack:#010x}");
    println!(
        "signal observe: {obs:#010x} -> {}",
        if obs & layout.receiver_mask != 0 {
            "PENDING"
        } else {
            "IDLE"
        }
    );
    println!("status: {}", tx.status());

    result?;
    println!("mode {} applied", args.mode);
    Ok(())
}
