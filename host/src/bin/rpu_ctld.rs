//! Resident sender: serve mode requests from the control directory
//! until killed.

use std::path::PathBuf;

use clap::Parser;

use blink_common::config::ChannelConfig;
use blink_common::layout::PlatformLayout;
use blink_common::sender::Transaction;
use blink_host::lock::DEFAULT_LOCK_PATH;
use blink_host::{ChannelLock, ControlService, DevMemHal};

#[derive(Parser)]
#[command(
    name = "rpu-ctld",
    about = "Resident blink-control service (write FIFO + status file)"
)]
struct Args {
    /// Directory for the write/status control files
    #[arg(long, default_value = "/run/rpu-ctl")]
    control_dir: PathBuf,

    /// Acknowledgment timeout in milliseconds
    #[arg(long, default_value_t = 1500)]
    timeout_ms: u64,

    /// Lock file shared with rpu-ctl
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
    let service = ControlService::create(&args.control_dir)?;
    let lock = ChannelLock::at(&args.lock_file);
    let mut tx = Transaction::new(&layout, cfg);

    log::info!(
        "serving requests from {}",
        service.fifo_path().display()
    );
    service.run(&mut tx, &mut hal, &lock)?;
    Ok(())
}
