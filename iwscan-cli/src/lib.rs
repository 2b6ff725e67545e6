pub mod render;

use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use iwscan::{ScanConfig, Scanner};
use log::debug;

#[derive(Parser, Debug)]
#[command(name = "iwscan")]
#[command(about = "Scan for wireless access points")]
#[command(disable_version_flag = true)]
#[command(version)]
struct Args {
    /// Wireless interface to scan
    #[arg(required_unless_present = "version")]
    interface: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Never grow the result buffer past this many bytes
    #[arg(long, value_name = "BYTES")]
    max_buffer: Option<usize>,

    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,
}

impl Args {
    fn config(&self) -> ScanConfig {
        let mut config = ScanConfig::new().with_max_buffer_len(self.max_buffer);
        if let Some(secs) = self.timeout {
            config = config.with_deadline(Duration::from_secs(secs));
        }
        config
    }
}

pub async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.version {
        println!("iwscan {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let Some(interface) = args.interface.as_deref() else {
        anyhow::bail!("no interface given");
    };

    let config = args.config();
    debug!("Scanning {interface} with {config:?}");

    let scanner = Scanner::open_with_config(config)?;
    let records = scanner.scan(interface).await?;

    if args.json {
        let out = render::json(interface, &records).context("failed to encode scan results")?;
        println!("{out}");
    } else {
        print!("{}", render::text(interface, &records));
    }
    Ok(())
}
