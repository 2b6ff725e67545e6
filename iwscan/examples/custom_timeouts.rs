/// Example demonstrating custom timing for a scan.
///
/// This shows how to give slow drivers more time to finish scanning and how
/// to cap the size of the result buffer.
use iwscan::{ScanConfig, Scanner};
use std::time::Duration;

#[tokio::main]
async fn main() -> iwscan::Result<()> {
    // Slow drivers may need more than the default 15 seconds
    let config = ScanConfig::new()
        .with_deadline(Duration::from_secs(30)) // Give up after 30s
        .with_poll_interval(Duration::from_millis(250)) // Check every 250ms
        .with_max_buffer_len(Some(256 * 1024)); // Never grow past 256 KiB

    let scanner = Scanner::open_with_config(config)?;

    println!("Scanner configured with custom timing:");
    println!("  Deadline: {:?}", scanner.config().deadline);
    println!("  Poll interval: {:?}", scanner.config().poll_interval);

    let records = scanner.scan("wlan0").await?;
    println!("\nFound {} access points", records.len());

    // Default timing, for comparison
    let default_scanner = Scanner::open()?;
    println!("\nDefault scanner timing:");
    println!("  Deadline: {:?}", default_scanner.config().deadline);
    println!("  First wait: {:?}", default_scanner.config().first_wait);

    Ok(())
}
