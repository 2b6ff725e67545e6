use iwscan::Scanner;

#[tokio::main]
async fn main() -> iwscan::Result<()> {
    let interface = std::env::args().nth(1).unwrap_or_else(|| "wlan0".to_string());

    let scanner = Scanner::open()?;

    println!("Scanning {interface} for WiFi networks...");
    let records = scanner.scan(&interface).await?;
    for ap in records {
        let essid = ap.essid.map(|e| e.to_string()).unwrap_or_default();
        let channel = ap
            .frequency
            .and_then(|f| f.channel)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("{}  ch {:>3}  {:30}", ap.address, channel, essid);
    }

    Ok(())
}
