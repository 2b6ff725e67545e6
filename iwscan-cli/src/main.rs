#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    iwscan_cli::run().await
}
