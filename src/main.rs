use anyhow::Result;
use dentcal::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
