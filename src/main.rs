use anyhow::Result;
use chatd::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
