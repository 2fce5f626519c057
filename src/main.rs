//! alpha-watch - Alpha Market Volatility Snapshots
//!
//! Builds the dashboard snapshot once, on an interval, or prints the current one.

use anyhow::Result;

use alpha_watch::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
