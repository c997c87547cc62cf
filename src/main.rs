//! till Server Binary
//!
//! Runs the HTTP backend for login, sessions, and user management.

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = till::Config::parse();
    till::log()?;
    till::run(config).await
}
