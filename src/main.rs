use anyhow::Result;
use clap::Parser;
use gogoaccount::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    gogoaccount::init_tracing(&cli.log_level);
    cli.run().await
}
