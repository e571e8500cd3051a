use clap::Parser;
use teams_api::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Operator => cli::operator::run(&cli.url).await,
        command => cli::client::run(&cli.url, command).await,
    }
}
