use clap::Parser;
use rolebinding_store::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    cli::role_binding::run(cli.command).await
}
