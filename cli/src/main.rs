use clap::Parser;
use stackrag_cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    stackrag_cli::run_main(cli).await
}
