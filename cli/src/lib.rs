use std::path::PathBuf;

use anyhow::Context;
use clap::ArgAction;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::Shell;
use clap_complete::generate;
use stackrag_core::Config;
use stackrag_core::ConfigOverrides;
use stackrag_core::LlamaStackClient;
use stackrag_core::RagPipeline;
use stackrag_core::SearchMode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub mod report;

/// Retrieval-augmented question answering against a LlamaStack server.
#[derive(Debug, Parser)]
#[clap(
    author,
    name = "stackrag",
    version = env!("CARGO_PKG_VERSION"),
    bin_name = "stackrag"
)]
pub struct Cli {
    #[clap(flatten)]
    pub global: GlobalArgs,

    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// Path to config.toml. Defaults to $STACKRAG_HOME/config.toml.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the LlamaStack server.
    #[arg(long = "base-url", value_name = "URL", env = "LLAMASTACK_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(
        long = "api-token",
        value_name = "TOKEN",
        env = "LLAMASTACK_API_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub api_token: Option<String>,

    #[arg(long = "embedding-model", value_name = "MODEL", global = true)]
    pub embedding_model: Option<String>,

    #[arg(long = "inference-model", value_name = "MODEL", global = true)]
    pub inference_model: Option<String>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Check that the server is reachable and healthy.
    Health,

    /// List the models the server exposes.
    Models,

    /// Embed the knowledge base and answer every configured query.
    Demo(SearchArgs),

    /// Answer a single question using the knowledge base.
    Ask(AskCommand),

    /// Generate shell completion scripts.
    Completion(CompletionCommand),
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct SearchArgs {
    /// Where similarity search runs: `local` or `vector-store`.
    #[arg(long = "mode", value_name = "MODE")]
    pub mode: Option<SearchMode>,

    /// Number of documents to retrieve per query.
    #[arg(long = "top-k", value_name = "N")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Parser)]
pub struct AskCommand {
    /// The question to answer.
    pub question: String,

    #[clap(flatten)]
    pub search: SearchArgs,
}

#[derive(Debug, Parser)]
pub struct CompletionCommand {
    /// Shell to generate completions for
    #[clap(value_enum, default_value_t = Shell::Bash)]
    pub shell: Shell,
}

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.global.verbose);

    let search = match &cli.subcommand {
        Subcommand::Completion(cmd) => {
            print_completion(cmd.shell);
            return Ok(());
        }
        Subcommand::Demo(args) => args.clone(),
        Subcommand::Ask(cmd) => cmd.search.clone(),
        Subcommand::Health | Subcommand::Models => SearchArgs::default(),
    };

    let config = load_config(&cli.global, search)?;
    let client = LlamaStackClient::from_config(&config);

    match cli.subcommand {
        Subcommand::Health => {
            client.health().await.context("health check failed")?;
            println!("✓ LlamaStack at {} is healthy", client.base_url());
        }
        Subcommand::Models => {
            let models = client.list_models().await.context("failed to list models")?;
            print!("{}", report::models(&models));
        }
        Subcommand::Demo(_) => run_demo(&client, &config).await?,
        Subcommand::Ask(cmd) => {
            let pipeline = RagPipeline::prepare(&client, &config)
                .await
                .context("failed to prepare the knowledge base")?;
            let outcome = pipeline.answer(&cmd.question).await?;
            print!("{}", report::outcome(&outcome));
        }
        Subcommand::Completion(_) => {}
    }
    Ok(())
}

fn load_config(global: &GlobalArgs, search: SearchArgs) -> anyhow::Result<Config> {
    let overrides = ConfigOverrides {
        base_url: global.base_url.clone(),
        api_token: global.api_token.clone(),
        embedding_model: global.embedding_model.clone(),
        inference_model: global.inference_model.clone(),
        search_mode: search.mode,
        top_k: search.top_k,
    };
    Ok(Config::load_with_overrides(global.config.as_deref(), overrides)?)
}

async fn run_demo(client: &LlamaStackClient, config: &Config) -> anyhow::Result<()> {
    println!("{}", report::banner("LlamaStack Chat and Embeddings Demo"));
    println!("\nConnecting to: {}", client.base_url());
    println!("Search mode: {}", config.search_mode);

    client
        .health()
        .await
        .context("cannot connect to LlamaStack; check the URL and try again")?;
    println!("✓ LlamaStack is healthy");

    // Informational only; the demo does not depend on it.
    match client.list_models().await {
        Ok(models) => print!("\n{}", report::models(&models)),
        Err(e) => warn!("failed to list models: {e}"),
    }

    println!("\n{}", report::banner("Creating Knowledge Base Embeddings"));
    print!("\n{}", report::documents(&config.documents));

    let pipeline = RagPipeline::prepare(client, config)
        .await
        .context("failed to prepare the knowledge base")?;
    println!("✓ Knowledge base ready ({} documents)", config.documents.len());

    println!("\n{}", report::banner("Semantic Search and Q&A Examples"));
    for (i, query) in config.queries.iter().enumerate() {
        println!("\n{}", report::query_header(i + 1, query));
        match pipeline.answer(query).await {
            Ok(outcome) => print!("{}", report::outcome(&outcome)),
            Err(e) => {
                warn!(query = %query, "query failed: {e}");
                println!("\n✗ {e}");
            }
        }
    }

    println!("\n{}", report::banner("Demo Complete!"));
    print!("{}", report::summary(config.search_mode));
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_completion(shell: Shell) {
    let mut app = Cli::command();
    generate(shell, &mut app, "stackrag", &mut std::io::stdout());
}
