//! triage - disease classifier CLI and inference server

use clap::Parser;
use triage_ml::cli::{cmd_explain, cmd_fairness, cmd_schema, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triage_ml=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { paths, report, trees, max_depth, test_size, seed } => {
            cmd_train(&paths, report, trees, max_depth, test_size, seed)?;
        }
        Commands::Explain { paths, output, top_k, sample_size, no_shap } => {
            cmd_explain(&paths, output, top_k, sample_size, no_shap)?;
        }
        Commands::Fairness { paths, output, test_size, seed } => {
            cmd_fairness(&paths, output, test_size, seed)?;
        }
        Commands::Schema { data } => {
            cmd_schema(data)?;
        }
        Commands::Serve { model, port, host } => {
            cmd_serve(model, port, host).await?;
        }
    }

    Ok(())
}
