//! Delivery ETA - Main Entry Point

use clap::Parser;
use delivery_eta::cli::{cmd_predict, cmd_schema, cmd_train, Cli, Commands, TrainOverrides};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delivery_eta=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { input, model, config, seed, n_estimators, n_jobs, validation_split } => {
            let overrides = TrainOverrides { seed, n_estimators, n_jobs, validation_split };
            cmd_train(&input, &model, config.as_deref(), &overrides)?;
        }
        Commands::Predict { model, input, output } => {
            cmd_predict(&model, &input, output.as_deref())?;
        }
        Commands::Schema { input } => {
            cmd_schema(&input)?;
        }
    }

    Ok(())
}
