use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use clay_widgets::cache::{CachedRecord, RecordCache};
use clay_widgets::client::{HttpClient, MemoryClient, RecordClient};
use clay_widgets::config::Config;
use clay_widgets::estimate::{
    estimate_widget, prefetch_rates, run_script, Estimate, EstimateWidget, Rate, ScriptStep,
};
use clay_widgets::form::{Form, FormError};
use clay_widgets::logging;

#[derive(Parser)]
#[command(name = "clay-widgets", version, about = "Render, edit and check estimate forms")]
struct Cli {
    /// Path to config file (default: user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Input {
    /// Estimate to load, as JSON
    #[arg(long)]
    data: PathBuf,

    /// JSON array of rates to use instead of the record service
    #[arg(long)]
    rates: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the estimate form
    Render {
        #[command(flatten)]
        input: Input,
    },
    /// Apply a JSON array of edits and print the result
    Apply {
        #[command(flatten)]
        input: Input,

        /// Edits to apply, in order
        #[arg(long)]
        actions: PathBuf,
    },
    /// Attempt submission; exits non-zero while errors remain
    Check {
        #[command(flatten)]
        input: Input,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    logging::init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    match cli.command {
        Command::Render { input } => {
            let form = open_form(&input, &config).await?;
            print!("{}", form.render());
            Ok(ExitCode::SUCCESS)
        }
        Command::Apply { input, actions } => {
            let mut form = open_form(&input, &config).await?;
            let steps: Vec<ScriptStep> = read_json(&actions)?;
            let applied = run_script(&mut form, steps).await?;
            prefetch_rates(form.data(), form.cache()).await;

            println!("{}", serde_json::to_string_pretty(form.data())?);
            for error in form.validate() {
                eprintln!("error: {}", error);
            }
            tracing::info!(applied, "Applied edits");
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { input } => {
            let mut form = open_form(&input, &config).await?;
            match form.submit() {
                Ok(_) => {
                    println!("ok");
                    Ok(ExitCode::SUCCESS)
                }
                Err(FormError::Blocked { errors, .. }) => {
                    for error in errors {
                        eprintln!("error: {}", error);
                    }
                    Ok(ExitCode::FAILURE)
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}

async fn open_form(input: &Input, config: &Config) -> Result<Form<EstimateWidget>> {
    let estimate: Estimate = read_json(&input.data)?;

    let client: Arc<dyn RecordClient> = match &input.rates {
        Some(path) => {
            let rates: Vec<Rate> = read_json(path)?;
            let records = rates
                .into_iter()
                .map(|rate| {
                    let id = rate.id().to_string();
                    serde_json::to_value(rate).map(|value| (Rate::ENTITY.to_string(), id, value))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Arc::new(MemoryClient::with_records(records))
        }
        None => Arc::new(HttpClient::new(&config.client)?),
    };

    let cache = RecordCache::new(client, &config.cache)?;
    prefetch_rates(&estimate, &cache).await;
    Ok(Form::load(estimate_widget(&config.forms), (), estimate, cache))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
