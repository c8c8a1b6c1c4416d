//! Interactive recipe advisor.
//!
//! Usage: recipe_advisor [--config advisor.toml] [--json] [--once]
//!        recipe_advisor --cross-validate dataset.csv [--folds 10]
//!
//! Set RUST_LOG=debug to see rule firings.

use anyhow::{Context, Result};
use clap::Parser;
use recipe_book::{Cookbook, Dataset, SuccessNetwork, DEFAULT_FOLDS};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use advisor_core::{
    ask, parse_yes_no, AdvisorConfig, BayesianEvaluator, ConsolePrompter, Consultation,
    ConsultationSettings, EngineError, PromptError, Services,
};

#[derive(Parser, Debug)]
#[command(name = "recipe_advisor", about = "Suggests a recipe from the ingredients you have")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print each outcome as JSON
    #[arg(long)]
    json: bool,

    /// Run a single consultation and exit
    #[arg(long)]
    once: bool,

    /// Score the success network on a CSV dataset, print the scores as JSON, and exit
    #[arg(long, value_name = "CSV")]
    cross_validate: Option<PathBuf>,

    /// Folds for --cross-validate; capped at the number of rows
    #[arg(long, default_value_t = DEFAULT_FOLDS)]
    folds: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Some(path) = &cli.cross_validate {
        let dataset = Dataset::load(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        let scores = SuccessNetwork::cross_validate(&dataset, cli.folds.min(dataset.len()))?;
        println!("{}", serde_json::to_string_pretty(&scores)?);
        return Ok(());
    }

    let config = AdvisorConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    let cookbook = match &config.cookbook.path {
        Some(path) => match Cookbook::load(path) {
            Ok(cookbook) => cookbook,
            Err(error) => {
                warn!(path = %path.display(), %error, "cookbook unavailable, using the built-in catalogue");
                Cookbook::builtin()?
            }
        },
        None => Cookbook::builtin()?,
    };
    info!(recipes = cookbook.recipe_count(), "cookbook ready");

    let mut evaluator = BayesianEvaluator::new();
    if let Some(dataset) = &config.estimate.dataset {
        evaluator = evaluator.with_dataset(dataset);
    }

    let mut services = Services::new(ConsolePrompter::stdio(), evaluator, cookbook)
        .with_settings(ConsultationSettings::from(&config));

    loop {
        let mut consultation = Consultation::new(services, config.engine.clone());
        let result = consultation.run();
        services = consultation.into_services();

        match result {
            Ok(outcome) if cli.json => println!("{}", serde_json::to_string_pretty(&outcome)?),
            Ok(_) => {}
            Err(EngineError::Prompt(PromptError::Closed)) => break,
            Err(error) => {
                services
                    .prompter
                    .tell(&format!("The consultation failed: {}", error));
            }
        }

        if cli.once {
            break;
        }

        services.prompter.tell(&"=".repeat(40));
        let again = match ask(
            services.prompter.as_mut(),
            "Start a new consultation? (y/n):",
            parse_yes_no,
        ) {
            Ok(again) => again,
            Err(PromptError::Closed) => false,
            Err(error) => return Err(error.into()),
        };
        if !again {
            break;
        }
    }

    services.prompter.tell("Goodbye!");
    Ok(())
}
