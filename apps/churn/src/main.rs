//! Churn CLI - the main entry point.
//!
//! Commands:
//! - `predict` - Score one customer
//! - `explain` - Score one customer and rank heuristic feature impacts
//! - `inspect` - Summarise the loaded artifacts
//! - `pack`    - Validate a JSON artifact directory and write a bundle
//! - `init`    - Write a default config file
//! - `serve`   - Start the HTTP API

use churn::api;
use churn::cli;
use churn::config::{ChurnConfig, DEFAULT_CONFIG_FILE};
use churn::form::{
    AGE_RANGE, BALANCE_RANGE, CREDIT_SCORE_RANGE, CustomerForm, PRODUCTS_RANGE, SALARY_RANGE,
    TENURE_RANGE,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "churn",
    about = "Churn risk scoring for bank customers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Artifact directory or bundle (overrides config)
    #[arg(short, long, global = true)]
    assets: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one customer
    Predict {
        #[command(flatten)]
        customer: CustomerArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Score one customer and rank heuristic feature impacts
    Explain {
        #[command(flatten)]
        customer: CustomerArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Summarise the loaded artifacts
    Inspect {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a JSON artifact directory and write a binary bundle
    Pack {
        /// Artifact directory (defaults to the configured assets path)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Bundle file to write
        #[arg(short, long)]
        out: PathBuf,

        /// Overwrite an existing bundle
        #[arg(long)]
        force: bool,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Start the HTTP API
    Serve {
        /// Override the bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct CustomerArgs {
    #[arg(long)]
    geography: String,

    #[arg(long)]
    gender: String,

    #[arg(long, default_value_t = 35,
          value_parser = clap::value_parser!(u8).range(i64::from(*AGE_RANGE.start())..=i64::from(*AGE_RANGE.end())))]
    age: u8,

    #[arg(long, default_value_t = 5,
          value_parser = clap::value_parser!(u8).range(i64::from(*TENURE_RANGE.start())..=i64::from(*TENURE_RANGE.end())))]
    tenure: u8,

    #[arg(long, default_value_t = 650,
          value_parser = clap::value_parser!(u16).range(i64::from(*CREDIT_SCORE_RANGE.start())..=i64::from(*CREDIT_SCORE_RANGE.end())))]
    credit_score: u16,

    #[arg(long, default_value_t = 50_000.0, value_parser = parse_balance)]
    balance: f64,

    #[arg(long, default_value_t = 75_000.0, value_parser = parse_salary)]
    estimated_salary: f64,

    #[arg(long, default_value_t = 1,
          value_parser = clap::value_parser!(u8).range(i64::from(*PRODUCTS_RANGE.start())..=i64::from(*PRODUCTS_RANGE.end())))]
    num_of_products: u8,

    /// Has a credit card (true/false)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    has_credit_card: bool,

    /// Is an active member (true/false)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    is_active_member: bool,
}

impl From<CustomerArgs> for CustomerForm {
    fn from(a: CustomerArgs) -> Self {
        Self {
            geography: a.geography,
            gender: a.gender,
            age: a.age,
            tenure: a.tenure,
            credit_score: a.credit_score,
            balance: a.balance,
            estimated_salary: a.estimated_salary,
            num_of_products: a.num_of_products,
            has_credit_card: a.has_credit_card,
            is_active_member: a.is_active_member,
        }
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Print JSON
    #[arg(long)]
    json: bool,

    /// Decision threshold (overrides config)
    #[arg(long)]
    threshold: Option<f64>,
}

fn parse_money(s: &str, range: &std::ops::RangeInclusive<f64>) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
    if range.contains(&v) {
        Ok(v)
    } else {
        Err(format!("must be within {}..={}", range.start(), range.end()))
    }
}

fn parse_balance(s: &str) -> Result<f64, String> {
    parse_money(s, &BALANCE_RANGE)
}

fn parse_salary(s: &str) -> Result<f64, String> {
    parse_money(s, &SALARY_RANGE)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init { force } = cli.command {
        return cli::cmd_init(&cli.config, force);
    }

    let mut config = ChurnConfig::load(Some(&cli.config))?;
    if let Some(path) = cli.assets {
        config.assets.path = path;
    }

    match cli.command {
        Commands::Predict { customer, output } => {
            let threshold = output.threshold.unwrap_or(config.threshold);
            cli::cmd_predict(&config.assets.path, customer.into(), threshold, output.json)?;
        }
        Commands::Explain { customer, output } => {
            let threshold = output.threshold.unwrap_or(config.threshold);
            cli::cmd_explain(&config.assets.path, customer.into(), threshold, output.json)?;
        }
        Commands::Inspect { json } => {
            cli::cmd_inspect(&config.assets.path, json)?;
        }
        Commands::Pack { source, out, force } => {
            let source = source.unwrap_or_else(|| config.assets.path.clone());
            cli::cmd_pack(&source, &out, force)?;
        }
        Commands::Init { .. } => {}
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let predictor = cli::load_predictor(&config.assets.path, config.threshold)?;
            info!(assets = %config.assets.path.display(), "Artifacts loaded");
            api::serve(&config, predictor).await?;
        }
    }

    Ok(())
}
