//! Backtest form CLI: catalog listing and one-shot backtest submission.
//!
//! Commands:
//! - `coins`: list the coin catalog
//! - `indicators`: list the indicator catalog
//! - `submit`: fill the form from flags, validate, and create a backtest

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use backtest_form_core::validation;
use backtest_form_core::{
    ApplyOutcome, BacktestApi, BearerToken, CatalogKind, Catalogs, ClientConfig, FormState,
    HttpBacktestApi, ParamField, ReferenceDataLoader, ScalarField, SubmissionController,
};

#[derive(Parser)]
#[command(name = "backtest-form", about = "Create backtests against the backtest service", version)]
struct Cli {
    /// Config file (defaults to <config dir>/backtest-form/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token sent with every request.
    #[arg(long, global = true, env = "BACKTEST_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the coins a backtest can run on.
    Coins,
    /// List the indicators available for parameters.
    Indicators,
    /// Create a backtest.
    Submit {
        /// Coin symbol (e.g., BTC).
        #[arg(long)]
        coin: String,

        /// Display name for the backtest.
        #[arg(long)]
        name: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: String,

        /// Indicator parameter as INDICATOR=VALUE; repeat for more rows.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Print the composed payload instead of sending it.
        #[arg(long, default_value_t = false)]
        check_only: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    let token = BearerToken::new(cli.token.unwrap_or_default());
    if token.expose().is_empty() {
        warn!("no bearer token given (--token or BACKTEST_TOKEN)");
    }

    match cli.command {
        Commands::Coins => {
            let api = HttpBacktestApi::new(config).context("failed to build HTTP client")?;
            run_list(&api, &token, CatalogKind::Coins, |catalogs| {
                for coin in &catalogs.coins {
                    println!("{:<10} {:<8} {}", coin.id, coin.symbol, coin.name);
                }
            })
        }
        Commands::Indicators => {
            let api = HttpBacktestApi::new(config).context("failed to build HTTP client")?;
            run_list(&api, &token, CatalogKind::Indicators, |catalogs| {
                for indicator in &catalogs.indicators {
                    println!("{:<16} {}", indicator.id, indicator.name);
                }
            })
        }
        Commands::Submit {
            coin,
            name,
            start,
            end,
            params,
            check_only,
        } => {
            let mut form = build_form(&coin, &name, &start, &end, &params)?;
            let issues = validation::check(&form, config.cross_field_checks);
            if !issues.is_empty() {
                for issue in &issues {
                    eprintln!("invalid input: {issue}");
                }
                bail!("{} invalid field(s); nothing was sent", issues.len());
            }

            if check_only {
                println!("{}", serde_json::to_string_pretty(&form.compose_request())?);
                return Ok(());
            }

            let api = HttpBacktestApi::new(config).context("failed to build HTTP client")?;
            let mut controller = SubmissionController::new();
            let created = controller
                .submit(&api, &token, &mut form)
                .context("backtest was not created")?;
            println!("{}", serde_json::to_string_pretty(&created)?);
            Ok(())
        }
    }
}

/// Load one catalog and print it. The other catalog is never requested.
fn run_list<A: BacktestApi + ?Sized>(
    api: &A,
    token: &BearerToken,
    kind: CatalogKind,
    print: impl FnOnce(&Catalogs),
) -> Result<()> {
    let mut loader = ReferenceDataLoader::new();
    if let ApplyOutcome::Failed { kind, error } = loader.load_one_blocking(api, token, kind) {
        bail!("failed to load {}: {error}", kind.label());
    }

    print(loader.catalogs());
    Ok(())
}

/// Fill a form through its public operations, one row per `--param`.
fn build_form(
    coin: &str,
    name: &str,
    start: &str,
    end: &str,
    params: &[(String, String)],
) -> Result<FormState> {
    let mut form = FormState::new();
    form.set_scalar_field(ScalarField::Coin, coin);
    form.set_scalar_field(ScalarField::Name, name);
    form.set_scalar_field(ScalarField::StartDate, start);
    form.set_scalar_field(ScalarField::EndDate, end);

    for (row, (indicator, value)) in params.iter().enumerate() {
        if row > 0 {
            form.append_row();
        }
        form.update_param_field(row, ParamField::IndicatorId, indicator.as_str())?;
        form.update_param_field(row, ParamField::Value, value.as_str())?;
    }
    Ok(form)
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    let (indicator, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDICATOR=VALUE, got '{s}'"))?;
    Ok((indicator.trim().to_string(), value.trim().to_string()))
}
