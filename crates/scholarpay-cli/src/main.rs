/*
[INPUT]:  CLI arguments, YAML configuration file
[OUTPUT]: Wallet login, session status and donations from the terminal
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags or subcommands
*/

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scholarpay_cli::{App, CliConfig, describe_failure};
use scholarpay_core::SubmissionResult;

#[derive(Parser, Debug)]
#[command(name = "scholarpay", version, about = "ScholarPay wallet login and donations")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the local wallet key
    Keygen {
        /// Replace an existing key
        #[arg(long)]
        force: bool,
    },
    /// Sign in with the local wallet
    Login,
    /// Show the stored session after checking it with the server
    Status,
    /// Forget the stored session
    Logout,
    /// Send a native-asset donation from the signed-in account
    Donate {
        #[arg(long, value_name = "ADDRESS")]
        to: String,
        #[arg(long, value_name = "AMOUNT")]
        amount: String,
        #[arg(long)]
        memo: Option<String>,
        /// Submission window in seconds
        #[arg(long = "timeout", value_name = "SECONDS")]
        timeout_seconds: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = CliConfig::load(args.config_path.as_deref()).context("load config")?;
    info!(
        network = %config.network,
        api = %config.api_base_url,
        ledger = %config.ledger_base_url,
        "configuration loaded"
    );
    let app = App::new(config).context("initialize app")?;

    match args.command {
        Command::Keygen { force } => {
            let public_key = app.keygen(force)?;
            println!("{public_key}");
        }
        Command::Login => {
            let identity = app.login().await?;
            if let Some(public_key) = identity.public_key() {
                println!("logged in as {public_key} on {}", identity.network());
            }
        }
        Command::Status => {
            let identity = app.status().await?;
            match identity.public_key() {
                Some(public_key) => println!("logged in as {public_key} on {}", identity.network()),
                None => println!("not logged in"),
            }
        }
        Command::Logout => {
            app.logout();
            println!("logged out");
        }
        Command::Donate {
            to,
            amount,
            memo,
            timeout_seconds,
        } => match app
            .donate(&to, &amount, memo.as_deref(), timeout_seconds)
            .await?
        {
            SubmissionResult::Success { hash } => println!("donation submitted: {hash}"),
            SubmissionResult::Failure { kind, detail } => {
                return Err(anyhow!("donation failed: {}", describe_failure(kind, &detail)));
            }
        },
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}
