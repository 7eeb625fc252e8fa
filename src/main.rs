use anyhow::Result;
use cambio::core::CurrencyCode;
use cambio::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between BRL and another currency
    Convert {
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Currency to convert from, e.g. USD
        from: CurrencyCode,
        /// Currency to convert to, e.g. BRL
        to: CurrencyCode,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the selectable currencies
    Currencies,
}

impl From<Commands> for cambio::AppCommand {
    fn from(cmd: Commands) -> cambio::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                json,
            } => cambio::AppCommand::Convert {
                amount,
                from,
                to,
                json,
            },
            Commands::Currencies => cambio::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => cambio::cli::setup::setup_at_path(path),
            None => cambio::cli::setup::setup(),
        },
        Some(cmd) => cambio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
