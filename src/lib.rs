pub mod cli;
pub mod core;
pub mod providers;

use anyhow::Result;
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::{ConversionService, CurrencyCode};
use crate::providers::AwesomeApiProvider;

pub enum AppCommand {
    Convert {
        amount: String,
        from: CurrencyCode,
        to: CurrencyCode,
        json: bool,
    },
    Currencies,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("cambio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            json,
        } => {
            let provider = AwesomeApiProvider::from_config(&config.providers.awesome_api)?;
            let service = ConversionService::new(provider);
            cli::convert::run(&service, &amount, &from, &to, json).await
        }
        AppCommand::Currencies => {
            cli::currencies::run(&config.currencies);
            Ok(())
        }
    }
}
