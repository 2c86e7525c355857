use anyhow::Result;
use clap::Parser;
use scribed::cli::{Cli, Commands, ModelsAction};
use scribed::config::Config;
use scribed::models::catalog::list_models;
use scribed::models::download::{download_model, format_model_info};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Serve) => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(host) = cli.host {
                config.server.host = host;
            }
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(model) = cli.model {
                config.stt.model = model;
            }
            scribed::server::serve(config).await?;
        }
        Some(Commands::Models { action }) => match action {
            ModelsAction::List => {
                for model in list_models() {
                    println!("{}", format_model_info(model));
                }
            }
            ModelsAction::Install { name } => {
                download_model(&name, true).await?;
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config.with_env_overrides())
}
