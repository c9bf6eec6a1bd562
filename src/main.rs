use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::sync::Arc;
use std::time::Duration;
use tasksync::api::HttpTaskApi;
use tasksync::cli::{self, Cli, Commands};
use tasksync::{Config, Profile, TaskStore, logging, utils};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps a separate config and log directory
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let mut config = match cli.config {
        Some(ref path) => Config::load_from_path(&utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
        config.validate()?;
    }

    let log_dir = utils::get_data_dir(profile)
        .ok_or_else(|| eyre!("Could not determine data directory"))?
        .join("logs");
    let _log_guard = logging::init(&log_dir, &config.log_level)?;
    tracing::info!(api_url = %config.api_url, ?profile, "starting tasksync");

    let api = HttpTaskApi::new(&config.api_url);
    let store = TaskStore::new(Arc::new(api));

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let (app, app_rx) = tasksync::tui::App::new(config, store);
            tasksync::tui::run_event_loop(app, app_rx).await?;
        }
        Commands::List => cli::handle_list(&store, &config.time_display_format).await?,
        Commands::Add {
            title,
            description,
            time,
        } => cli::handle_add(&store, title, description, time).await?,
        Commands::Toggle { id } => cli::handle_toggle(&store, &id).await?,
        Commands::Delete { id } => cli::handle_delete(&store, &id).await?,
        Commands::Watch => {
            let period = Duration::from_secs(config.reminder_interval_secs);
            cli::handle_watch(&store, period).await?
        }
    }

    Ok(())
}
