use clap::Parser;
use tradepost::auth::AuthApi;
use tradepost::cli::{self, Cli, Commands};
use tradepost::config::load_config;
use tradepost::errors::{AppError, AuthError};
use tradepost::http_client::HttpClient;
use tradepost::logger::setup_logging;
use tradepost::token_store::TokenStore;
use tradepost::utils;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load config first to get log level
    let mut config = load_config(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}", e);
        std::process::exit(1);
    });

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = setup_logging(&config);

    tracing::info!("tradepost starting...");

    let base_url = config.resolved_base_url(utils::get_api_url_from_env());
    tracing::debug!("Using API base URL: {}", base_url);

    let http = match HttpClient::new(&base_url, config.request_timeout_sec()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create API client: {}", e);
            eprintln!("Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    let store = match TokenStore::new() {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to initialize token storage: {}", e);
            eprintln!("Failed to initialize token storage: {}", e);
            std::process::exit(1);
        }
    };

    let auth = AuthApi::new(http, store);

    let command = cli.command.unwrap_or(Commands::Status);

    if let Err(e) = cli::handle_command(command, &auth, &mut config, cli.config.as_deref()).await {
        match e {
            AppError::Auth(AuthError::SessionExpired) => {
                tracing::warn!("Session expired, login required");
                eprintln!("Session expired. Please run 'tradepost login' to authenticate again.");
            }
            other => {
                tracing::error!("Command failed: {}", other);
                eprintln!("Error: {}", other);
            }
        }
        std::process::exit(1);
    }

    tracing::debug!("tradepost finished");
}
