use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rust_chatgate::account::AccountService;
use rust_chatgate::api::{ApiServer, ApiState};
use rust_chatgate::cli::{self, Cli, Commands, ServeArgs};
use rust_chatgate::client::{ChatEngineClient, Directory};
use rust_chatgate::config::GatewayConfig;
use rust_chatgate::mail::{LogNotifier, Notifier, SmtpNotifier};
use rust_chatgate::storage::AccountStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => run_server(args).await,
        Some(Commands::Accounts { config, db_path }) => {
            init_tracing("warn");
            cli::accounts::handle_accounts_command(&config, db_path)?;
            Ok(())
        }
        Some(Commands::InitConfig { path }) => {
            GatewayConfig::default().write(&path)?;
            println!("Default config written to {}", path);
            Ok(())
        }
        None => run_server(ServeArgs {
            config: cli::DEFAULT_CONFIG_PATH.to_string(),
            ..Default::default()
        })
        .await,
    }
}

fn init_tracing(default_level: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_server(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Peek at the log level before the config loader starts logging
    let level = GatewayConfig::load(&args.config)
        .map(|c| c.server.log_level)
        .unwrap_or_else(|_| "info".to_string());
    init_tracing(&level);

    let mut config = GatewayConfig::load_or_default(&args.config);
    config.apply_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db_path) = args.db_path {
        config.server.db_path = db_path;
    }
    let config = Arc::new(config);

    info!("💬 Chat gateway starting...");
    if config.chat_engine.project_id.is_empty() || config.chat_engine.private_key.is_empty() {
        warn!("Chat engine credentials are not set; remote calls will be rejected");
    }

    let store = Arc::new(AccountStore::open(&config.server.db_path)?);
    info!("Account store at {} ({} accounts)", config.server.db_path, store.len());

    let directory: Arc<dyn Directory> = Arc::new(ChatEngineClient::new(&config.chat_engine)?);
    let notifier: Arc<dyn Notifier> = if config.mail.smtp_enabled() {
        info!("Verification mail via {}:{}", config.mail.smtp_host, config.mail.smtp_port);
        Arc::new(SmtpNotifier::new(&config.mail)?)
    } else {
        warn!("No mail password configured; verification links will only be logged");
        Arc::new(LogNotifier::new(&config.mail.verify_base_url))
    };

    let service = Arc::new(AccountService::new(store.clone(), directory, notifier));
    let server = ApiServer::new(
        ApiState { service },
        &config.cors,
        &config.server.bind,
        config.server.port,
    );

    let served = server.start(shutdown_signal()).await;

    if let Err(e) = store.flush() {
        error!("Failed to flush account store: {}", e);
    }
    info!("Chat gateway stopped");
    Ok(served?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
