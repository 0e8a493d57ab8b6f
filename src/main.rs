use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tg_webhook_setup::config::{get_http_timeout_secs, Settings};
use tg_webhook_setup::logging::{init_logging, RedactionPatterns};
use tg_webhook_setup::webhook::{
    delete_webhook, fetch_webhook_info, register_webhook, ConfigurationError, HttpBotApi,
    WebhookConfig,
};
use tracing::{error, info};

/// Command-line interface
#[derive(Debug, Parser)]
#[command(name = "tg-webhook-setup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Register the Telegram webhook of a bot")]
struct Cli {
    /// Operation to run, `setup` when omitted
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Default, Subcommand)]
enum Command {
    /// Point Telegram at `$WEBHOOK_URL/bot-webhook/$BOT_TOKEN`
    #[default]
    Setup,
    /// Remove the webhook
    Delete,
    /// Show the webhook Telegram currently holds
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);
    init_logging(patterns);

    let cli = Cli::parse();
    let settings = init_settings();
    let config = init_webhook_config(&settings);

    let api = match HttpBotApi::new(Duration::from_secs(get_http_timeout_secs())) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return Ok(());
        }
    };

    match cli.command.unwrap_or_default() {
        Command::Setup => {
            info!("Configuring webhook...");
            let outcome = match register_webhook(&api, &settings).await {
                Ok(outcome) => outcome,
                Err(e) => exit_on_config_error(&e),
            };
            if outcome.is_acknowledged() {
                info!("Webhook URL: {}", config.webhook_url());
                log_webhook_info(&api, &config).await;
            }
        }
        Command::Delete => {
            info!("Deleting webhook...");
            delete_webhook(&api, &config).await;
        }
        Command::Info => {
            info!("Fetching webhook info...");
            log_webhook_info(&api, &config).await;
        }
    }

    Ok(())
}

fn init_settings() -> Settings {
    match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Validate configuration, exiting with status 1 on failure.
fn init_webhook_config(settings: &Settings) -> WebhookConfig {
    match WebhookConfig::from_settings(settings) {
        Ok(config) => {
            info!("Configuration loaded successfully.");
            config
        }
        Err(e) => exit_on_config_error(&e),
    }
}

fn exit_on_config_error(e: &ConfigurationError) -> ! {
    error!("{}", e);
    info!("Set BOT_TOKEN and WEBHOOK_URL in the environment or in .env");
    std::process::exit(1);
}

async fn log_webhook_info(api: &HttpBotApi, config: &WebhookConfig) {
    match fetch_webhook_info(api, config).await {
        Ok(info) => {
            info!(
                url = %info.url,
                pending_update_count = info.pending_update_count,
                max_connections = ?info.max_connections,
                allowed_updates = ?info.allowed_updates,
                last_error_message = ?info.last_error_message,
                "Webhook info"
            );
        }
        Err(e) => error!("Failed to fetch webhook info: {}", e),
    }
}
