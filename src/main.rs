// src/main.rs
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod airtable;
mod anthropic;
mod campaign;
mod cli;
mod clickup;
mod config;
mod email_sender;
mod error;
mod models;

use airtable::{AirtableClient, LeadStore};
use anthropic::{AnthropicClient, GenerationService, MessageGenerator};
use campaign::OutreachAgent;
use cli::CliApp;
use clickup::{ClickUpClient, TaskStore};
use config::{load_from_env, load_settings, Settings};
use email_sender::{Mailer, SmtpMailer};
use models::Result;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let settings = match load_settings("config.yml").await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Settings::default()
        }
    };

    // Setup logging
    std::env::set_var(
        "RUST_LOG",
        format!(
            "outreach_agent={},hyper=warn,lettre=warn",
            settings.logging.level
        ),
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("outreach_agent={}", settings.logging.level).parse()?),
        )
        .init();

    info!("Initializing outreach agent system");
    let config = match load_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let leads: Arc<dyn LeadStore> = Arc::new(AirtableClient::new(
        &config.airtable_base_id,
        &config.airtable_table_name,
        config.airtable_api_key.clone(),
    )?);
    let generation: Arc<dyn GenerationService> =
        Arc::new(AnthropicClient::new(config.anthropic_api_key.clone())?);
    let smtp_mailer = SmtpMailer::new(
        config.smtp_server.clone(),
        config.smtp_port,
        config.smtp_username.clone(),
        config.smtp_password.clone(),
    );
    let smtp_info = smtp_mailer.server_info();
    let mailer: Arc<dyn Mailer> = Arc::new(smtp_mailer);
    let tasks: Arc<dyn TaskStore> = Arc::new(ClickUpClient::new(config.clickup_api_key.clone())?);
    info!("All clients initialized successfully");

    let generator = MessageGenerator::new(generation.clone(), settings.retry_policy());
    let agent = OutreachAgent::new(
        leads.clone(),
        generator,
        mailer.clone(),
        tasks.clone(),
        settings.client_profile(),
        config.from_email.clone(),
        config.clickup_list_id.clone(),
    );

    let mut app = CliApp::new(agent, leads, generation, mailer, tasks, smtp_info);

    // Add graceful shutdown
    tokio::select! {
        result = app.run() => {
            if let Err(e) = result {
                error!("Fatal: {}", e);
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
