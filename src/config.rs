// src/config.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::anthropic::RetryPolicy;
use crate::error::ConfigError;
use crate::models::ClientProfile;

/// Required credentials and identifiers, sourced from the environment.
/// Loaded and validated once at startup, before any network call.
#[derive(Debug, Clone)]
pub struct OutreachConfig {
    pub anthropic_api_key: String,
    pub airtable_api_key: String,
    pub airtable_base_id: String,
    pub airtable_table_name: String,
    pub clickup_api_key: String,
    pub clickup_list_id: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
}

pub(crate) const REQUIRED_VARS: [&str; 10] = [
    "ANTHROPIC_API_KEY",
    "AIRTABLE_API_KEY",
    "AIRTABLE_BASE_ID",
    "AIRTABLE_TABLE_NAME",
    "CLICKUP_API_KEY",
    "CLICKUP_LIST_ID",
    "SMTP_SERVER",
    "SMTP_USERNAME",
    "SMTP_PASSWORD",
    "FROM_EMAIL",
];

/// Collects every missing variable before failing so the operator gets the
/// full list in one pass.
pub fn load_from_env() -> std::result::Result<OutreachConfig, ConfigError> {
    let mut missing = Vec::new();
    let mut require = |name: &'static str| -> String {
        match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        }
    };

    let anthropic_api_key = require("ANTHROPIC_API_KEY");
    let airtable_api_key = require("AIRTABLE_API_KEY");
    let airtable_base_id = require("AIRTABLE_BASE_ID");
    let airtable_table_name = require("AIRTABLE_TABLE_NAME");
    let clickup_api_key = require("CLICKUP_API_KEY");
    let clickup_list_id = require("CLICKUP_LIST_ID");
    let smtp_server = require("SMTP_SERVER");
    let smtp_username = require("SMTP_USERNAME");
    let smtp_password = require("SMTP_PASSWORD");
    let from_email = require("FROM_EMAIL");

    if !missing.is_empty() {
        return Err(ConfigError::MissingEnv(missing));
    }

    let smtp_port = match std::env::var("SMTP_PORT") {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name: "SMTP_PORT",
            reason: format!("not a valid port number: {value}"),
        })?,
        Err(_) => 587,
    };

    Ok(OutreachConfig {
        anthropic_api_key,
        airtable_api_key,
        airtable_base_id,
        airtable_table_name,
        clickup_api_key,
        clickup_list_id,
        smtp_server,
        smtp_port,
        smtp_username,
        smtp_password,
        from_email,
    })
}

/// Non-secret tunables, read from config.yml with a full set of defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub client: ClientSettings,
    pub retry: RetrySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSettings {
    pub name: String,
    pub offer: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client: ClientSettings {
                name: "SuperGrowth Agency".to_string(),
                offer: "cutting-edge digital marketing solutions that increase \
                        qualified leads by 30% in 90 days"
                    .to_string(),
            },
            retry: RetrySettings {
                max_retries: 3,
                base_delay_secs: 1,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    pub fn client_profile(&self) -> ClientProfile {
        ClientProfile {
            name: self.client.name.clone(),
            offer: self.client.offer.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_secs(self.retry.base_delay_secs),
        }
    }
}

pub async fn load_settings(path: &str) -> crate::models::Result<Settings> {
    let content = tokio::fs::read_to_string(path).await?;
    let settings: Settings = serde_yaml::from_str(&content)?;
    Ok(settings)
}
