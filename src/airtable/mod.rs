// src/airtable/mod.rs
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::LeadStoreError;
use crate::models::{Lead, LeadRecord};

const API_BASE: &str = "https://api.airtable.com/v0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// The tabular store holding the lead list.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Full current batch, in the order the store returns it.
    async fn fetch_all(&self) -> Result<Vec<LeadRecord>, LeadStoreError>;
    async fn insert(&self, lead: &Lead) -> Result<LeadRecord, LeadStoreError>;
    async fn update(&self, record_id: &str, lead: &Lead) -> Result<LeadRecord, LeadStoreError>;
    async fn delete(&self, record_id: &str) -> Result<DeleteConfirmation, LeadStoreError>;
    async fn check_connectivity(&self) -> bool;
}

#[derive(Debug, Deserialize)]
pub struct DeleteConfirmation {
    pub deleted: bool,
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<LeadRecord>,
}

pub struct AirtableClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl AirtableClient {
    pub fn new(
        base_id: &str,
        table_name: &str,
        api_key: String,
    ) -> Result<Self, LeadStoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let endpoint = format!("{API_BASE}/{base_id}/{table_name}");
        info!(
            "Airtable client initialized for base: {}, table: {}",
            base_id, table_name
        );
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    fn classify_status(status: StatusCode, body: String) -> LeadStoreError {
        match status {
            StatusCode::UNAUTHORIZED => {
                error!("Authentication failed - check your API key");
                LeadStoreError::Auth
            }
            StatusCode::NOT_FOUND => {
                error!("Base or table not found - check your base ID and table name");
                LeadStoreError::NotFound
            }
            _ => LeadStoreError::Api {
                status: status.as_u16(),
                body,
            },
        }
    }

    async fn parse_record(response: reqwest::Response) -> Result<LeadRecord, LeadStoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }
        response
            .json()
            .await
            .map_err(|e| LeadStoreError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LeadStore for AirtableClient {
    async fn fetch_all(&self) -> Result<Vec<LeadRecord>, LeadStoreError> {
        info!("Retrieving leads from Airtable");
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }

        let list: RecordList = response
            .json()
            .await
            .map_err(|e| LeadStoreError::InvalidResponse(e.to_string()))?;
        info!("Successfully retrieved {} leads from Airtable", list.records.len());
        Ok(list.records)
    }

    async fn insert(&self, lead: &Lead) -> Result<LeadRecord, LeadStoreError> {
        info!("Adding new lead to Airtable: {}", lead.display_name());
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "fields": lead }))
            .send()
            .await?;
        Self::parse_record(response).await
    }

    async fn update(&self, record_id: &str, lead: &Lead) -> Result<LeadRecord, LeadStoreError> {
        info!("Updating lead {} in Airtable", record_id);
        let response = self
            .client
            .patch(format!("{}/{}", self.endpoint, record_id))
            .bearer_auth(&self.api_key)
            .json(&json!({ "fields": lead }))
            .send()
            .await?;
        Self::parse_record(response).await
    }

    async fn delete(&self, record_id: &str) -> Result<DeleteConfirmation, LeadStoreError> {
        info!("Deleting lead {} from Airtable", record_id);
        let response = self
            .client
            .delete(format!("{}/{}", self.endpoint, record_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }
        response
            .json()
            .await
            .map_err(|e| LeadStoreError::InvalidResponse(e.to_string()))
    }

    async fn check_connectivity(&self) -> bool {
        let result = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.api_key)
            .query(&[("maxRecords", "1")])
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("Airtable connection test successful");
                true
            }
            Ok(response) => {
                warn!("Airtable connection test failed: {}", response.status());
                false
            }
            Err(e) => {
                error!("Airtable connection test failed: {}", e);
                false
            }
        }
    }
}
