// src/clickup/mod.rs
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::TaskError;

const BASE_URL: &str = "https://api.clickup.com/api/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// The project-management backend where follow-up tasks land.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(
        &self,
        list_id: &str,
        name: &str,
        options: &TaskOptions,
    ) -> Result<Task, TaskError>;
    async fn get_tasks(&self, list_id: &str, limit: usize) -> Result<Vec<Task>, TaskError>;
    async fn update_task(&self, task_id: &str, updates: &Value) -> Result<Task, TaskError>;
    async fn delete_task(&self, task_id: &str) -> Result<bool, TaskError>;
    async fn check_connectivity(&self) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskList {
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Priorities outside 1..=4 are dropped from the request rather than
/// rejected; the API treats them as absent.
fn build_task_payload(name: &str, options: &TaskOptions) -> Value {
    let mut payload = json!({ "name": name });
    if let Some(description) = &options.description {
        payload["description"] = json!(description);
    }
    if let Some(due_date) = &options.due_date {
        payload["due_date"] = json!(due_date);
    }
    if let Some(priority) = options.priority {
        if (1..=4).contains(&priority) {
            payload["priority"] = json!(priority);
        }
    }
    payload
}

pub struct ClickUpClient {
    client: Client,
    api_key: String,
}

impl ClickUpClient {
    pub fn new(api_key: String) -> Result<Self, TaskError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        info!("ClickUp client initialized successfully");
        Ok(Self { client, api_key })
    }

    fn classify_status(status: StatusCode, body: String) -> TaskError {
        match status {
            StatusCode::UNAUTHORIZED => {
                error!("Authentication failed - check your API key");
                TaskError::Auth
            }
            StatusCode::NOT_FOUND => {
                error!("List not found - check your list ID");
                TaskError::NotFound
            }
            _ => TaskError::Api {
                status: status.as_u16(),
                body,
            },
        }
    }

    async fn parse_task(response: reqwest::Response) -> Result<Task, TaskError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }
        response
            .json()
            .await
            .map_err(|e| TaskError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TaskStore for ClickUpClient {
    async fn create_task(
        &self,
        list_id: &str,
        name: &str,
        options: &TaskOptions,
    ) -> Result<Task, TaskError> {
        if list_id.is_empty() || name.is_empty() {
            return Err(TaskError::InvalidInput(
                "list_id and name are required".to_string(),
            ));
        }

        info!("Creating ClickUp task: {}", name);
        let payload = build_task_payload(name, options);
        let response = self
            .client
            .post(format!("{BASE_URL}/list/{list_id}/task"))
            .header("Authorization", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let task = Self::parse_task(response).await?;
        info!("Successfully created ClickUp task: {}", name);
        Ok(task)
    }

    async fn get_tasks(&self, list_id: &str, limit: usize) -> Result<Vec<Task>, TaskError> {
        info!("Retrieving tasks from list: {}", list_id);
        let response = self
            .client
            .get(format!("{BASE_URL}/list/{list_id}/task"))
            .header("Authorization", &self.api_key)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }

        let list: TaskList = response
            .json()
            .await
            .map_err(|e| TaskError::InvalidResponse(e.to_string()))?;
        info!("Successfully retrieved {} tasks from ClickUp", list.tasks.len());
        Ok(list.tasks)
    }

    async fn update_task(&self, task_id: &str, updates: &Value) -> Result<Task, TaskError> {
        info!("Updating ClickUp task: {}", task_id);
        let response = self
            .client
            .put(format!("{BASE_URL}/task/{task_id}"))
            .header("Authorization", &self.api_key)
            .json(updates)
            .send()
            .await?;
        Self::parse_task(response).await
    }

    async fn delete_task(&self, task_id: &str) -> Result<bool, TaskError> {
        info!("Deleting ClickUp task: {}", task_id);
        let response = self
            .client
            .delete(format!("{BASE_URL}/task/{task_id}"))
            .header("Authorization", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }
        info!("Successfully deleted ClickUp task: {}", task_id);
        Ok(true)
    }

    async fn check_connectivity(&self) -> bool {
        let result = self
            .client
            .get(format!("{BASE_URL}/user"))
            .header("Authorization", &self.api_key)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("ClickUp API connection test successful");
                true
            }
            Ok(response) => {
                warn!("ClickUp API connection test failed: {}", response.status());
                false
            }
            Err(e) => {
                error!("ClickUp API connection test failed: {}", e);
                false
            }
        }
    }
}
