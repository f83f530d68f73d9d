// src/anthropic/mod.rs
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::GenerationError;
use crate::models::{ClientProfile, Lead};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-3-opus-20240229";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One blocking call to the hosted model. Rate limiting is the only
/// retryable failure and is handled a level up, in [`MessageGenerator`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
    async fn check_connectivity(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

pub struct AnthropicClient {
    client: Client,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        info!("Anthropic client initialized successfully");
        Ok(Self { client, api_key })
    }

    async fn request(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let request = MessagesRequest {
            model: MODEL.to_string(),
            max_tokens,
            temperature: 0.7,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Anthropic API error ({}): {}", status, body);
            return Err(GenerationError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| GenerationError::InvalidResponse("empty content".to_string()))
    }
}

#[async_trait]
impl GenerationService for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.request(prompt, 400).await
    }

    async fn check_connectivity(&self) -> bool {
        match self.request("Hello", 10).await {
            Ok(_) => {
                info!("Anthropic API connection test successful");
                true
            }
            Err(e) => {
                error!("Anthropic API connection test failed: {}", e);
                false
            }
        }
    }
}

/// Bounded retry with exponential backoff, applied to rate limits only.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following failed attempt `attempt` (0-based):
    /// base, 2x base, 4x base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt)
    }
}

/// Turns a lead and client profile into one personalized outreach message.
/// Input checks happen before any network call.
pub struct MessageGenerator {
    service: Arc<dyn GenerationService>,
    retry: RetryPolicy,
}

impl MessageGenerator {
    pub fn new(service: Arc<dyn GenerationService>, retry: RetryPolicy) -> Self {
        Self { service, retry }
    }

    pub async fn generate_outreach_message(
        &self,
        lead: &Lead,
        profile: &ClientProfile,
    ) -> Result<String, GenerationError> {
        let name = present(&lead.name).ok_or(GenerationError::MissingField("lead name"))?;
        let company = present(&lead.company).ok_or(GenerationError::MissingField("lead company"))?;
        if profile.name.trim().is_empty() {
            return Err(GenerationError::MissingField("client name"));
        }

        let prompt = build_prompt(name, company, &profile.name, &profile.offer);
        let mut attempt = 0;
        loop {
            info!(
                "Generating message for {} at {} (attempt {})",
                name,
                company,
                attempt + 1
            );
            match self.service.generate(&prompt).await {
                Ok(message) => {
                    info!("Successfully generated message for {}", name);
                    return Ok(message);
                }
                Err(GenerationError::RateLimited) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Rate limit hit, retrying in {} seconds...",
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(GenerationError::RateLimited) => {
                    error!(
                        "Rate limit exceeded after {} retries",
                        self.retry.max_retries
                    );
                    return Err(GenerationError::RateLimited);
                }
                Err(e) => {
                    error!("Failed to generate message for {}: {}", name, e);
                    return Err(e);
                }
            }
        }
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

fn build_prompt(lead_name: &str, lead_company: &str, client_name: &str, offer: &str) -> String {
    format!(
        "You are an expert sales agent specializing in personalized outreach. \
         Write a compelling, personalized cold outreach email to {lead_name} at {lead_company}. \
         \n\nContext:\
         \n- You represent {client_name}\
         \n- Your offer: {offer}\
         \n- Target: {lead_name} at {lead_company}\
         \n\nRequirements:\
         \n- Make the message friendly, concise, and highly personalized\
         \n- Reference specific aspects of {lead_company} that make them a good fit\
         \n- Avoid generic language - be specific and relevant\
         \n- Include a clear, compelling call to action\
         \n- Keep the tone professional but approachable\
         \n- Maximum 150 words\
         \n\nGenerate the email body only (no subject line):"
    )
}
