//! Remote loot persistence client
//!
//! Accepts batches of finalized records and can return previously stored
//! records for startup hydration. Delivery is at-most-once: callers do not
//! retry a failed batch beyond the next natural periodic drain.

use std::time::Duration;

use async_trait::async_trait;

use crate::tracker_core::types::LootRecord;

#[derive(Debug)]
pub enum ClientError {
    Http(String),
    Status(u16),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "Transport error: {}", e),
            ClientError::Status(code) => write!(f, "Loot store returned status {}", code),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.to_string())
    }
}

/// Outbound persistence interface for loot records.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Submit one batch. Failure loses the batch (at-most-once).
    async fn submit_batch(&self, records: &[LootRecord]) -> Result<(), ClientError>;

    /// Fetch all stored records for the current session identity.
    async fn fetch_history(&self) -> Result<Vec<LootRecord>, ClientError>;
}

/// HTTP client posting JSON batches with a bearer session token.
pub struct HttpPersistenceClient {
    endpoint: String,
    session_token: String,
    http: reqwest::Client,
}

impl HttpPersistenceClient {
    pub fn new(endpoint: &str, session_token: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            session_token: session_token.to_string(),
            http,
        })
    }
}

#[async_trait]
impl PersistenceClient for HttpPersistenceClient {
    async fn submit_batch(&self, records: &[LootRecord]) -> Result<(), ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.session_token)
            .json(records)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn fetch_history(&self) -> Result<Vec<LootRecord>, ClientError> {
        let response = self
            .http
            .get(&self.endpoint)
            .bearer_auth(&self.session_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        let records: Vec<LootRecord> = response.json().await?;
        Ok(records)
    }
}
