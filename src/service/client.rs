use super::types::*;
use super::JobService;
use crate::config::{ClientSettings, ValidationConfig};
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Client for the validation service REST API
pub struct HttpJobService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpJobService {
    pub fn new(settings: &ClientSettings) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ServiceError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Check the service is reachable
    pub async fn health(&self) -> Result<HealthResponse, ServiceError> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;
        Self::read_json(resp).await
    }
}

#[async_trait]
impl JobService for HttpJobService {
    async fn create_job(
        &self,
        idea_id: &str,
        config: &ValidationConfig,
    ) -> Result<JobCreated, ServiceError> {
        let url = format!("{}/api/v1/validations", self.base_url);
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(idea_id = idea_id, request_id = %request_id, "Creating validation job");

        let body = CreateJobRequest {
            idea_id: idea_id.to_string(),
            config: config.clone(),
        };
        let resp = self
            .authorize(self.client.post(&url))
            .header("X-Request-Id", &request_id)
            .json(&body)
            .send()
            .await?;

        let created: JobCreated = Self::read_json(resp).await?;
        created.validate()?;
        Ok(created)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ServiceError> {
        let url = format!("{}/api/v1/validations/{}/status", self.base_url, job_id);
        let resp = self.authorize(self.client.get(&url)).send().await?;

        let report: JobStatusReport = Self::read_json(resp).await?;
        report.validate()?;
        Ok(report)
    }

    async fn job_result(&self, job_id: &str) -> Result<JobResultReport, ServiceError> {
        let url = format!("{}/api/v1/validations/{}/result", self.base_url, job_id);
        let resp = self.authorize(self.client.get(&url)).send().await?;

        let report: JobResultReport = Self::read_json(resp).await?;
        report.validate()?;
        Ok(report)
    }
}
