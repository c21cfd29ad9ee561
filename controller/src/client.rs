use anyhow::Context;
use reqwest::{RequestBuilder, Response, StatusCode};

use home_common::{
    endpoints::{filter_eq, join_url},
    CommandId, CommandRow, ControllerConfig, SensorReading, StatusUpdate, FILTER_STATUS_PENDING,
    HEADER_API_KEY, HEADER_PREFER, ORDER_CREATED_ASC, PATH_COMMAND_QUEUE, PATH_SENSORS,
    PREFER_RETURN_MINIMAL,
};

use crate::{backend::ControllerBackend, error::ApiError};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    sensors_url: String,
    commands_url: String,
    backend_key: String,
}

impl ApiClient {
    pub fn new(config: &ControllerConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;

        Ok(Self {
            http,
            sensors_url: join_url(&config.api_base_url, PATH_SENSORS),
            commands_url: join_url(&config.backend.url, PATH_COMMAND_QUEUE),
            backend_key: config.backend.key.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(HEADER_API_KEY, &self.backend_key)
            .bearer_auth(&self.backend_key)
    }
}

impl ControllerBackend for ApiClient {
    async fn send_reading(&self, reading: &SensorReading) -> Result<(), ApiError> {
        let url = &self.sensors_url;
        let response = self
            .http
            .post(url)
            .json(reading)
            .send()
            .await
            .map_err(|source| transport(url, source))?;

        if response.status() != StatusCode::OK {
            return Err(unexpected_status(url, response).await);
        }
        Ok(())
    }

    async fn fetch_pending_commands(&self) -> Result<Vec<CommandRow>, ApiError> {
        let url = &self.commands_url;
        let response = self
            .authorized(self.http.get(url))
            .query(&[("status", FILTER_STATUS_PENDING), ("order", ORDER_CREATED_ASC)])
            .send()
            .await
            .map_err(|source| transport(url, source))?;

        if response.status() != StatusCode::OK {
            return Err(unexpected_status(url, response).await);
        }

        response
            .json::<Vec<CommandRow>>()
            .await
            .map_err(|source| ApiError::Decode {
                url: url.clone(),
                source,
            })
    }

    async fn update_command_status(
        &self,
        id: &CommandId,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        let url = &self.commands_url;
        let response = self
            .authorized(self.http.patch(url))
            .header(HEADER_PREFER, PREFER_RETURN_MINIMAL)
            .query(&[("id", filter_eq(id.as_str()))])
            .json(update)
            .send()
            .await
            .map_err(|source| transport(url, source))?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(unexpected_status(url, response).await),
        }
    }
}

fn transport(url: &str, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        url: url.to_string(),
        source,
    }
}

async fn unexpected_status(url: &str, response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ApiError::Status {
        url: url.to_string(),
        status,
        body,
    }
}
