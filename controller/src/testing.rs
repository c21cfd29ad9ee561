use std::{cell::RefCell, collections::VecDeque};

use axum::Router;
use home_common::{
    BackendConfig, CommandId, CommandRow, CommandStatus, ControllerConfig, SensorReading,
    StatusUpdate,
};
use reqwest::StatusCode;
use tokio::net::TcpListener;

use crate::{backend::ControllerBackend, client::ApiClient, error::ApiError};

pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port that was bound and released, so connections are refused.
pub async fn unreachable_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn client_for(base: &str) -> ApiClient {
    let config = ControllerConfig {
        api_base_url: format!("{base}/api"),
        backend: BackendConfig {
            url: base.to_string(),
            key: "test-key".to_string(),
        },
        ..ControllerConfig::default()
    };
    ApiClient::new(&config).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send(SensorReading),
    Fetch,
    Update(CommandId, CommandStatus),
}

/// In-memory backend recording every call in order.
#[derive(Default)]
pub struct MockBackend {
    pub calls: RefCell<Vec<Call>>,
    pub pending: RefCell<VecDeque<Result<Vec<CommandRow>, ApiError>>>,
    pub reject_readings: bool,
    pub reject_updates: bool,
}

impl MockBackend {
    pub fn with_rows(rows: Vec<serde_json::Value>) -> Self {
        let backend = Self::default();
        backend
            .pending
            .borrow_mut()
            .push_back(Ok(rows.into_iter().map(CommandRow::from).collect()));
        backend
    }

    pub fn updates(&self) -> Vec<(CommandId, CommandStatus)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Update(id, status) => Some((id.clone(), *status)),
                _ => None,
            })
            .collect()
    }

    pub fn sent(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Send(_)))
            .count()
    }
}

pub fn rejected(status: StatusCode) -> ApiError {
    ApiError::Status {
        url: "mock://backend".to_string(),
        status,
        body: String::new(),
    }
}

impl ControllerBackend for MockBackend {
    async fn send_reading(&self, reading: &SensorReading) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::Send(reading.clone()));
        if self.reject_readings {
            return Err(rejected(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(())
    }

    async fn fetch_pending_commands(&self) -> Result<Vec<CommandRow>, ApiError> {
        self.calls.borrow_mut().push(Call::Fetch);
        self.pending
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn update_command_status(
        &self,
        id: &CommandId,
        update: &StatusUpdate,
    ) -> Result<(), ApiError> {
        self.calls
            .borrow_mut()
            .push(Call::Update(id.clone(), update.status));
        if self.reject_updates {
            return Err(rejected(StatusCode::NOT_FOUND));
        }
        Ok(())
    }
}
