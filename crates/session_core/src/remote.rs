//! Typed request/response boundary to the game backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    error::BackendFailure,
    protocol::{CommandRequest, LogPayload, RefreshSignal, StatusPayload},
};
use tracing::debug;
use url::Url;

use crate::error::{RemoteCause, RemoteError, RemoteOperation};

/// Acknowledgement of a dispatched command. The body is backend-defined and
/// never interpreted beyond the success/failure convention.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandAck {
    pub body: Value,
}

/// Every call is attempted exactly once; callers own any retry policy.
#[async_trait]
pub trait GameBackend: Send + Sync {
    async fn dispatch_command(&self, command: &str) -> Result<CommandAck, RemoteError>;
    async fn fetch_status(&self) -> Result<StatusPayload, RemoteError>;
    async fn fetch_log(&self) -> Result<LogPayload, RemoteError>;
    async fn fetch_refresh_signal(&self) -> Result<RefreshSignal, RemoteError>;
}

pub struct HttpGameBackend {
    http: Client,
    base: Url,
}

impl HttpGameBackend {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self> {
        let mut base = Url::parse(server_url.trim())
            .with_context(|| format!("invalid game server url: {server_url}"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, operation: RemoteOperation, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|err| RemoteError::other(operation, format!("bad endpoint {path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: RemoteOperation,
        path: &str,
    ) -> Result<T, RemoteError> {
        let url = self.endpoint(operation, path)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| RemoteError::new(operation, err))?;
        let text = read_success_body(operation, response).await?;
        serde_json::from_str(&text)
            .map_err(|err| RemoteError::new(operation, RemoteCause::Decode(err.to_string())))
    }
}

async fn read_success_body(
    operation: RemoteOperation,
    response: Response,
) -> Result<String, RemoteError> {
    let status = response.status();
    if !status.is_success() {
        return Err(RemoteError::new(
            operation,
            RemoteCause::Status(status.as_u16()),
        ));
    }
    response
        .text()
        .await
        .map_err(|err| RemoteError::new(operation, err))
}

#[async_trait]
impl GameBackend for HttpGameBackend {
    async fn dispatch_command(&self, command: &str) -> Result<CommandAck, RemoteError> {
        let operation = RemoteOperation::DispatchCommand;
        let url = self.endpoint(operation, "command")?;
        let response = self
            .http
            .post(url)
            .json(&CommandRequest {
                command: command.to_string(),
            })
            .send()
            .await
            .map_err(|err| RemoteError::new(operation, err))?;
        let text = read_success_body(operation, response).await?;

        // Non-JSON bodies still count as success.
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
        if let Some(failure) = BackendFailure::from_body(&body) {
            return Err(RemoteError::new(operation, failure));
        }
        debug!(%command, "command dispatched");
        Ok(CommandAck { body })
    }

    async fn fetch_status(&self) -> Result<StatusPayload, RemoteError> {
        self.get_json(RemoteOperation::FetchStatus, "status").await
    }

    async fn fetch_log(&self) -> Result<LogPayload, RemoteError> {
        self.get_json(RemoteOperation::FetchLog, "log").await
    }

    async fn fetch_refresh_signal(&self) -> Result<RefreshSignal, RemoteError> {
        self.get_json(RemoteOperation::FetchRefreshSignal, "need_refresh")
            .await
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
