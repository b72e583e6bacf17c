//! REST gateway backed by a cookie-carrying reqwest client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use taller_core::config::ClientConfig;
use taller_core::notification::{NotificationGateway, NotificationId, NotificationRecord};
use taller_core::session::{AuthGateway, Credentials, Identity, SessionCheck, UserId};
use taller_core::work_order::{MoveRequest, WorkOrder, WorkOrderGateway};
use taller_core::{Result, TallerError};

use super::dto::{CheckAuthResponse, ErrorBody, LoginResponse, MarkReadRequest};

/// Talks to the shop server's REST API.
///
/// One instance implements all three gateways so the session cookie set by
/// `login` rides along on every later request. The cookie jar can be handed
/// to the push transport so the stream authenticates the same way.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    config: ClientConfig,
    jar: Arc<Jar>,
}

impl HttpGateway {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_jar(config, Arc::new(Jar::default()))
    }

    pub fn with_jar(config: ClientConfig, jar: Arc<Jar>) -> Result<Self> {
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TallerError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            jar,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session cookie jar shared by every request of this gateway.
    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| TallerError::network(format!("Request to {path} failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        tracing::debug!("[HttpGateway] {} answered {}: {}", path, status, body);
        Err(map_http_error(status, &body, path))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint(path);
        let response = self.execute(self.client.get(&url), path).await?;
        decode(response, path).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| TallerError::network(format!("Failed to read {path} response: {e}")))?;
    Ok(serde_json::from_str(&body)?)
}

/// Maps a non-success status onto the shared error type.
pub(crate) fn map_http_error(status: StatusCode, body: &str, path: &str) -> TallerError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TallerError::authentication(message),
        StatusCode::NOT_FOUND => TallerError::not_found("resource", path),
        _ => TallerError::server(status.as_u16(), message),
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn check_auth(&self) -> Result<SessionCheck> {
        let response: CheckAuthResponse = self.get_json("auth/check-auth").await?;
        Ok(response.into())
    }

    async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        let path = "auth/login";
        let request = self.client.post(self.config.endpoint(path)).json(credentials);
        let response: LoginResponse = decode(self.execute(request, path).await?, path).await?;
        Ok(response.user.into())
    }

    async fn logout(&self) -> Result<()> {
        let path = "auth/logout";
        self.execute(self.client.post(self.config.endpoint(path)), path)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationGateway for HttpGateway {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<NotificationRecord>> {
        self.get_json(&format!("notifications/{user_id}")).await
    }

    async fn mark_read(&self, id: NotificationId) -> Result<()> {
        let path = format!("notifications/{id}");
        let request = self
            .client
            .put(self.config.endpoint(&path))
            .json(&MarkReadRequest { read: true });
        self.execute(request, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl WorkOrderGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<WorkOrder>> {
        self.get_json("work-orders").await
    }

    async fn move_order(&self, request: &MoveRequest) -> Result<WorkOrder> {
        let path = format!("work-orders/{}/move", request.order_id);
        let builder = self.client.put(self.config.endpoint(&path)).json(request);
        decode(self.execute(builder, &path).await?, &path).await
    }
}
