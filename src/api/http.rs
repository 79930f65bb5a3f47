use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::traits::{PropertyApi, UserApi};
use crate::api::types::{
    Credentials, DeleteRequest, LoginResponse, Registration, SearchPage, SearchRequest,
    UpdateRequest, User,
};
use crate::error::{ApiError, ApiResult, GENERIC_FAILURE};
use crate::models::{BrokerId, NewProperty, Property, PropertyId};

const USER_AGENT: &str = concat!("broker-portal/", env!("CARGO_PKG_VERSION"));

/// REST client for the portal backend
pub struct HttpPropertyApi {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpPropertyApi {
    /// Create a client with a 30 second request timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn dispatch(&self, request: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!("Portal API returned {}: {}", status, message);

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.dispatch(request).await?;
        let body = response.text().await?;
        debug!("Received {} bytes", body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pull `{ message }` out of an error body, or fall back to the generic text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

#[async_trait]
impl PropertyApi for HttpPropertyApi {
    async fn search(&self, request: &SearchRequest) -> ApiResult<SearchPage> {
        debug!("POST properties/search page={} limit={}", request.page, request.limit);
        self.send_json(self.client.post(self.url("properties/search")).json(request))
            .await
    }

    async fn get(&self, broker_id: Option<&BrokerId>, property_id: &PropertyId) -> ApiResult<Property> {
        let mut request = self
            .client
            .get(self.url(&format!("properties/{}", property_id)));
        if let Some(broker_id) = broker_id {
            request = request.query(&[("brokerId", broker_id.as_str())]);
        }
        self.send_json(request).await
    }

    async fn create(&self, property: &NewProperty) -> ApiResult<Property> {
        self.send_json(self.client.post(self.url("properties/add")).json(property))
            .await
    }

    async fn update(
        &self,
        broker_id: &BrokerId,
        property_id: &PropertyId,
        property: &NewProperty,
    ) -> ApiResult<Property> {
        let body = UpdateRequest {
            broker_id,
            property_id,
            property_data: property,
        };
        self.send_json(
            self.client
                .put(self.url(&format!("properties/{}", property_id)))
                .json(&body),
        )
        .await
    }

    async fn delete(&self, broker_id: &BrokerId, property_id: &PropertyId) -> ApiResult<()> {
        let body = DeleteRequest {
            property_id,
            broker_id,
        };
        self.dispatch(
            self.client
                .delete(self.url(&format!("properties/{}", property_id)))
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserApi for HttpPropertyApi {
    async fn register(&self, registration: &Registration) -> ApiResult<User> {
        if registration.password != registration.confirm_password {
            return Err(ApiError::validation("confirmPassword", "does not match password"));
        }
        self.send_json(self.client.post(self.url("users/register")).json(registration))
            .await
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.send_json(self.client.post(self.url("users/login")).json(credentials))
            .await
    }

    async fn get_user(&self, user_id: &BrokerId) -> ApiResult<User> {
        self.send_json(self.client.get(self.url(&format!("users/{}", user_id))))
            .await
    }
}
