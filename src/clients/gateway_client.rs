use crate::models::OutboundMessage;
use crate::utils::error_chain_fmt;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

#[derive(Debug)]
pub struct GatewayClient {
    base_url: String,
    api_key: Secret<String>,
    http_client: Client,
}

impl GatewayClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            http_client,
        })
    }

    pub fn publish_url(&self) -> String {
        format!("{}/publish", self.base_url.trim_end_matches('/'))
    }

    // The gateway accepts batches but every call carries exactly one message:
    // a failed call must only ever cost a single subscription.
    #[tracing::instrument(
        name = "Submitting a message to the gateway",
        skip_all,
        fields(subscription_id = %message.id, message_uuid = %message.uuid)
    )]
    pub async fn publish(&self, message: &OutboundMessage) -> Result<GatewayResponse, PublishError> {
        let data = message.encode()?;
        let request_body = PublishRequest {
            messages: [PublishedMessage { data: &data }],
        };
        let response = self
            .http_client
            .post(self.publish_url())
            .header("x-api-key", self.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(GatewayResponse { status, body })
    }
}

#[derive(Serialize, Debug)]
struct PublishRequest<'a> {
    messages: [PublishedMessage<'a>; 1],
}

#[derive(Serialize, Debug)]
struct PublishedMessage<'a> {
    data: &'a str,
}

/// Whatever the gateway answered. A non-2xx status is not an error here.
#[derive(Debug)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: String,
}

#[derive(thiserror::Error)]
pub enum PublishError {
    #[error("Failed to encode the outbound message.")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to reach the message gateway.")]
    Transport(#[from] reqwest::Error),
}

impl std::fmt::Debug for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
