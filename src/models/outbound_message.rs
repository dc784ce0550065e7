use crate::domain::SupplementaryText;
use crate::models::SubscriptionRecord;
use crate::prompt::Prompt;
use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The envelope handed to the gateway for one subscription in one run.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub id: i64,
    pub uuid: Uuid,
    pub email: String,
    pub topic: String,
    pub optional_text: String,
    pub repository_name: Option<String>,
    pub source: String,
    pub prompt: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl OutboundMessage {
    /// The email is forwarded exactly as stored. The topic comes from the
    /// prompt, which was only rendered for a valid one.
    pub fn build(record: &SubscriptionRecord, prompt: Prompt, source: &str) -> Self {
        let optional_text = SupplementaryText::parse(record.optional_text.as_deref())
            .map(|text| text.as_ref().to_string())
            .unwrap_or_default();
        let topic = prompt.topic().as_ref().to_string();

        Self {
            id: record.id,
            uuid: Uuid::new_v4(),
            email: record.email.clone(),
            topic,
            optional_text,
            repository_name: record.repository_name.clone(),
            source: source.to_string(),
            prompt: prompt.into(),
            created_at: Utc::now(),
        }
    }

    /// Base64 over the UTF-8 bytes of the JSON form, so multi-byte text
    /// survives the trip to the gateway.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;

        Ok(STANDARD.encode(json))
    }

    pub fn decode(data: &str) -> Result<Self, anyhow::Error> {
        let json = STANDARD
            .decode(data)
            .context("Failed to decode base64 message data.")?;
        let message =
            serde_json::from_slice(&json).context("Failed to deserialize message data.")?;

        Ok(message)
    }
}
