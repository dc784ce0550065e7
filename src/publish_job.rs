use crate::clients::{GatewayClient, PublishError};
use crate::configuration::{ConfigurationError, GatewaySettings, Settings};
use crate::domain::{SubscriberEmail, ValidationError};
use crate::models::{
    OutboundMessage, SubscriptionRecord, SubscriptionStore, get_active_subscriptions,
};
use crate::prompt::PromptTemplate;
use crate::utils::error_chain_fmt;

/// One publish pass: read every active subscription, render its prompt and
/// hand one message per subscription to the gateway.
pub struct PublishJob<S> {
    store: S,
    gateway: GatewaySettings,
    template: PromptTemplate,
    source_label: String,
}

impl<S> PublishJob<S>
where
    S: SubscriptionStore,
{
    pub fn new(
        store: S,
        gateway: GatewaySettings,
        template: PromptTemplate,
        source_label: String,
    ) -> Self {
        Self {
            store,
            gateway,
            template,
            source_label,
        }
    }

    pub fn from_settings(store: S, configuration: &Settings) -> Result<Self, anyhow::Error> {
        let template = configuration
            .prompt
            .template()
            .map_err(anyhow::Error::msg)?;

        Ok(Self::new(
            store,
            configuration.gateway.clone(),
            template,
            configuration.job.source_label.clone(),
        ))
    }

    #[tracing::instrument(
        name = "Publishing subscription digests",
        skip_all,
        fields(run_id = %uuid::Uuid::new_v4())
    )]
    pub async fn run(&self) -> Result<PublishReport, PublishJobError> {
        let gateway_client = self.gateway.client()?;
        let subscriptions = get_active_subscriptions(&self.store)
            .await
            .map_err(PublishJobError::StoreQuery)?;
        let mut report = PublishReport::default();

        for subscription in subscriptions {
            let item = match subscription {
                Ok(subscription) => ItemReport {
                    subscription_id: subscription.id,
                    outcome: self.publish_one(&gateway_client, &subscription).await,
                },
                Err(malformed) => ItemReport {
                    subscription_id: malformed.id,
                    outcome: skip(malformed.id, malformed.error),
                },
            };
            report.items.push(item);
        }

        tracing::info!(
            total = report.total(),
            submitted = report.submitted(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Publish run completed."
        );

        Ok(report)
    }

    async fn publish_one(
        &self,
        gateway_client: &GatewayClient,
        subscription: &SubscriptionRecord,
    ) -> DeliveryOutcome {
        let prompt = match self.template.render(subscription) {
            Ok(prompt) => prompt,
            Err(e) => return skip(subscription.id, e),
        };
        if let Err(e) = SubscriberEmail::parse(subscription.email.clone()) {
            tracing::warn!(
                subscription_id = subscription.id,
                error.message = %e,
                "Publishing a subscription with an unusual email address."
            );
        }
        let message = OutboundMessage::build(subscription, prompt, &self.source_label);

        match gateway_client.publish(&message).await {
            Ok(response) => {
                tracing::info!(
                    subscription_id = subscription.id,
                    message_uuid = %message.uuid,
                    status = response.status.as_u16(),
                    body = %response.body,
                    "Sent message to the gateway."
                );
                DeliveryOutcome::Submitted {
                    status: response.status.as_u16(),
                }
            }
            Err(e) => {
                tracing::error!(
                    subscription_id = subscription.id,
                    message_uuid = %message.uuid,
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to send message to the gateway."
                );
                DeliveryOutcome::Failed(e)
            }
        }
    }
}

fn skip(subscription_id: i64, e: ValidationError) -> DeliveryOutcome {
    tracing::error!(
        subscription_id,
        error.cause_chain = ?e,
        error.message = %e,
        "Skipping a malformed subscription."
    );
    DeliveryOutcome::Skipped(e)
}

#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The gateway answered, whatever the status.
    Submitted { status: u16 },
    Skipped(ValidationError),
    Failed(PublishError),
}

#[derive(Debug)]
pub struct ItemReport {
    pub subscription_id: i64,
    pub outcome: DeliveryOutcome,
}

#[derive(Debug, Default)]
pub struct PublishReport {
    pub items: Vec<ItemReport>,
}

impl PublishReport {
    /// Subscriptions read during the run, regardless of how each one fared.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn submitted(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeliveryOutcome::Submitted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeliveryOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeliveryOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.items
            .iter()
            .filter(|item| predicate(&item.outcome))
            .count()
    }
}

#[derive(thiserror::Error)]
pub enum PublishJobError {
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Failed to read active subscriptions.")]
    StoreQuery(#[source] sqlx::Error),
}

impl std::fmt::Debug for PublishJobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
