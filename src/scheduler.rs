use crate::configuration::Settings;
use crate::models::SubscriptionStore;
use crate::publish_job::PublishJob;
use crate::startup::get_connection_pool;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

pub async fn run_scheduler_until_stopped(configuration: Settings) -> Result<(), anyhow::Error> {
    let connection_pool = get_connection_pool(&configuration.database);
    let publish_job = PublishJob::from_settings(connection_pool, &configuration)?;

    scheduler_loop(
        &publish_job,
        configuration.job.interval(),
        configuration.job.run_on_startup,
    )
    .await
}

async fn scheduler_loop<S>(
    publish_job: &PublishJob<S>,
    period: Duration,
    run_on_startup: bool,
) -> Result<(), anyhow::Error>
where
    S: SubscriptionStore,
{
    if period.is_zero() {
        anyhow::bail!("The publish interval must be greater than zero.");
    }

    let start = if run_on_startup {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        // A failed run is reported and retried on the next tick.
        match publish_job.run().await {
            Ok(report) => {
                tracing::info!(total = report.total(), "Scheduled publish run finished.")
            }
            Err(e) => tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Scheduled publish run failed."
            ),
        }
    }
}
