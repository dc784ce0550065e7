use anyhow::Result;
use digest_publisher::configuration::get_configuration;
use digest_publisher::publish_job::PublishJob;
use digest_publisher::startup::get_connection_pool;
use digest_publisher::telemetry::{get_subscriber, init_subscriber};

// Runs a single publish pass, for hosts that prefer an external cron.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = get_subscriber("publish_once".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration.");
    let connection_pool = get_connection_pool(&configuration.database);
    let report = PublishJob::from_settings(connection_pool, &configuration)?
        .run()
        .await?;

    println!(
        "{} messages processed ({} submitted, {} skipped, {} failed).",
        report.total(),
        report.submitted(),
        report.skipped(),
        report.failed()
    );

    Ok(())
}
