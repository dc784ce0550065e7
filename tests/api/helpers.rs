use digest_publisher::configuration::{DatabaseSettings, Settings, get_configuration};
use digest_publisher::models::OutboundMessage;
use digest_publisher::publish_job::PublishJob;
use digest_publisher::startup::{Application, get_connection_pool};
use digest_publisher::telemetry::{get_subscriber, init_subscriber};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use secrecy::Secret;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::sync::LazyLock;
use uuid::Uuid;
use wiremock::MockServer;

// Ensure that the `tracing` stack is only initialised once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db_pool: PgPool,
    pub gateway_server: MockServer,
    pub api_client: reqwest::Client,
    pub configuration: Settings,
}

pub struct TestSubscription<'a> {
    pub topic: &'a str,
    pub optional_text: Option<&'a str>,
    pub status: &'a str,
}

impl Default for TestSubscription<'_> {
    fn default() -> Self {
        Self {
            topic: "Rust",
            optional_text: None,
            status: "subscribed",
        }
    }
}

impl TestApp {
    pub async fn get_cron(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/cron", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_health_check(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/health_check", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn insert_subscription(&self, subscription: TestSubscription<'_>) -> i64 {
        let email: String = SafeEmail().fake();
        let (id,): (i64,) = sqlx::query_as(
            r#"
              INSERT INTO subscriptions (
                email,
                topic,
                optional_text,
                subscription_status
              )
              VALUES ($1, $2, $3, $4)
              RETURNING id
            "#,
        )
        .bind(email)
        .bind(subscription.topic)
        .bind(subscription.optional_text)
        .bind(subscription.status)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to insert subscription.");

        id
    }

    pub fn publish_job(&self) -> PublishJob<PgPool> {
        PublishJob::from_settings(self.db_pool.clone(), &self.configuration)
            .expect("Failed to build publish job.")
    }

    /// Decode every message the gateway mock has received so far.
    pub async fn published_messages(&self) -> Vec<OutboundMessage> {
        let mut messages: Vec<OutboundMessage> = self
            .gateway_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| {
                let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
                let batch = body["messages"].as_array().unwrap();
                assert_eq!(batch.len(), 1);
                OutboundMessage::decode(batch[0]["data"].as_str().unwrap()).unwrap()
            })
            .collect();
        messages.sort_by_key(|message| message.id);

        messages
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    LazyLock::force(&TRACING);

    // Launch a mock server to stand in for the message gateway
    let gateway_server = MockServer::start().await;

    // Randomise configuration to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a different database for each test case
        c.database.database_name = Uuid::new_v4().to_string();
        // Use a random OS port
        c.application.port = 0;
        // Use the mock server as gateway
        c.gateway.base_url = Some(gateway_server.uri());
        c.gateway.api_key = Some(Secret::new(Uuid::new_v4().to_string()));
        c.gateway.timeout_milliseconds = 200;
        customise(&mut c);
        c
    };

    // Create and migrate the database
    configure_database(&configuration.database).await;

    // Launch the application as a background task
    let application = Application::build(configuration.clone())
        .await
        .expect("Failed to build application.");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://localhost:{}", application_port),
        port: application_port,
        db_pool: get_connection_pool(&configuration.database),
        gateway_server,
        api_client: reqwest::Client::new(),
        configuration,
    }
}

async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let maintenance_settings = DatabaseSettings {
        database_name: "postgres".to_string(),
        username: "postgres".to_string(),
        password: Secret::new("password".to_string()),
        ..config.clone()
    };
    let mut connection = PgConnection::connect_with(&maintenance_settings.connect_options())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect_with(config.connect_options())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");
    connection_pool
}
