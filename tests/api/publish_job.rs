use crate::helpers::{TestSubscription, spawn_app};
use claims::assert_matches;
use digest_publisher::domain::ValidationError;
use digest_publisher::publish_job::DeliveryOutcome;
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn the_job_reads_subscriptions_from_the_database_in_id_order() {
    // Arrange
    let app = spawn_app().await;
    let first = app.insert_subscription(TestSubscription::default()).await;
    app.insert_subscription(TestSubscription {
        status: "unsubscribed",
        ..Default::default()
    })
    .await;
    let third = app.insert_subscription(TestSubscription::default()).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.gateway_server)
        .await;

    // Act
    let report = app.publish_job().run().await.unwrap();

    // Assert
    let ids: Vec<i64> = report.items.iter().map(|i| i.subscription_id).collect();
    assert_eq!(ids, vec![first, third]);
}

#[tokio::test]
async fn a_blank_topic_is_skipped_and_the_rest_are_published() {
    // Arrange
    let app = spawn_app().await;
    app.insert_subscription(TestSubscription {
        topic: "  ",
        ..Default::default()
    })
    .await;
    app.insert_subscription(TestSubscription::default()).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.gateway_server)
        .await;

    // Act
    let report = app.publish_job().run().await.unwrap();

    // Assert
    assert_eq!(report.total(), 2);
    assert_eq!(report.skipped(), 1);
    assert_matches!(
        &report.items[0].outcome,
        DeliveryOutcome::Skipped(ValidationError::Topic(_))
    );
}

#[tokio::test]
async fn a_second_run_publishes_the_same_subscriptions_again() {
    // Arrange
    let app = spawn_app().await;
    app.insert_subscription(TestSubscription::default()).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.gateway_server)
        .await;
    let job = app.publish_job();

    // Act
    job.run().await.unwrap();
    job.run().await.unwrap();

    // Assert
    let messages = app.published_messages().await;
    assert_eq!(messages.len(), 2);
    assert_ne!(messages[0].uuid, messages[1].uuid);
}

#[tokio::test]
async fn a_row_that_cannot_be_decoded_is_skipped_and_the_rest_are_published() {
    // Arrange
    let app = spawn_app().await;
    app.insert_subscription(TestSubscription::default()).await;
    // Loosen the schema so a row the reader cannot decode can be stored
    sqlx::query("ALTER TABLE subscriptions ALTER COLUMN email DROP NOT NULL;")
        .execute(&app.db_pool)
        .await
        .unwrap();
    let (malformed,): (i64,) = sqlx::query_as(
        "INSERT INTO subscriptions (email, topic) VALUES (NULL, 'Rust') RETURNING id",
    )
    .fetch_one(&app.db_pool)
    .await
    .unwrap();
    app.insert_subscription(TestSubscription::default()).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.gateway_server)
        .await;

    // Act
    let report = app.publish_job().run().await.unwrap();

    // Assert
    assert_eq!(report.total(), 3);
    assert_eq!(report.submitted(), 2);
    assert_eq!(report.items[1].subscription_id, malformed);
    assert_matches!(
        &report.items[1].outcome,
        DeliveryOutcome::Skipped(ValidationError::Row(_))
    );
}
