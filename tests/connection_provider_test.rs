//! Integration tests for the shared connection provider
//!
//! Uses the in-memory connector so no server is required.

use async_trait::async_trait;
use dochaus::prelude::*;
use dochaus::ConnectionSettings;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TEST_URI: &str = "mongodb://localhost:27017";

/// Memory connector that counts attempts, sleeps and can be told to fail
#[derive(Debug, Clone, Default)]
struct CountingConnector {
    inner: MemoryConnector,
    calls: Arc<AtomicUsize>,
    delay: Duration,
    fail_with: Option<String>,
}

impl CountingConnector {
    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for CountingConnector {
    async fn connect(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn DatabaseHandle>, ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.fail_with {
            Some(message) => Err(ConnectionError::Connect(message.clone())),
            None => self.inner.connect(settings).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<EntityId>,
    name: String,
    age: i32,
}

impl Entity for Person {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

fn person(name: &str, age: i32) -> Person {
    Person {
        id: None,
        name: name.to_string(),
        age,
    }
}

fn provider(connector: CountingConnector) -> ConnectionProvider<CountingConnector> {
    ConnectionProvider::with_connector(connector, DatabaseConfig::new("provider_test".to_string()))
        .with_uri(TEST_URI)
}

#[tokio::test]
async fn test_construction_does_not_connect() {
    let connector = CountingConnector::default();
    let provider = provider(connector.clone());

    assert_eq!(provider.connect_attempts(), 0);
    assert!(!provider.is_initialized());
    assert_eq!(connector.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_first_use_connects_once() {
    let connector = CountingConnector::slow(Duration::from_millis(50));
    let provider = Arc::new(provider(connector.clone()));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let provider = provider.clone();
        tasks.push(tokio::spawn(async move { provider.get_connection().await }));
    }

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap().unwrap());
    }

    assert_eq!(connector.calls(), 1);
    assert_eq!(provider.connect_attempts(), 1);
    assert!(handles.iter().all(|h| h.same_connection(&handles[0])));
    assert_eq!(handles[0].database_name(), "provider_test");
}

#[tokio::test]
async fn test_sequential_calls_reuse_handle() {
    let connector = CountingConnector::default();
    let provider = provider(connector.clone());

    let first = provider.get_connection().await.unwrap();
    let second = provider.get_connection().await.unwrap();

    assert!(first.same_connection(&second));
    assert_eq!(connector.calls(), 1);
}

#[tokio::test]
async fn test_failed_connection_is_memoized() {
    let connector = CountingConnector::failing("server unreachable");
    let provider = provider(connector.clone());

    let first = provider.get_connection().await.unwrap_err();
    let second = provider.get_connection().await.unwrap_err();

    assert_eq!(first, ConnectionError::Connect("server unreachable".to_string()));
    assert_eq!(first, second);
    assert_eq!(connector.calls(), 1);
    assert!(provider.is_initialized());
}

#[tokio::test]
async fn test_concurrent_callers_share_one_failure() {
    let connector = CountingConnector {
        delay: Duration::from_millis(50),
        ..CountingConnector::failing("server unreachable")
    };
    let provider = Arc::new(provider(connector.clone()));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let provider = provider.clone();
        tasks.push(tokio::spawn(async move { provider.get_connection().await }));
    }

    let mut errors = Vec::new();
    for task in tasks {
        errors.push(task.await.unwrap().unwrap_err());
    }

    assert_eq!(connector.calls(), 1);
    assert_eq!(provider.connect_attempts(), 1);
    assert!(errors
        .iter()
        .all(|e| *e == ConnectionError::Connect("server unreachable".to_string())));
}

#[tokio::test]
async fn test_invalid_uri_fails_before_connecting() {
    let connector = CountingConnector::default();
    let provider = ConnectionProvider::with_connector(
        connector.clone(),
        DatabaseConfig::new("provider_test".to_string()),
    )
    .with_uri("http://localhost:27017");

    let err = provider.get_connection().await.unwrap_err();
    assert!(matches!(err, ConnectionError::InvalidUri { .. }));

    // Remembered like any other failure
    let again = provider.get_connection().await.unwrap_err();
    assert_eq!(err, again);
    assert_eq!(connector.calls(), 0);
    assert_eq!(provider.connect_attempts(), 1);
}

#[tokio::test]
async fn test_empty_database_name_is_config_error() {
    let provider = ConnectionProvider::with_connector(
        CountingConnector::default(),
        DatabaseConfig::new(String::new()),
    )
    .with_uri(TEST_URI);

    let err = provider.get_connection().await.unwrap_err();
    assert!(matches!(err, ConnectionError::Config(_)));
}

#[tokio::test]
async fn test_repositories_share_the_connection() {
    let provider = provider(CountingConnector::default());
    let connection = provider.get_connection().await.unwrap();

    let writer = connection.repository::<Person>("people").unwrap();
    let reader = provider
        .get_connection()
        .await
        .unwrap()
        .repository::<Person>("people")
        .unwrap();

    let id = writer.insert(&person("Alice", 30)).await.unwrap();
    let found = reader.find_by_id(&id).await.unwrap();

    assert_eq!(found.name, "Alice");
    assert_eq!(found.id, Some(id));
}

#[tokio::test]
async fn test_invalid_collection_name_is_rejected() {
    let provider = provider(CountingConnector::default());
    let connection = provider.get_connection().await.unwrap();

    let err = connection.repository::<Person>("bad$name").unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn test_disconnect_closes_provider() {
    let connector = CountingConnector::default();
    let provider = provider(connector.clone());
    let connection = provider.get_connection().await.unwrap();
    let people = connection.repository::<Person>("people").unwrap();
    connection.ping().await.unwrap();

    provider.disconnect().await;

    assert!(provider.is_closed());
    assert_eq!(
        provider.get_connection().await.unwrap_err(),
        ConnectionError::Closed
    );
    assert!(connector.inner.database("provider_test").is_closed());

    // Handles obtained before the disconnect stop working too
    let err = people.count(&Filter::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::Connection(_)));

    // Idempotent
    provider.disconnect().await;
    assert_eq!(connector.calls(), 1);
}

#[tokio::test]
async fn test_disconnect_before_first_use() {
    let connector = CountingConnector::default();
    let provider = provider(connector.clone());

    provider.disconnect().await;

    assert_eq!(
        provider.get_connection().await.unwrap_err(),
        ConnectionError::Closed
    );
    assert_eq!(connector.calls(), 0);
}

#[tokio::test]
async fn test_disconnect_during_first_connect_shuts_it_down() {
    let connector = CountingConnector::slow(Duration::from_millis(100));
    let provider = Arc::new(provider(connector.clone()));

    let waiting = {
        let provider = provider.clone();
        tokio::spawn(async move { provider.get_connection().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    provider.disconnect().await;

    assert_eq!(waiting.await.unwrap().unwrap_err(), ConnectionError::Closed);
    assert!(connector.inner.database("provider_test").is_closed());
    assert_eq!(
        provider.get_connection().await.unwrap_err(),
        ConnectionError::Closed
    );
    assert_eq!(connector.calls(), 1);
}

#[tokio::test]
async fn test_callers_racing_disconnect_never_get_a_closed_handle() {
    let connector = CountingConnector::default();
    let provider = Arc::new(provider(connector.clone()));
    provider.get_connection().await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let provider = provider.clone();
        tasks.push(tokio::spawn(async move {
            match provider.get_connection().await {
                Ok(handle) => handle.ping().await.is_ok() || provider.is_closed(),
                Err(err) => err == ConnectionError::Closed,
            }
        }));
    }
    provider.disconnect().await;

    for task in tasks {
        assert!(task.await.unwrap());
    }
    assert!(connector.inner.database("provider_test").is_closed());
}

#[tokio::test]
async fn test_connection_error_converts_to_store_error() {
    let err: StoreError = ConnectionError::Closed.into();
    assert!(matches!(err, StoreError::Connection(message) if message.contains("closed")));
}
