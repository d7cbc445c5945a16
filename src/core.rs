//! Core DocHaus functionality
//!
//! [`ConnectionProvider`] owns the one shared database connection. It is
//! created cheaply, connects on first use and hands every caller a clone of
//! the same [`ConnectionHandle`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use store_object::{DatabaseHandle, Entity, Repository, StoreError};
use tokio::sync::OnceCell;

use crate::connector::{Connector, MongoConnector};
use crate::errors::ConnectionError;
use config::DatabaseConfig;

/// Lazily initialized, process-shared database connection
///
/// The first call to [`get_connection`](Self::get_connection) runs the
/// connector; concurrent callers wait for that single attempt. The outcome,
/// success or failure, is kept for the life of the provider.
pub struct ConnectionProvider<C: Connector = MongoConnector> {
    connector: C,
    config: DatabaseConfig,
    explicit_uri: Option<String>,
    connection: OnceCell<Result<ConnectionHandle, ConnectionError>>,
    closed: AtomicBool,
    released: AtomicBool,
    attempts: AtomicUsize,
}

impl ConnectionProvider<MongoConnector> {
    /// Provider backed by the MongoDB driver
    pub fn new(config: DatabaseConfig) -> Self {
        Self::with_connector(MongoConnector, config)
    }
}

impl<C: Connector> ConnectionProvider<C> {
    pub fn with_connector(connector: C, config: DatabaseConfig) -> Self {
        Self {
            connector,
            config,
            explicit_uri: None,
            connection: OnceCell::new(),
            closed: AtomicBool::new(false),
            released: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Use `uri` ahead of the configured and environment URIs
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.explicit_uri = Some(uri.into());
        self
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Number of times the connector has been invoked
    pub fn connect_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Whether the first connection attempt has completed
    pub fn is_initialized(&self) -> bool {
        self.connection.initialized()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Shared connection handle, connecting on first use
    pub async fn get_connection(&self) -> Result<ConnectionHandle, ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }
        if self.is_initialized() {
            trace_log!("Reusing shared connection for '{}'", self.config.database);
        }

        let result = self
            .connection
            .get_or_init(|| self.initialize())
            .await
            .clone();

        // A disconnect may have landed while the first attempt was in flight
        if self.is_closed() {
            if let Ok(handle) = &result {
                self.release(handle).await;
            }
            return Err(ConnectionError::Closed);
        }
        result
    }

    async fn initialize(&self) -> Result<ConnectionHandle, ConnectionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let settings = self.config.settings(self.explicit_uri.as_deref())?;
        debug_log!(
            "Resolved connection settings for database '{}' (app name: {:?})",
            settings.database,
            settings.app_name
        );

        match self.connector.connect(&settings).await {
            Ok(database) => {
                tracing::info!("Connected to database '{}'", settings.database);
                Ok(ConnectionHandle::new(database))
            }
            Err(err) => {
                tracing::warn!(
                    "Connection to database '{}' failed: {}",
                    settings.database,
                    err
                );
                Err(err)
            }
        }
    }

    /// Release the shared connection
    ///
    /// Later calls to `get_connection` fail with [`ConnectionError::Closed`].
    /// A connection still being established is shut down as soon as it
    /// completes, and its waiting callers get `Closed`. Calling it again is a
    /// no-op.
    pub async fn disconnect(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(Ok(handle)) = self.connection.get() {
            self.release(handle).await;
        }
    }

    /// Shut the connection down; only the first call does anything
    async fn release(&self, handle: &ConnectionHandle) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        handle.shutdown().await;
        tracing::info!("Disconnected from database '{}'", handle.database_name());
    }
}

impl<C: Connector + std::fmt::Debug> std::fmt::Debug for ConnectionProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("connector", &self.connector)
            .field("database", &self.config.database)
            .field("initialized", &self.is_initialized())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Cloneable handle to the shared connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    database: Arc<dyn DatabaseHandle>,
}

impl ConnectionHandle {
    pub fn new(database: Arc<dyn DatabaseHandle>) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &dyn DatabaseHandle {
        self.database.as_ref()
    }

    pub fn database_name(&self) -> &str {
        self.database.database_name()
    }

    /// Repository over `collection`, validating the name
    pub fn repository<T: Entity>(&self, collection: &str) -> Result<Repository<T>, StoreError> {
        Repository::new(self.database.as_ref(), collection)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.database.ping().await
    }

    /// Whether both handles refer to the same underlying connection
    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        Arc::ptr_eq(&self.database, &other.database)
    }

    pub(crate) async fn shutdown(&self) {
        self.database.shutdown().await;
    }
}
