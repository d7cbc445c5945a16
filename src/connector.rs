//! Connectors
//!
//! A [`Connector`] turns resolved settings into a live database handle. The
//! provider calls it at most once.

use async_trait::async_trait;
use config::ConnectionSettings;
use mongodb::options::ClientOptions;
use mongodb::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use store_object::{DatabaseHandle, MemoryDatabase, MongoDatabase};

use crate::errors::ConnectionError;

/// Establishes a database connection
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn DatabaseHandle>, ConnectionError>;
}

/// Connects through the MongoDB driver and pings the server
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn DatabaseHandle>, ConnectionError> {
        let mut options = ClientOptions::parse(&settings.uri)
            .await
            .map_err(|e| ConnectionError::InvalidUri {
                uri: settings.uri.clone(),
                reason: e.to_string(),
            })?;

        if let Some(app_name) = &settings.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(timeout) = settings.connect_timeout {
            options.connect_timeout = Some(timeout);
        }
        if let Some(timeout) = settings.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }

        let client =
            Client::with_options(options).map_err(|e| ConnectionError::Connect(e.to_string()))?;
        let database = MongoDatabase::new(client, &settings.database);
        database
            .ping()
            .await
            .map_err(|e| ConnectionError::Connect(e.to_string()))?;

        Ok(Arc::new(database))
    }
}

/// Hands out in-process databases, one per database name
///
/// Clones share their databases, so a test can keep a clone and inspect what
/// a provider's repositories wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    databases: Arc<Mutex<HashMap<String, MemoryDatabase>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database by name, created on first use
    pub fn database(&self, name: &str) -> MemoryDatabase {
        let mut databases = match self.databases.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        databases
            .entry(name.to_string())
            .or_insert_with(|| MemoryDatabase::new(name))
            .clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn DatabaseHandle>, ConnectionError> {
        Ok(Arc::new(self.database(&settings.database)))
    }
}
