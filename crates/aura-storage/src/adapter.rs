// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the store traits.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{OnceCell, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use aura_config::model::StorageConfig;
use aura_core::{
    AdapterType, AuraError, ChangeFeed, HealthStatus, MemoryStore, Message, MessageStore,
    NewMessage, PluginAdapter, StorageAdapter, Subscription, UserId,
};

use crate::database::{Database, map_tr_err};
use crate::feed::{FEED_CAPACITY, Watcher};
use crate::queries;

/// SQLite-backed document store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`]. Every record is scoped to the configured
/// namespace.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
    appended: watch::Sender<u64>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        let (appended, _) = watch::channel(0);
        Self {
            config,
            db: OnceCell::new(),
            appended,
        }
    }

    /// The namespace all records are scoped to.
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, AuraError> {
        self.db.get().ok_or_else(|| AuraError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AuraError> {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AuraError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), AuraError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| AuraError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(
            path = %self.config.database_path,
            namespace = %self.config.namespace,
            "SQLite storage initialized"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), AuraError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStorage {
    async fn append_message(
        &self,
        user: &UserId,
        message: NewMessage,
    ) -> Result<Message, AuraError> {
        let stored =
            queries::messages::append_message(self.db()?, self.namespace(), user, message).await?;
        self.appended.send_modify(|n| *n = n.wrapping_add(1));
        Ok(stored)
    }

    async fn latest_messages(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<Message>, AuraError> {
        queries::messages::latest_messages(self.db()?, self.namespace(), user, limit).await
    }

    async fn list_users(&self) -> Result<Vec<UserId>, AuraError> {
        queries::users::list_users(self.db()?, self.namespace()).await
    }
}

#[async_trait]
impl MemoryStore for SqliteStorage {
    async fn load_summary(&self, user: &UserId) -> Result<Option<String>, AuraError> {
        queries::memory::load_summary(self.db()?, self.namespace(), user).await
    }

    async fn save_summary(&self, user: &UserId, summary: &str) -> Result<(), AuraError> {
        queries::memory::save_summary(self.db()?, self.namespace(), user, summary).await
    }
}

#[async_trait]
impl ChangeFeed for SqliteStorage {
    async fn subscribe(&self, user: &UserId) -> Result<Subscription, AuraError> {
        let db = self.db()?.clone();
        let cursor = queries::messages::high_water_mark(&db, self.namespace(), user).await?;

        let appended = self.appended.subscribe();

        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let cancel = CancellationToken::new();
        Watcher {
            db,
            namespace: self.config.namespace.clone(),
            user: user.clone(),
            cursor,
            poll_interval: Duration::from_millis(self.config.poll_interval_ms),
            appended,
        }
        .spawn(tx, cancel.clone());

        Ok(Subscription::new(rx, cancel))
    }
}
