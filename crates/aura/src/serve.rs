// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `aura serve` and `aura checkin` command implementations.
//!
//! `serve` runs the single-tenant companion: one startup check-in, then the
//! change listener and the check-in scheduler side by side until a shutdown
//! signal. `checkin` runs only the scheduler, fanned out over every user in
//! the store.

use std::sync::Arc;

use aura_agent::{
    ChangeListener, CheckInKind, CheckInSender, MemoryAccessor, Persona, ProactiveScheduler,
    ResponsePipeline, UserSource, load_persona, shutdown,
};
use aura_config::model::AuraConfig;
use aura_core::{AuraError, HealthStatus, PluginAdapter, StorageAdapter, UserId};
use aura_gemini::GeminiProvider;
use aura_storage::SqliteStorage;
use tracing::{error, info, warn};

/// Storage, provider and persona shared by both long-running commands.
struct Stack {
    storage: Arc<SqliteStorage>,
    provider: Arc<GeminiProvider>,
    persona: Persona,
}

impl Stack {
    async fn open(config: &AuraConfig) -> Result<Self, AuraError> {
        let provider = Arc::new(GeminiProvider::new(&config.gemini).inspect_err(|_| {
            eprintln!(
                "error: Gemini API key required. Set gemini.api_key in aura.toml, or the GEMINI_API_KEY or AURA_GEMINI_API_KEY env var"
            );
        })?);

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        check_adapter(&storage).await?;
        check_adapter(provider.as_ref()).await?;
        let persona = load_persona(&config.agent).await;

        Ok(Self {
            storage: Arc::new(storage),
            provider,
            persona,
        })
    }

    fn check_in_sender(&self, config: &AuraConfig) -> CheckInSender {
        CheckInSender::new(
            self.provider.clone(),
            self.storage.clone(),
            MemoryAccessor::new(self.storage.clone()),
            self.persona.clone(),
            config.gemini.temperature,
            config.checkin.personalize,
        )
    }

    async fn close(&self) {
        if let Err(e) = self.provider.shutdown().await {
            warn!(error = %e, "provider shutdown failed");
        }
        if let Err(e) = self.storage.close().await {
            warn!(error = %e, "storage close failed");
        }
    }
}

/// Runs the `aura serve` command.
pub async fn run_serve(config: AuraConfig) -> Result<(), AuraError> {
    init_tracing(&config.agent.log_level);
    info!(name = %config.agent.name, "starting aura serve");

    let stack = Stack::open(&config).await?;
    let user = UserId::new(config.agent.user_id.clone());
    let cancel = shutdown::install_signal_handler();
    let sender = stack.check_in_sender(&config);

    if config.checkin.startup_message {
        if let Err(e) = sender.send(&user, CheckInKind::Startup).await {
            warn!(user_id = %user, error = %e, "startup check-in failed");
        }
    }

    let scheduler_task = if config.checkin.enabled {
        let scheduler = ProactiveScheduler::new(
            sender,
            UserSource::Fixed(user.clone()),
            &config.checkin,
            chrono::Local::now().naive_local(),
        )?;
        Some(tokio::spawn(scheduler.run(cancel.clone())))
    } else {
        info!("check-ins disabled by configuration");
        None
    };

    let pipeline = ResponsePipeline::from_config(
        &config,
        stack.provider.clone(),
        stack.storage.clone(),
        stack.persona.clone(),
    );
    let listener = ChangeListener::new(stack.storage.clone(), Arc::new(pipeline), user);
    let listener_result = match tokio::spawn(listener.run(cancel.clone())).await {
        Ok(result) => result,
        Err(e) => Err(AuraError::Internal(format!("listener task failed: {e}"))),
    };

    // The listener only returns early if its feed ends; stop the scheduler with it.
    cancel.cancel();
    if let Some(task) = scheduler_task {
        if let Err(e) = task.await {
            error!(error = %e, "scheduler task failed");
        }
    }

    stack.close().await;
    info!("aura serve stopped");
    listener_result
}

/// Runs the `aura checkin` command.
pub async fn run_checkin(config: AuraConfig) -> Result<(), AuraError> {
    init_tracing(&config.agent.log_level);
    if !config.checkin.enabled {
        warn!("check-ins disabled by configuration, nothing to do");
        return Ok(());
    }
    info!("starting aura checkin");

    let stack = Stack::open(&config).await?;
    let cancel = shutdown::install_signal_handler();
    let scheduler = ProactiveScheduler::new(
        stack.check_in_sender(&config),
        UserSource::Directory(stack.storage.clone()),
        &config.checkin,
        chrono::Local::now().naive_local(),
    )?;

    scheduler.run(cancel).await;
    stack.close().await;
    info!("aura checkin stopped");
    Ok(())
}

/// Logs an adapter's identity and fails startup if it reports itself unhealthy.
async fn check_adapter(adapter: &dyn PluginAdapter) -> Result<(), AuraError> {
    match adapter.health_check().await? {
        HealthStatus::Healthy => {
            info!(
                adapter = adapter.name(),
                kind = %adapter.adapter_type(),
                version = %adapter.version(),
                "adapter ready"
            );
            Ok(())
        }
        HealthStatus::Degraded(reason) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter degraded");
            Ok(())
        }
        HealthStatus::Unhealthy(reason) => Err(AuraError::Internal(format!(
            "{} adapter unhealthy: {reason}",
            adapter.name()
        ))),
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aura={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_config::model::StorageConfig;
    use aura_test_utils::MockProvider;

    fn storage_config(dir: &tempfile::TempDir) -> StorageConfig {
        StorageConfig {
            database_path: dir.path().join("aura.db").to_string_lossy().into_owned(),
            wal_mode: true,
            namespace: "test-ns".to_string(),
            poll_interval_ms: 10,
        }
    }

    #[tokio::test]
    async fn uninitialized_storage_fails_the_startup_check() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(storage_config(&dir));
        let err = check_adapter(&storage).await.unwrap_err();
        assert!(err.to_string().contains("sqlite adapter unhealthy"), "got: {err}");
    }

    #[tokio::test]
    async fn initialized_adapters_pass_the_startup_check() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(storage_config(&dir));
        storage.initialize().await.unwrap();
        check_adapter(&storage).await.unwrap();
        check_adapter(&MockProvider::new()).await.unwrap();
        storage.close().await.unwrap();
    }
}
