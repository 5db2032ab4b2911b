// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::{Config, StoreBackend},
    error::{AppError, StoreError},
    notifier::Outbox,
    quiz::QuizService,
    store::{JsonFileBackend, MemoryBackend, SnapshotBackend, SqliteBackend},
};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QuizService>,
    pub outbox: Arc<Outbox>,
    pub config: Config,
}

impl AppState {
    /// Wires the quiz core onto `backend` with an in-process outbox.
    pub fn new(config: Config, backend: Arc<dyn SnapshotBackend>) -> Self {
        let outbox = Arc::new(Outbox::default());
        let service = Arc::new(QuizService::new(backend, config.admin_id, outbox.clone()));
        Self {
            service,
            outbox,
            config,
        }
    }

    /// Builds the state with the snapshot backend selected in `config`.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let backend = open_backend(&config).await?;
        Ok(Self::new(config, backend))
    }
}

async fn open_backend(config: &Config) -> Result<Arc<dyn SnapshotBackend>, AppError> {
    let backend: Arc<dyn SnapshotBackend> = match config.store_backend {
        StoreBackend::Json => {
            tracing::info!("Using JSON snapshots in {}", config.data_dir.display());
            Arc::new(JsonFileBackend::new(&config.data_dir))
        }
        StoreBackend::Sqlite => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                AppError::Config("DATABASE_URL must be set when STORE_BACKEND=sqlite".to_string())
            })?;
            let backend = SqliteBackend::connect(url)
                .await
                .map_err(|e: StoreError| AppError::Config(e.to_string()))?;
            tracing::info!("Using SQLite snapshots");
            Arc::new(backend)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory snapshots; nothing will be persisted");
            Arc::new(MemoryBackend::default())
        }
    };
    Ok(backend)
}

impl FromRef<AppState> for Arc<QuizService> {
    fn from_ref(state: &AppState) -> Self {
        state.service.clone()
    }
}

impl FromRef<AppState> for Arc<Outbox> {
    fn from_ref(state: &AppState) -> Self {
        state.outbox.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
