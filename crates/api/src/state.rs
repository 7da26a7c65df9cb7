use std::sync::Arc;
use store::{JsonFileStorage, MemStorage, SharedEngine, Storage};
use tt_core::Engine;
use types::{ScheduleConfig, SubjectCatalog};

#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
}

impl AppState {
    /// Restores the last snapshot when a state file is configured, else
    /// starts empty with the default configuration.
    pub async fn init() -> anyhow::Result<Self> {
        let storage: Arc<dyn Storage> = match std::env::var("TIMETABLE__STATE_PATH") {
            Ok(path) => Arc::new(JsonFileStorage::new(path)),
            Err(_) => Arc::new(MemStorage::default()),
        };

        let engine = match storage.load().await? {
            Some(snapshot) => snapshot.into_engine(),
            None => Engine::new(ScheduleConfig::default(), SubjectCatalog::new()),
        };

        Ok(Self {
            engine: SharedEngine::new(engine, storage),
        })
    }
}
