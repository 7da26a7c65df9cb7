use async_trait::async_trait;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tt_core::{Engine, Occupancy, Registry};
use types::{CourseInstance, ScheduleConfig, SubjectCatalog};

/// Serializable image of the whole engine state. Round-tripping preserves
/// every course and occupancy field exactly.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub config: ScheduleConfig,
    #[serde(default)]
    pub catalog: SubjectCatalog,
    #[serde(default)]
    pub courses: Vec<CourseInstance>,
    #[serde(default)]
    pub occupancy: Occupancy,
}

impl Snapshot {
    pub fn capture(engine: &Engine) -> Self {
        Self {
            config: engine.config.clone(),
            catalog: engine.catalog.clone(),
            courses: engine.registry.iter().cloned().collect(),
            occupancy: engine.occupancy.clone(),
        }
    }

    pub fn into_engine(self) -> Engine {
        Engine {
            config: self.config,
            catalog: self.catalog,
            registry: Registry::from_courses(self.courses),
            occupancy: self.occupancy,
        }
    }
}

/// Best-effort persistence collaborator. The engine never waits on it and
/// never assumes a partial save.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    async fn load(&self) -> anyhow::Result<Option<Snapshot>>;
    async fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()>;
}

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn load(&self) -> anyhow::Result<Option<Snapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// In-memory storage, for tests and for running without a state file.
#[derive(Default)]
pub struct MemStorage {
    inner: RwLock<Option<Snapshot>>,
}

#[async_trait]
impl Storage for MemStorage {
    async fn load(&self) -> anyhow::Result<Option<Snapshot>> {
        Ok(self.inner.read().clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        *self.inner.write() = Some(snapshot.clone());
        Ok(())
    }
}

/// Engine state shared across request handlers. One lock guards the
/// registry and occupancy pair, so every placement runs to completion
/// without interleaving.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<RwLock<Engine>>,
    storage: Arc<dyn Storage>,
}

impl SharedEngine {
    pub fn new(engine: Engine, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
            storage,
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Engine> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Engine> {
        self.inner.write()
    }

    /// Fire-and-forget save of the current state. Failures are logged, not
    /// surfaced: persistence is best-effort from the engine's perspective.
    pub fn persist(&self) {
        let snapshot = Snapshot::capture(&self.inner.read());
        let storage = self.storage.clone();
        tokio::spawn(async move {
            if let Err(e) = storage.save(&snapshot).await {
                error!(?e, "failed to persist snapshot");
            }
        });
    }
}
