use futures::FutureExt;

use scoring::Ledger;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed league document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    LockPoisoned,
}

pub trait LeagueStorage: Send + Sync {
    fn duplicate(&self) -> Box<dyn LeagueStorage>;

    /// Yields an empty ledger when nothing has been stored yet.
    fn load<'f, 'own>(&'own self) -> futures::future::BoxFuture<'f, Result<Ledger, StorageError>>
    where
        'own: 'f;

    fn save<'f, 'own>(
        &'own self,
        ledger: &'f Ledger,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f;
}

/// Keeps the whole league as one pretty-printed JSON document.
pub struct JsonFileStorage {
    path: std::sync::Arc<std::path::PathBuf>,
}

impl JsonFileStorage {
    pub fn new<P>(path: P) -> Self
    where
        P: Into<std::path::PathBuf>,
    {
        Self {
            path: std::sync::Arc::new(path.into()),
        }
    }

    fn temporary_path(&self) -> std::path::PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LeagueStorage for JsonFileStorage {
    fn duplicate(&self) -> Box<dyn LeagueStorage> {
        Box::new(Self {
            path: self.path.clone(),
        })
    }

    fn load<'f, 'own>(&'own self) -> futures::future::BoxFuture<'f, Result<Ledger, StorageError>>
    where
        'own: 'f,
    {
        async move {
            if !tokio::fs::try_exists(self.path.as_path()).await? {
                tracing::debug!(path = ?self.path, "No league document yet");
                return Ok(Ledger::new());
            }

            let content = tokio::fs::read(self.path.as_path()).await?;
            let ledger = serde_json::from_slice(&content)?;

            Ok(ledger)
        }
        .boxed()
    }

    fn save<'f, 'own>(
        &'own self,
        ledger: &'f Ledger,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f,
    {
        async move {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !tokio::fs::try_exists(parent).await.unwrap_or(false) {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }

            let content = serde_json::to_vec_pretty(ledger)?;

            // Readers must never see a half-written document.
            let temporary = self.temporary_path();
            tokio::fs::write(&temporary, content).await?;
            tokio::fs::rename(&temporary, self.path.as_path()).await?;

            Ok(())
        }
        .boxed()
    }
}

/// Holds the document in process memory. Duplicates share the same document.
#[derive(Default)]
pub struct MemoryStorage {
    document: std::sync::Arc<std::sync::Mutex<Ledger>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeagueStorage for MemoryStorage {
    fn duplicate(&self) -> Box<dyn LeagueStorage> {
        Box::new(Self {
            document: self.document.clone(),
        })
    }

    fn load<'f, 'own>(&'own self) -> futures::future::BoxFuture<'f, Result<Ledger, StorageError>>
    where
        'own: 'f,
    {
        let loaded = self
            .document
            .lock()
            .map(|ledger| ledger.clone())
            .map_err(|_| StorageError::LockPoisoned);

        async move { loaded }.boxed()
    }

    fn save<'f, 'own>(
        &'own self,
        ledger: &'f Ledger,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f,
    {
        let saved = self
            .document
            .lock()
            .map(|mut document| *document = ledger.clone())
            .map_err(|_| StorageError::LockPoisoned);

        async move { saved }.boxed()
    }
}

/// Serializes every access to the underlying storage, so that a
/// load-mutate-save cycle never interleaves with another one.
pub struct Store {
    storage: Box<dyn LeagueStorage>,
    lock: tokio::sync::Mutex<()>,
}

impl Store {
    pub fn new(storage: Box<dyn LeagueStorage>) -> Self {
        Self {
            storage,
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub async fn transaction<F, T>(&self, func: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Ledger) -> T,
    {
        let _guard = self.lock.lock().await;

        let mut ledger = self.storage.load().await?;
        let result = func(&mut ledger);
        self.storage.save(&ledger).await?;

        Ok(result)
    }

    pub async fn read<F, T>(&self, func: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Ledger) -> T,
    {
        let _guard = self.lock.lock().await;

        let ledger = self.storage.load().await?;
        Ok(func(&ledger))
    }
}
