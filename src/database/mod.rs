//! Album storage.
//!
//! Handlers never talk to a driver directly: they go through [`Catalog`],
//! which owns the connection and knows whether it has been established yet.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{error, info};
use thiserror::Error;

use crate::model::{Album, AlbumId, AlbumPatch, NewAlbum};

pub mod drivers;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error parsing url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("error encoding document: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("error reading fixtures from {}: {source}", path.display())]
    FixtureIo { path: PathBuf, source: io::Error },
    #[error("error parsing fixtures: {0}")]
    FixtureFormat(#[from] serde_json::Error),
    #[error("album store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// One call per HTTP request; implementations must be usable concurrently.
#[async_trait]
pub trait AlbumStore: Send + Sync {
    async fn list_albums(&self) -> Result<Vec<Album>, StoreError>;

    async fn insert_album(&self, album: &NewAlbum) -> Result<AlbumId, StoreError>;

    async fn update_album(&self, id: &AlbumId, patch: &AlbumPatch) -> Result<UpdateOutcome, StoreError>;

    /// Returns the number of removed documents, 0 or 1.
    async fn delete_album(&self, id: &AlbumId) -> Result<u64, StoreError>;

    async fn delete_all(&self) -> Result<u64, StoreError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotReady {
    #[error("database connection is still being established")]
    Connecting,
    #[error("database connection failed: {0}")]
    Failed(String),
}

enum StoreState {
    Connecting,
    Ready(Arc<dyn AlbumStore>),
    Failed(String),
}

/// Shared handle to the album store, managed by rocket.
#[derive(Clone)]
pub struct Catalog {
    state: Arc<RwLock<StoreState>>,
}

impl Catalog {
    pub fn connecting() -> Catalog {
        Catalog {
            state: Arc::new(RwLock::new(StoreState::Connecting)),
        }
    }

    pub fn ready<S: AlbumStore + 'static>(store: S) -> Catalog {
        Catalog {
            state: Arc::new(RwLock::new(StoreState::Ready(Arc::new(store)))),
        }
    }

    pub fn store(&self) -> Result<Arc<dyn AlbumStore>, NotReady> {
        let state = self.state.read().map_err(|_| NotReady::Failed("catalog lock poisoned".into()))?;
        match *state {
            StoreState::Connecting => Err(NotReady::Connecting),
            StoreState::Ready(ref store) => Ok(store.clone()),
            StoreState::Failed(ref msg) => Err(NotReady::Failed(msg.clone())),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.store().is_ok()
    }

    /// Establishes the connection and records the outcome. Never panics;
    /// a failure leaves the catalog permanently in the failed state.
    pub async fn connect(&self, url: &str, db_name: &str) {
        let next = match drivers::get_driver(url, db_name).await {
            Ok(store) => {
                info!("connected to album store");
                StoreState::Ready(store)
            }
            Err(e) => {
                error!("failed to connect to album store: {}", e);
                StoreState::Failed(e.to_string())
            }
        };
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(_) => error!("catalog lock poisoned, connection result dropped"),
        }
    }
}
