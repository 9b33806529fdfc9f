use std::fs::File;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use url::Url;

use super::super::{AlbumStore, StoreError, UpdateOutcome};
use crate::model::{Album, AlbumId, AlbumPatch, NewAlbum};

pub const DRIVER_NAME: &str = "mock";

/// `mock://memory` starts empty; `mock:///some/dir` seeds from `/some/dir/database.json`.
pub fn get_conn(url: &Url) -> Result<MockConnector, StoreError> {
    let path = url.path();
    if path.is_empty() || path == "/" {
        return Ok(MockConnector::new());
    }

    let database_path = PathBuf::from(path).join("database.json");
    let db_json = File::open(&database_path).map_err(|source| StoreError::FixtureIo {
        path: database_path.clone(),
        source,
    })?;
    let fixtures: Fixtures = serde_json::from_reader(db_json)?;

    info!("loaded {} albums from {}", fixtures.albums.len(), database_path.display());
    Ok(MockConnector::with_albums(fixtures.albums))
}

#[derive(Debug, Deserialize)]
struct Fixtures {
    albums: Vec<Album>,
}

/// In-memory store keeping albums in insertion order.
#[derive(Default)]
pub struct MockConnector {
    albums: Mutex<Vec<Album>>,
}

impl MockConnector {
    pub fn new() -> MockConnector {
        MockConnector::default()
    }

    pub fn with_albums(albums: Vec<Album>) -> MockConnector {
        MockConnector {
            albums: Mutex::new(albums),
        }
    }

    fn albums(&self) -> Result<MutexGuard<'_, Vec<Album>>, StoreError> {
        self.albums.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl AlbumStore for MockConnector {
    async fn list_albums(&self) -> Result<Vec<Album>, StoreError> {
        Ok(self.albums()?.clone())
    }

    async fn insert_album(&self, album: &NewAlbum) -> Result<AlbumId, StoreError> {
        let id = AlbumId::generate();
        self.albums()?.push(album.clone().with_id(id));
        Ok(id)
    }

    async fn update_album(&self, id: &AlbumId, patch: &AlbumPatch) -> Result<UpdateOutcome, StoreError> {
        let mut albums = self.albums()?;
        let outcome = match albums.iter_mut().find(|a| a.id == *id) {
            Some(album) => UpdateOutcome {
                matched: 1,
                modified: if patch.apply(album) { 1 } else { 0 },
            },
            None => UpdateOutcome {
                matched: 0,
                modified: 0,
            },
        };
        Ok(outcome)
    }

    async fn delete_album(&self, id: &AlbumId) -> Result<u64, StoreError> {
        let mut albums = self.albums()?;
        let before = albums.len();
        albums.retain(|a| a.id != *id);
        Ok((before - albums.len()) as u64)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut albums = self.albums()?;
        let count = albums.len() as u64;
        albums.clear();
        Ok(count)
    }
}
