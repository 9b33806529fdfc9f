use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson};
use futures::TryStreamExt;
use log::{debug, info};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Deserializer, Serialize};

use super::super::{AlbumStore, StoreError, UpdateOutcome};
use crate::model::{Album, AlbumId, AlbumPatch, NewAlbum};

pub const DRIVER_NAME: &str = "mongodb";
pub const DRIVER_NAME_SRV: &str = "mongodb+srv";
pub const COLLECTION_NAME: &str = "albums";

pub struct MongoConnector {
    albums: Collection<RawAlbum>,
}

impl MongoConnector {
    /// The database named in the connection string wins over `db_name`.
    pub async fn connect(dburl: &str, db_name: &str) -> Result<MongoConnector, StoreError> {
        let options = ClientOptions::parse(dburl).await?;
        let client = Client::with_options(options)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(db_name));

        // the driver connects lazily; ping so a bad uri surfaces now
        database.run_command(doc! { "ping": 1 }, None).await?;
        info!("using database {:?}, collection {:?}", database.name(), COLLECTION_NAME);

        Ok(MongoConnector {
            albums: database.collection(COLLECTION_NAME),
        })
    }
}

#[async_trait]
impl AlbumStore for MongoConnector {
    async fn list_albums(&self) -> Result<Vec<Album>, StoreError> {
        let raw: Vec<RawAlbum> = self.albums.find(None, None).await?.try_collect().await?;
        Ok(raw.into_iter().map(RawAlbum::cook).collect())
    }

    async fn insert_album(&self, album: &NewAlbum) -> Result<AlbumId, StoreError> {
        let raw = RawAlbum {
            id: ObjectId::new(),
            band: album.band.clone(),
            title: album.title.clone(),
            year: album.year,
        };
        let result = self.albums.insert_one(&raw, None).await?;
        debug!("inserted album {}", result.inserted_id);
        Ok(AlbumId::from(raw.id))
    }

    async fn update_album(&self, id: &AlbumId, patch: &AlbumPatch) -> Result<UpdateOutcome, StoreError> {
        let fields = bson::to_document(patch)?;
        let result = self
            .albums
            .update_one(doc! { "_id": id.to_object_id() }, doc! { "$set": fields }, None)
            .await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_album(&self, id: &AlbumId) -> Result<u64, StoreError> {
        let result = self
            .albums
            .delete_one(doc! { "_id": id.to_object_id() }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = self.albums.delete_many(doc! {}, None).await?;
        Ok(result.deleted_count)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct RawAlbum {
    #[serde(rename = "_id")]
    id: ObjectId,
    band: String,
    title: String,
    #[serde(deserialize_with = "lenient_year")]
    year: i32,
}

impl RawAlbum {
    fn cook(self) -> Album {
        Album {
            id: AlbumId::from(self.id),
            band: self.band,
            title: self.title,
            year: self.year,
        }
    }
}

/// Documents written by other clients may carry the year as a double,
/// a 64-bit integer or text.
fn lenient_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Bson::deserialize(deserializer)? {
        Bson::Int32(v) => Ok(v),
        Bson::Int64(v) => i32::try_from(v).map_err(D::Error::custom),
        Bson::Double(v) if v.is_finite() => Ok(v.trunc() as i32),
        Bson::String(s) => s.trim().parse().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("unexpected year value {}", other))),
    }
}
