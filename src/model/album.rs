use std::fmt;
use std::str::FromStr;

use bson::oid::{self, ObjectId};
use rocket::request::FromParam;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// ObjectId, 12 bytes, rendered as 24 hex digits
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct AlbumId(ObjectId);

impl AlbumId {
    pub fn generate() -> AlbumId {
        AlbumId(ObjectId::new())
    }

    pub fn to_object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for AlbumId {
    fn from(oid: ObjectId) -> AlbumId {
        AlbumId(oid)
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl fmt::Debug for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AlbumId({})", self)
    }
}

impl FromStr for AlbumId {
    type Err = oid::Error;

    fn from_str(val: &str) -> Result<AlbumId, oid::Error> {
        ObjectId::parse_str(val).map(AlbumId)
    }
}

impl<'a> FromParam<'a> for AlbumId {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<AlbumId, &'a str> {
        param.parse().map_err(|_| param)
    }
}

impl Serialize for AlbumId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AlbumId {
    fn deserialize<D>(deserializer: D) -> Result<AlbumId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid album id {:?}: {}", raw, e)))
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Album {
    #[serde(rename = "_id")]
    pub id: AlbumId,
    pub band: String,
    pub title: String,
    pub year: i32,
}

/// Fields of an album that does not have an id yet.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct NewAlbum {
    pub band: String,
    pub title: String,
    pub year: i32,
}

impl NewAlbum {
    pub fn with_id(self, id: AlbumId) -> Album {
        Album {
            id,
            band: self.band,
            title: self.title,
            year: self.year,
        }
    }
}

/// A sparse update. `None` leaves the stored field untouched.
#[derive(Serialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct AlbumPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl AlbumPatch {
    pub fn is_empty(&self) -> bool {
        self.band.is_none() && self.title.is_none() && self.year.is_none()
    }

    /// Applies the patch, returning whether any stored value changed.
    pub fn apply(&self, album: &mut Album) -> bool {
        let mut changed = false;
        if let Some(ref band) = self.band {
            changed |= album.band != *band;
            album.band = band.clone();
        }
        if let Some(ref title) = self.title {
            changed |= album.title != *title;
            album.title = title.clone();
        }
        if let Some(year) = self.year {
            changed |= album.year != year;
            album.year = year;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_id_parses_24_hex_digits() {
        let id: AlbumId = "65a1f0c2b3d4e5f601234567".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2b3d4e5f601234567");
        assert_eq!(AlbumId::from(id.to_object_id()), id);
    }

    #[test]
    fn album_id_accepts_uppercase_and_prints_lowercase() {
        let id: AlbumId = "65A1F0C2B3D4E5F601234567".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2b3d4e5f601234567");
    }

    #[test]
    fn album_id_rejects_wrong_shapes() {
        assert!("65a1f0c2b3d4e5f6012345".parse::<AlbumId>().is_err());
        assert!("65a1f0c2b3d4e5f60123456789".parse::<AlbumId>().is_err());
        assert!("65a1f0c2b3d4e5f60123456g".parse::<AlbumId>().is_err());
        assert!("not-an-id".parse::<AlbumId>().is_err());
        assert!("".parse::<AlbumId>().is_err());
    }

    #[test]
    fn album_serializes_id_as_underscore_hex() {
        let id: AlbumId = "000000000000000000000001".parse().unwrap();
        let album = NewAlbum {
            band: "Radiohead".into(),
            title: "OK Computer".into(),
            year: 1997,
        }
        .with_id(id);
        let value = serde_json::to_value(&album).unwrap();
        assert_eq!(value["_id"], "000000000000000000000001");
        assert_eq!(value["year"], 1997);
    }

    #[test]
    fn patch_touches_only_named_fields() {
        let mut album = NewAlbum {
            band: "Radiohead".into(),
            title: "OK Computer".into(),
            year: 1997,
        }
        .with_id(AlbumId::generate());
        let patch = AlbumPatch {
            year: Some(2001),
            ..AlbumPatch::default()
        };
        assert!(patch.apply(&mut album));
        assert_eq!(album.band, "Radiohead");
        assert_eq!(album.title, "OK Computer");
        assert_eq!(album.year, 2001);
        assert!(!patch.apply(&mut album));
    }
}
