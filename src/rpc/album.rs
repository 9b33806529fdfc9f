use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::model::{Album, AlbumId, AlbumPatch, NewAlbum};

/// A year as sent by clients: `1997`, `1997.0` or `"1997"`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum YearInput {
    Number(serde_json::Number),
    Text(String),
}

impl YearInput {
    fn is_falsy(&self) -> bool {
        match *self {
            YearInput::Number(ref n) => n.as_f64() == Some(0.0),
            YearInput::Text(ref s) => s.is_empty(),
        }
    }

    pub fn coerce(&self) -> Result<i32, ApiError> {
        let year = match *self {
            YearInput::Number(ref n) => match n.as_i64() {
                Some(v) => i32::try_from(v).ok(),
                None => n.as_f64().and_then(truncate),
            },
            YearInput::Text(ref s) => {
                let s = s.trim();
                s.parse::<i32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(truncate))
            }
        };
        year.ok_or_else(|| ApiError::BadRequest(format!("year must be an integer, got {}", self)))
    }
}

impl std::fmt::Display for YearInput {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            YearInput::Number(ref n) => write!(f, "{}", n),
            YearInput::Text(ref s) => write!(f, "{:?}", s),
        }
    }
}

fn truncate(v: f64) -> Option<i32> {
    if v.is_finite() && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v.trunc() as i32)
    } else {
        None
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct AlbumCreateRequest {
    pub band: Option<String>,
    pub title: Option<String>,
    pub year: Option<YearInput>,
}

impl AlbumCreateRequest {
    /// Empty text and a zero year count as missing.
    pub fn validate(self) -> Result<NewAlbum, ApiError> {
        let band = self.band.filter(|s| !s.is_empty());
        let title = self.title.filter(|s| !s.is_empty());
        let year = self.year.filter(|y| !y.is_falsy());

        match (band, title, year) {
            (Some(band), Some(title), Some(year)) => Ok(NewAlbum {
                band,
                title,
                year: year.coerce()?,
            }),
            _ => Err(ApiError::BadRequest("band, title and year are required".into())),
        }
    }
}

/// Absent and `null` fields are left alone; everything present is applied.
#[derive(Deserialize, Debug, Default)]
pub struct AlbumUpdateRequest {
    pub band: Option<String>,
    pub title: Option<String>,
    pub year: Option<YearInput>,
}

impl AlbumUpdateRequest {
    pub fn into_patch(self) -> Result<AlbumPatch, ApiError> {
        for (name, value) in [("band", &self.band), ("title", &self.title)] {
            if value.as_deref() == Some("") {
                return Err(ApiError::BadRequest(format!("{} cannot be empty", name)));
            }
        }
        let patch = AlbumPatch {
            band: self.band,
            title: self.title,
            year: self.year.as_ref().map(YearInput::coerce).transpose()?,
        };
        if patch.is_empty() {
            return Err(ApiError::BadRequest("no fields to update; expected band, title or year".into()));
        }
        Ok(patch)
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AlbumCreateResponse {
    pub message: String,
    pub album_id: AlbumId,
    pub album: Album,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AlbumUpdateResponse {
    pub message: String,
    pub modified_count: u64,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDeleteResponse {
    pub message: String,
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(body: &str) -> Result<NewAlbum, ApiError> {
        serde_json::from_str::<AlbumCreateRequest>(body).unwrap().validate()
    }

    fn update(body: &str) -> Result<AlbumPatch, ApiError> {
        serde_json::from_str::<AlbumUpdateRequest>(body).unwrap().into_patch()
    }

    #[test]
    fn create_coerces_text_year() {
        let album = create(r#"{"band": "Radiohead", "title": "OK Computer", "year": "1997"}"#).unwrap();
        assert_eq!(album.year, 1997);
    }

    #[test]
    fn create_treats_falsy_as_missing() {
        assert!(create(r#"{"band": "", "title": "OK Computer", "year": 1997}"#).is_err());
        assert!(create(r#"{"band": "Radiohead", "year": 1997}"#).is_err());
        assert!(create(r#"{"band": "Radiohead", "title": "OK Computer", "year": 0}"#).is_err());
        assert!(create(r#"{"band": "Radiohead", "title": "OK Computer", "year": ""}"#).is_err());
        assert!(create(r#"{"band": "Radiohead", "title": "OK Computer", "year": null}"#).is_err());
    }

    #[test]
    fn create_rejects_uncoercible_year() {
        match create(r#"{"band": "Radiohead", "title": "OK Computer", "year": "nineteen"}"#) {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("year")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn year_coercion_shapes() {
        let y = |s: &str| serde_json::from_str::<YearInput>(s).unwrap().coerce().ok();
        assert_eq!(y("2001"), Some(2001));
        assert_eq!(y("2001.7"), Some(2001));
        assert_eq!(y(r#"" 2001 ""#), Some(2001));
        assert_eq!(y(r#""2001.0""#), Some(2001));
        assert_eq!(y("1e20"), None);
        assert_eq!(y(r#""MMI""#), None);
    }

    #[test]
    fn update_skips_only_absent_fields() {
        let patch = update(r#"{"year": "2001"}"#).unwrap();
        assert_eq!(
            patch,
            AlbumPatch {
                year: Some(2001),
                ..AlbumPatch::default()
            }
        );

        let patch = update(r#"{"year": 0, "band": null}"#).unwrap();
        assert_eq!(patch.year, Some(0));
        assert_eq!(patch.band, None);
    }

    #[test]
    fn update_rejects_empty_text_and_empty_patch() {
        assert!(update(r#"{"title": ""}"#).is_err());
        assert!(update(r#"{}"#).is_err());
        assert!(update(r#"{"_id": "65a1f0c2b3d4e5f601234567"}"#).is_err());
    }

    #[test]
    fn responses_use_camel_case() {
        let body = serde_json::to_value(AlbumUpdateResponse {
            message: "ok".into(),
            modified_count: 1,
        })
        .unwrap();
        assert_eq!(body["modifiedCount"], 1);
    }
}
