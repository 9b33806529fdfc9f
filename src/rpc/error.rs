use log::{debug, error};
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;
use thiserror::Error;

use crate::database::{NotReady, StoreError};
use crate::model::AlbumId;

/// `{"error": "..."}`
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> ErrorBody {
        ErrorBody { error: error.into() }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid album id: {0:?}")]
    InvalidId(String),
    #[error("album {0} not found")]
    NotFound(AlbumId),
    #[error("service unavailable: {0}")]
    NotReady(#[from] NotReady),
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Store { context, source }
    }

    pub fn status(&self) -> Status {
        match *self {
            ApiError::BadRequest(_) | ApiError::InvalidId(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::NotReady(_) => Status::ServiceUnavailable,
            ApiError::Store { .. } => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {}: {}", req.method(), req.uri(), self);
        } else {
            debug!("{} {}: {}", req.method(), req.uri(), self);
        }
        (status, Json(ErrorBody::new(self.to_string()))).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), Status::BadRequest);
        assert_eq!(ApiError::InvalidId("x".into()).status(), Status::BadRequest);
        assert_eq!(ApiError::NotFound(AlbumId::generate()).status(), Status::NotFound);
        assert_eq!(ApiError::from(NotReady::Connecting).status(), Status::ServiceUnavailable);
        assert_eq!(
            ApiError::store("Failed to fetch albums")(StoreError::Poisoned).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn store_errors_interpolate_the_cause() {
        let err = ApiError::store("Failed to fetch albums")(StoreError::Poisoned);
        assert_eq!(err.to_string(), "Failed to fetch albums: album store lock poisoned");
    }
}
