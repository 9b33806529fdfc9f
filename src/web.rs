//! JSON routes under `/api`.
//!
//! Every handler validates its input before asking the [`Catalog`] for a
//! store, so malformed ids and bodies never cost a database round-trip.

use log::info;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{Error as JsonError, Json};
use rocket::{Catcher, Request, Route, State};

use crate::database::Catalog;
use crate::model::{Album, AlbumId};
use crate::rpc::{
    AlbumCreateRequest,
    AlbumCreateResponse,
    AlbumDeleteResponse,
    AlbumUpdateRequest,
    AlbumUpdateResponse,
    ApiError,
    ErrorBody,
};

type ApiResult<T> = Result<T, ApiError>;

pub fn routes() -> Vec<Route> {
    routes![
        albums_get,
        albums_post,
        album_put,
        album_delete,
        cleanup_delete,
        api_options,
    ]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

fn json_body<T>(body: Result<Json<T>, JsonError<'_>>) -> ApiResult<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonError::Io(e)) => Err(ApiError::BadRequest(format!("error reading request body: {}", e))),
        Err(JsonError::Parse(_, e)) => Err(ApiError::BadRequest(format!("invalid JSON body: {}", e))),
    }
}

fn parse_id(id: Result<AlbumId, &str>) -> ApiResult<AlbumId> {
    id.map_err(|raw| ApiError::InvalidId(raw.to_owned()))
}

#[get("/albums")]
async fn albums_get(catalog: &State<Catalog>) -> ApiResult<Json<Vec<Album>>> {
    let store = catalog.store()?;
    let albums = store
        .list_albums()
        .await
        .map_err(ApiError::store("Failed to fetch albums"))?;
    Ok(Json(albums))
}

#[post("/albums", data = "<body>")]
async fn albums_post(
    catalog: &State<Catalog>,
    body: Result<Json<AlbumCreateRequest>, JsonError<'_>>,
) -> ApiResult<status::Created<Json<AlbumCreateResponse>>> {
    let album = json_body(body)?.validate()?;
    let store = catalog.store()?;
    let id = store
        .insert_album(&album)
        .await
        .map_err(ApiError::store("Failed to create album"))?;
    info!("created album {} ({} - {})", id, album.band, album.title);

    Ok(status::Created::new(format!("/api/albums/{}", id)).body(Json(AlbumCreateResponse {
        message: "Album created successfully".into(),
        album_id: id,
        album: album.with_id(id),
    })))
}

#[put("/albums/<id>", data = "<body>")]
async fn album_put(
    catalog: &State<Catalog>,
    id: Result<AlbumId, &str>,
    body: Result<Json<AlbumUpdateRequest>, JsonError<'_>>,
) -> ApiResult<Json<AlbumUpdateResponse>> {
    let id = parse_id(id)?;
    let patch = json_body(body)?.into_patch()?;
    let store = catalog.store()?;
    let outcome = store
        .update_album(&id, &patch)
        .await
        .map_err(ApiError::store("Failed to update album"))?;
    if outcome.matched == 0 {
        return Err(ApiError::NotFound(id));
    }
    info!("updated album {} ({} modified)", id, outcome.modified);

    Ok(Json(AlbumUpdateResponse {
        message: "Album updated successfully".into(),
        modified_count: outcome.modified,
    }))
}

#[delete("/albums/<id>")]
async fn album_delete(catalog: &State<Catalog>, id: Result<AlbumId, &str>) -> ApiResult<Json<AlbumDeleteResponse>> {
    let id = parse_id(id)?;
    let store = catalog.store()?;
    let deleted = store
        .delete_album(&id)
        .await
        .map_err(ApiError::store("Failed to delete album"))?;
    if deleted == 0 {
        return Err(ApiError::NotFound(id));
    }
    info!("deleted album {}", id);

    Ok(Json(AlbumDeleteResponse {
        message: "Album deleted successfully".into(),
        deleted_count: deleted,
    }))
}

#[delete("/cleanup")]
async fn cleanup_delete(catalog: &State<Catalog>) -> ApiResult<Json<AlbumDeleteResponse>> {
    let store = catalog.store()?;
    let deleted = store
        .delete_all()
        .await
        .map_err(ApiError::store("Failed to clean up database"))?;
    info!("cleanup removed {} albums", deleted);

    Ok(Json(AlbumDeleteResponse {
        message: format!("Database cleaned up: deleted {} albums", deleted),
        deleted_count: deleted,
    }))
}

// preflight target; the CORS fairing decorates the response
#[options("/<_..>")]
fn api_options() -> Status {
    Status::NoContent
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let error = match status.code {
        404 => format!("no route for {} {}", req.method(), req.uri()),
        _ => status.reason().unwrap_or("unknown error").to_owned(),
    };
    (status, Json(ErrorBody::new(error)))
}
