mod album;
pub use self::album::{
    AlbumCreateRequest,
    AlbumCreateResponse,
    AlbumDeleteResponse,
    AlbumUpdateRequest,
    AlbumUpdateResponse,
    YearInput,
};

mod error;
pub use self::error::{ApiError, ErrorBody};
