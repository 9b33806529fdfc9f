mod album;

pub use self::album::{
    Album,
    AlbumId,
    AlbumPatch,
    NewAlbum,
};
