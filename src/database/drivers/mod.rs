use std::sync::Arc;

use log::debug;
use url::Url;

use super::{AlbumStore, StoreError};

pub mod mock;
pub mod mongo;

pub async fn get_driver(url_raw: &str, db_name: &str) -> Result<Arc<dyn AlbumStore>, StoreError> {
    let url = Url::parse(url_raw)?;

    debug!("getting driver {}", url.scheme());
    match url.scheme() {
        mongo::DRIVER_NAME | mongo::DRIVER_NAME_SRV => {
            Ok(Arc::new(mongo::MongoConnector::connect(url_raw, db_name).await?))
        }
        mock::DRIVER_NAME => Ok(Arc::new(mock::get_conn(&url)?)),
        scheme => Err(StoreError::UnknownScheme(scheme.to_owned())),
    }
}
