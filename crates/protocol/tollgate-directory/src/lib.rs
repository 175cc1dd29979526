//! Service directory client for Tollgate.
//!
//! Resolves a [`ServiceId`](tollgate_types::ServiceId) into a
//! [`ServiceDescriptor`](tollgate_types::ServiceDescriptor): the endpoint to
//! call, its price and currency, and the account to pay.
//!
//! Two implementations of [`ServiceDirectory`] are provided:
//!
//! - [`HttpDirectory`]: queries a remote directory over HTTP
//! - [`StaticDirectory`]: serves a fixed, epoch-stamped table from memory

mod config;
mod error;
mod http;
mod static_dir;
mod traits;

pub use config::{DirectoryConfig, DEFAULT_DIRECTORY_URL};
pub use error::{DirectoryError, DirectoryResult};
pub use http::HttpDirectory;
pub use static_dir::StaticDirectory;
pub use traits::ServiceDirectory;

use std::sync::Arc;

/// Build the directory described by `config`.
pub fn from_config(config: &DirectoryConfig) -> DirectoryResult<Arc<dyn ServiceDirectory>> {
    if config.is_static() {
        Ok(Arc::new(StaticDirectory::new(config.services.clone())))
    } else {
        Ok(Arc::new(HttpDirectory::from_config(config)?))
    }
}
