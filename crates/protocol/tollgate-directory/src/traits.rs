//! Directory trait definition.

use async_trait::async_trait;
use tollgate_types::{ServiceDescriptor, ServiceId};

use crate::error::DirectoryResult;

/// Resolves service identifiers to endpoints and prices.
///
/// Implementations must allow concurrent lookups.
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// Look up `service_id`.
    ///
    /// Fails with [`DirectoryError::UnknownService`](crate::DirectoryError::UnknownService)
    /// if the service is not listed.
    async fn resolve(&self, service_id: &ServiceId) -> DirectoryResult<ServiceDescriptor>;
}
