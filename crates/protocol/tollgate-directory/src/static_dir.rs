//! In-memory directory pinned to an epoch.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;
use tollgate_types::{ServiceDescriptor, ServiceId};

use crate::error::{DirectoryError, DirectoryResult};
use crate::traits::ServiceDirectory;

struct Table {
    epoch: u64,
    entries: HashMap<ServiceId, ServiceDescriptor>,
}

/// Directory backed by a fixed table.
///
/// Every call to [`replace`](Self::replace) starts a new epoch. Within one
/// epoch, resolving the same id always yields the same descriptor.
pub struct StaticDirectory {
    table: RwLock<Table>,
}

impl StaticDirectory {
    /// Create a directory at epoch 0.
    pub fn new(listings: impl IntoIterator<Item = ServiceDescriptor>) -> Self {
        Self {
            table: RwLock::new(Table {
                epoch: 0,
                entries: index(listings),
            }),
        }
    }

    /// Current epoch.
    pub fn epoch(&self) -> u64 {
        self.table.read().map(|t| t.epoch).unwrap_or_default()
    }

    /// Number of listed services.
    pub fn len(&self) -> usize {
        self.table.read().map(|t| t.entries.len()).unwrap_or_default()
    }

    /// Check if no services are listed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Swap in a new table and return the new epoch.
    pub fn replace(
        &self,
        listings: impl IntoIterator<Item = ServiceDescriptor>,
    ) -> DirectoryResult<u64> {
        let entries = index(listings);
        let mut table = self
            .table
            .write()
            .map_err(|_| DirectoryError::unavailable("directory table lock poisoned"))?;
        table.epoch += 1;
        table.entries = entries;
        info!(epoch = table.epoch, services = table.entries.len(), "Directory table replaced");
        Ok(table.epoch)
    }
}

fn index(listings: impl IntoIterator<Item = ServiceDescriptor>) -> HashMap<ServiceId, ServiceDescriptor> {
    listings
        .into_iter()
        .map(|d| (d.service_id.clone(), d))
        .collect()
}

#[async_trait]
impl ServiceDirectory for StaticDirectory {
    async fn resolve(&self, service_id: &ServiceId) -> DirectoryResult<ServiceDescriptor> {
        let table = self
            .table
            .read()
            .map_err(|_| DirectoryError::unavailable("directory table lock poisoned"))?;
        table
            .entries
            .get(service_id)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownService(service_id.clone()))
    }
}
