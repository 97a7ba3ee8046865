//! Ports to the external record stores.
//!
//! The core never talks to a database or HTTP API directly. Each backend implements these
//! traits and hands back fully-typed records; string fields are parsed once, here.

pub mod memory;
pub mod snapshot;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::links::{ExistingLink, Link};
use crate::core::location::LocationKey;
use crate::core::records::{PropertyRecord, WellExclusions, WellRecord};
use crate::core::types::{OwnerScope, PropertyId};
use crate::config::StoreBackend;
use crate::error::{SnapshotError, StoreError};

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

/// Result of one `create_batch` call. Conflicting inserts are counted in neither field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub created: usize,
    pub failed: usize,
}

/// Which registry wells Discover-and-Track may consider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryFilter {
    pub exclusions: WellExclusions,
    pub active_since: Option<NaiveDate>,
}

impl RegistryFilter {
    pub fn allows(&self, well: &WellRecord) -> bool {
        !self.exclusions.excludes(well) && self.active_since.is_none_or(|cutoff| well.is_active_since(cutoff))
    }
}

#[async_trait]
pub trait PropertyStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn list_by_owner(&self, scope: &OwnerScope) -> Result<Vec<PropertyRecord>, StoreError>;
}

#[async_trait]
pub trait WellStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Wells tracked by the scope, already enriched with registry data.
    async fn list_by_owner(&self, scope: &OwnerScope) -> Result<Vec<WellRecord>, StoreError>;

    /// Start tracking wells for a scope. Returns how many were newly tracked.
    async fn enroll(&self, scope: &OwnerScope, wells: &[WellRecord]) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait WellRegistry: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Wells whose surface, bottom-hole or lateral sections hit any of `locations`.
    async fn find_by_locations(
        &self,
        locations: &[LocationKey],
        filter: &RegistryFilter,
    ) -> Result<Vec<WellRecord>, StoreError>;
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn list_existing(&self, property_ids: &[PropertyId]) -> Result<Vec<ExistingLink>, StoreError>;

    /// Insert links, ignoring any whose `(property_id, well_id)` already exists.
    async fn create_batch(&self, links: &[Link]) -> Result<BatchOutcome, StoreError>;
}

/// Build the configured backend. Both variants serve every port.
pub async fn open_backend(backend: &StoreBackend) -> Result<Arc<MemoryStore>, SnapshotError> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Snapshot(path) => Ok(Arc::new(Snapshot::load(path).await?)),
    }
}
