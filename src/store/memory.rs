// in-memory backend for every port; also what a loaded snapshot serves from
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::links::{ExistingLink, Link};
use crate::core::location::LocationKey;
use crate::core::records::{PropertyRecord, WellRecord};
use crate::core::types::{OwnerScope, PropertyId, WellId};
use crate::error::StoreError;
use crate::store::{BatchOutcome, LinkStore, PropertyStore, RegistryFilter, WellRegistry, WellStore};

#[derive(Default)]
pub struct MemoryStore {
    pub properties: Mutex<HashMap<OwnerScope, Vec<PropertyRecord>>>,
    pub tracked_wells: Mutex<HashMap<OwnerScope, Vec<WellRecord>>>,
    pub registry: Mutex<Vec<WellRecord>>,
    //BTreeMap keeps snapshot output stable
    pub links: Mutex<BTreeMap<(PropertyId, WellId), Link>>,
    pub create_calls: AtomicUsize,
    pub registry_calls: AtomicUsize,
    fail_next_writes: AtomicUsize,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_properties(&self, scope: &OwnerScope, records: impl IntoIterator<Item = PropertyRecord>) {
        self.properties.lock().await.entry(scope.clone()).or_default().extend(records);
    }

    pub async fn add_tracked_wells(&self, scope: &OwnerScope, wells: impl IntoIterator<Item = WellRecord>) {
        self.tracked_wells.lock().await.entry(scope.clone()).or_default().extend(wells);
    }

    pub async fn add_registry_wells(&self, wells: impl IntoIterator<Item = WellRecord>) {
        self.registry.lock().await.extend(wells);
    }

    pub async fn insert_link(&self, link: Link) {
        self.links.lock().await.insert(link.pair(), link);
    }

    pub async fn link_count(&self) -> usize {
        self.links.lock().await.len()
    }

    pub async fn link(&self, property_id: &PropertyId, well_id: &WellId) -> Option<Link> {
        self.links.lock().await.get(&(property_id.clone(), well_id.clone())).cloned()
    }

    /// Make the next `n` `create_batch` calls fail outright.
    pub fn fail_next_writes(&self, n: usize) {
        self.fail_next_writes.store(n, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store reads disabled".to_string()));
        }
        Ok(())
    }

    fn take_write_failure(&self) -> bool {
        self.fail_next_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_by_owner(&self, scope: &OwnerScope) -> Result<Vec<PropertyRecord>, StoreError> {
        self.check_read()?;
        Ok(self.properties.lock().await.get(scope).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl WellStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_by_owner(&self, scope: &OwnerScope) -> Result<Vec<WellRecord>, StoreError> {
        self.check_read()?;
        Ok(self.tracked_wells.lock().await.get(scope).cloned().unwrap_or_default())
    }

    async fn enroll(&self, scope: &OwnerScope, wells: &[WellRecord]) -> Result<usize, StoreError> {
        let mut tracked = self.tracked_wells.lock().await;
        let entry = tracked.entry(scope.clone()).or_default();
        let mut known: HashSet<WellId> = entry.iter().map(|w| w.id.clone()).collect();
        let mut enrolled = 0;
        for well in wells {
            if known.insert(well.id.clone()) {
                entry.push(well.clone());
                enrolled += 1;
            }
        }
        Ok(enrolled)
    }
}

#[async_trait]
impl WellRegistry for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn find_by_locations(
        &self,
        locations: &[LocationKey],
        filter: &RegistryFilter,
    ) -> Result<Vec<WellRecord>, StoreError> {
        self.check_read()?;
        self.registry_calls.fetch_add(1, Ordering::Relaxed);
        let wanted: HashSet<&LocationKey> = locations.iter().collect();
        Ok(self
            .registry
            .lock()
            .await
            .iter()
            .filter(|well| filter.allows(well))
            .filter(|well| well.footprint().any(|loc| wanted.contains(loc)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_existing(&self, property_ids: &[PropertyId]) -> Result<Vec<ExistingLink>, StoreError> {
        self.check_read()?;
        let wanted: HashSet<&PropertyId> = property_ids.iter().collect();
        Ok(self
            .links
            .lock()
            .await
            .values()
            .filter(|link| wanted.contains(&link.property_id))
            .map(ExistingLink::from)
            .collect())
    }

    async fn create_batch(&self, links: &[Link]) -> Result<BatchOutcome, StoreError> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);
        if self.take_write_failure() {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }

        let mut stored = self.links.lock().await;
        let mut outcome = BatchOutcome::default();
        for link in links {
            //upsert: a conflicting pair is left untouched
            if let std::collections::btree_map::Entry::Vacant(slot) = stored.entry(link.pair()) {
                slot.insert(link.clone());
                outcome.created += 1;
            }
        }
        Ok(outcome)
    }
}
