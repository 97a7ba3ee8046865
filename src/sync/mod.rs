//! Link synchronizer: properties x wells -> new links.
//!
//! The matching pass (`plan_links`) is a pure function of properties, wells and the pairs
//! already linked. Everything async in here is about loading those three inputs and
//! writing the result back in batches.

pub mod batch;
pub mod discover;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span};

use crate::config::SyncConfig;
use crate::core::links::{Link, LinkedPairs};
use crate::core::matcher::find_best_match;
use crate::core::records::{PropertyRecord, WellRecord};
use crate::core::types::{MatchReason, OwnerScope, PropertyId, WellId};
use crate::error::{ConfigError, StoreKind, SyncError};
use crate::store::{LinkStore, PropertyStore, WellRegistry, WellStore};

pub use discover::{DiscoverRequest, DiscoveryOutcome, DiscoveryPreview};

/// Links staged by one matching pass, before anything is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    pub staged: Vec<Link>,
    pub matches_by_reason: BTreeMap<MatchReason, usize>,
    //pairs that already had a link
    pub skipped: usize,
}

/// Stage a link for every unlinked pair the matcher accepts.
///
/// Already-linked pairs are skipped without being re-evaluated, so an existing link's
/// reason is never upgraded or demoted. Duplicate ids in the inputs stage at most one link.
pub fn plan_links(properties: &[PropertyRecord], wells: &[WellRecord], linked: &LinkedPairs) -> LinkPlan {
    let mut plan = LinkPlan::default();
    let mut staged_pairs: HashSet<(&PropertyId, &WellId)> = HashSet::new();

    for property in properties {
        for well in wells {
            if linked.contains(&property.id, &well.id) {
                plan.skipped += 1;
                continue;
            }
            if staged_pairs.contains(&(&property.id, &well.id)) {
                continue;
            }
            if let Some(reason) = find_best_match(property, well) {
                staged_pairs.insert((&property.id, &well.id));
                *plan.matches_by_reason.entry(reason).or_default() += 1;
                plan.staged.push(Link::auto(property.id.clone(), well.id.clone(), reason));
            }
        }
    }
    plan
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub properties_scanned: usize,
    pub wells_scanned: usize,
    pub wells_excluded: usize,
    pub matches_found: usize,
    pub matches_by_reason: BTreeMap<MatchReason, usize>,
    pub links_created: usize,
    pub links_skipped: usize,
    pub failed: usize,
    pub batches: usize,
}

pub struct LinkSynchronizer {
    properties: Arc<dyn PropertyStore>,
    wells: Arc<dyn WellStore>,
    registry: Arc<dyn WellRegistry>,
    links: Arc<dyn LinkStore>,
    config: SyncConfig,
}

impl LinkSynchronizer {
    pub fn new(
        properties: Arc<dyn PropertyStore>,
        wells: Arc<dyn WellStore>,
        registry: Arc<dyn WellRegistry>,
        links: Arc<dyn LinkStore>,
        config: SyncConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { properties, wells, registry, links, config })
    }

    /// One backend serving every port.
    pub fn with_backend<S>(store: Arc<S>, config: SyncConfig) -> Result<Self, ConfigError>
    where
        S: PropertyStore + WellStore + WellRegistry + LinkStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store.clone(), store, config)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub async fn sync(&self, scope: &OwnerScope) -> Result<SyncSummary, SyncError> {
        self.sync_as_of(scope, Utc::now().date_naive()).await
    }

    /// Full run for a scope; `as_of` anchors the activity window.
    pub async fn sync_as_of(&self, scope: &OwnerScope, as_of: NaiveDate) -> Result<SyncSummary, SyncError> {
        let span = info_span!("link_sync", scope = %scope, backend = self.links.backend_tag());
        async move {
            let properties = self.load_properties(scope).await?;
            let wells = self.load_tracked_wells(scope).await?;
            let tracked = wells.len();
            let (eligible, excluded) = self.eligible_wells(wells, as_of);
            info!(properties = properties.len(), wells = tracked, excluded, "link sync start");

            //wells_scanned counts eligible wells only
            let mut summary = self.link_against(scope, &properties, &eligible).await?;
            summary.wells_excluded = excluded;

            info!(
                created = summary.links_created,
                skipped = summary.links_skipped,
                failed = summary.failed,
                "link sync finished"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Drop excluded types/statuses and, if configured, wells idle past the activity window.
    pub fn eligible_wells(&self, wells: Vec<WellRecord>, as_of: NaiveDate) -> (Vec<WellRecord>, usize) {
        let cutoff = self.config.activity_cutoff(as_of);
        let total = wells.len();
        let eligible: Vec<WellRecord> = wells
            .into_iter()
            .filter(|well| !self.config.exclusions.excludes(well))
            .filter(|well| cutoff.is_none_or(|c| well.is_active_since(c)))
            .collect();
        let excluded = total - eligible.len();
        (eligible, excluded)
    }

    async fn load_properties(&self, scope: &OwnerScope) -> Result<Vec<PropertyRecord>, SyncError> {
        self.properties.list_by_owner(scope).await.map_err(|source| SyncError::StoreRead {
            store: StoreKind::Properties,
            scope: scope.clone(),
            source,
        })
    }

    async fn load_tracked_wells(&self, scope: &OwnerScope) -> Result<Vec<WellRecord>, SyncError> {
        let mut wells = self.wells.list_by_owner(scope).await.map_err(|source| SyncError::StoreRead {
            store: StoreKind::Wells,
            scope: scope.clone(),
            source,
        })?;
        //lateral sections are never trusted from the store
        for well in &mut wells {
            well.refresh_lateral();
        }
        Ok(wells)
    }

    /// Load existing links, match, persist. `wells` must already be filtered.
    async fn link_against(
        &self,
        scope: &OwnerScope,
        properties: &[PropertyRecord],
        wells: &[WellRecord],
    ) -> Result<SyncSummary, SyncError> {
        let property_ids: Vec<PropertyId> = properties.iter().map(|p| p.id.clone()).collect();
        let linked = batch::load_linked_pairs(
            self.links.as_ref(),
            &property_ids,
            self.config.batch_size,
            self.config.max_concurrent_batches,
        )
        .await
        .map_err(|source| SyncError::StoreRead {
            store: StoreKind::Links,
            scope: scope.clone(),
            source,
        })?;
        debug!(existing = linked.len(), "existing links loaded");

        let plan = plan_links(properties, wells, &linked);
        let totals = batch::persist_links(
            self.links.as_ref(),
            &plan.staged,
            self.config.batch_size,
            self.config.max_concurrent_batches,
        )
        .await;

        Ok(SyncSummary {
            properties_scanned: properties.len(),
            wells_scanned: wells.len(),
            wells_excluded: 0,
            matches_found: plan.staged.len(),
            matches_by_reason: plan.matches_by_reason,
            links_created: totals.created,
            links_skipped: plan.skipped,
            failed: totals.failed,
            batches: totals.batches,
        })
    }
}
