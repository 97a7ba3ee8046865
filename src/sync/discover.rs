// discover-and-track: find registry wells at the scope's locations, enroll, link
/*
Two calls, no server-side session:

preview  -> queries the registry, returns candidates + counts, writes nothing

commit   -> caller sends back the previewed candidates and the ids it picked;
            enroll up to the remaining well quota, then link only those wells

*/
use std::collections::{BTreeSet, HashSet};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info, info_span};

use crate::core::links::LinkedPairs;
use crate::core::location::LocationKey;
use crate::core::records::WellRecord;
use crate::core::types::{OwnerScope, WellId};
use crate::error::{StoreKind, SyncError};
use crate::store::RegistryFilter;
use crate::sync::{LinkSynchronizer, SyncSummary, batch, plan_links};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverRequest {
    pub scope: OwnerScope,
    /// Plan quota on tracked wells for the scope. `None` is unlimited.
    pub well_limit: Option<usize>,
}

impl DiscoverRequest {
    pub fn new(scope: OwnerScope) -> Self {
        Self { scope, well_limit: None }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.well_limit = Some(limit);
        self
    }
}

/// Returned to the caller as-is; `candidates` come back on commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryPreview {
    /// Registry wells not yet tracked by the scope, sorted by id.
    pub candidates: Vec<WellRecord>,
    pub locations_queried: usize,
    pub already_tracked: usize,
    pub remaining_capacity: Option<usize>,
    pub wells_over_limit: usize,
    /// Links the candidates would produce if all of them were enrolled.
    pub projected_links: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    pub wells_enrolled: usize,
    pub wells_over_limit: usize,
    pub summary: SyncSummary,
}

fn over_limit(count: usize, capacity: Option<usize>) -> usize {
    capacity.map_or(0, |cap| count.saturating_sub(cap))
}

impl LinkSynchronizer {
    fn registry_filter(&self, as_of: NaiveDate) -> RegistryFilter {
        RegistryFilter {
            exclusions: self.config.exclusions.clone(),
            active_since: self.config.activity_cutoff(as_of),
        }
    }

    async fn tracked_ids(&self, scope: &OwnerScope) -> Result<HashSet<WellId>, SyncError> {
        let wells = self.wells.list_by_owner(scope).await.map_err(|source| SyncError::StoreRead {
            store: StoreKind::Wells,
            scope: scope.clone(),
            source,
        })?;
        Ok(wells.into_iter().map(|w| w.id).collect())
    }

    pub async fn preview_discovery(&self, request: &DiscoverRequest) -> Result<DiscoveryPreview, SyncError> {
        self.preview_discovery_as_of(request, Utc::now().date_naive()).await
    }

    pub async fn preview_discovery_as_of(
        &self,
        request: &DiscoverRequest,
        as_of: NaiveDate,
    ) -> Result<DiscoveryPreview, SyncError> {
        let scope = &request.scope;
        let span = info_span!("discover_preview", scope = %scope, backend = self.registry.backend_tag());
        async move {
            let properties = self.load_properties(scope).await?;

            //one registry lookup per distinct STR-meridian, however many properties share it
            let locations: Vec<LocationKey> = properties
                .iter()
                .filter_map(|p| p.location.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if locations.is_empty() {
                info!("no property locations to search");
                return Ok(DiscoveryPreview::default());
            }

            let found = batch::query_registry(
                self.registry.as_ref(),
                &locations,
                &self.registry_filter(as_of),
                self.config.registry_batch_size,
                self.config.max_concurrent_batches,
            )
            .await
            .map_err(|source| SyncError::StoreRead {
                store: StoreKind::Registry,
                scope: scope.clone(),
                source,
            })?;

            let tracked = self.tracked_ids(scope).await?;
            let found_count = found.len();
            let mut candidates: Vec<WellRecord> = found.into_iter().filter(|w| !tracked.contains(&w.id)).collect();
            for well in &mut candidates {
                well.refresh_lateral();
            }

            let remaining_capacity = request.well_limit.map(|limit| limit.saturating_sub(tracked.len()));
            let projected_links = plan_links(&properties, &candidates, &LinkedPairs::new()).staged.len();
            let preview = DiscoveryPreview {
                locations_queried: locations.len(),
                already_tracked: found_count - candidates.len(),
                remaining_capacity,
                wells_over_limit: over_limit(candidates.len(), remaining_capacity),
                projected_links,
                candidates,
            };
            info!(
                locations = preview.locations_queried,
                candidates = preview.candidates.len(),
                already_tracked = preview.already_tracked,
                over_limit = preview.wells_over_limit,
                "discovery preview"
            );
            Ok(preview)
        }
        .instrument(span)
        .await
    }

    pub async fn commit_discovery(
        &self,
        request: &DiscoverRequest,
        candidates: &[WellRecord],
        selected: &[WellId],
    ) -> Result<DiscoveryOutcome, SyncError> {
        self.commit_discovery_as_of(request, candidates, selected, Utc::now().date_naive()).await
    }

    /// Enroll the `selected` subset of previewed `candidates` and link them.
    ///
    /// Candidates are caller-supplied, so derived fields are recomputed and excluded wells
    /// are dropped again. Selections beyond the remaining quota are reported, not enrolled.
    pub async fn commit_discovery_as_of(
        &self,
        request: &DiscoverRequest,
        candidates: &[WellRecord],
        selected: &[WellId],
        as_of: NaiveDate,
    ) -> Result<DiscoveryOutcome, SyncError> {
        let scope = &request.scope;
        let span = info_span!("discover_commit", scope = %scope, selected = selected.len());
        async move {
            let wanted: HashSet<&WellId> = selected.iter().collect();
            let tracked = self.tracked_ids(scope).await?;
            let filter = self.registry_filter(as_of);

            let mut seen: HashSet<&WellId> = HashSet::new();
            let mut chosen: Vec<WellRecord> = Vec::new();
            for well in candidates {
                if !wanted.contains(&well.id) || tracked.contains(&well.id) || !seen.insert(&well.id) {
                    continue;
                }
                let mut well = well.clone();
                well.refresh_lateral();
                if filter.allows(&well) {
                    chosen.push(well);
                }
            }

            let capacity = request.well_limit.map(|limit| limit.saturating_sub(tracked.len()));
            let wells_over_limit = over_limit(chosen.len(), capacity);
            if let Some(cap) = capacity {
                chosen.truncate(cap);
            }

            let wells_enrolled = if chosen.is_empty() {
                0
            } else {
                self.wells.enroll(scope, &chosen).await.map_err(|source| SyncError::StoreWrite {
                    store: StoreKind::Wells,
                    scope: scope.clone(),
                    source,
                })?
            };

            let properties = self.load_properties(scope).await?;
            let summary = self.link_against(scope, &properties, &chosen).await?;
            info!(
                enrolled = wells_enrolled,
                over_limit = wells_over_limit,
                created = summary.links_created,
                failed = summary.failed,
                "discovery commit finished"
            );
            Ok(DiscoveryOutcome { wells_enrolled, wells_over_limit, summary })
        }
        .instrument(span)
        .await
    }
}
