// chunked store calls with bounded fan-out
use std::collections::BTreeMap;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, warn};

use crate::core::links::{Link, LinkedPairs};
use crate::core::location::LocationKey;
use crate::core::records::WellRecord;
use crate::core::types::{PropertyId, WellId};
use crate::error::StoreError;
use crate::store::{LinkStore, RegistryFilter, WellRegistry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistTotals {
    pub created: usize,
    pub failed: usize,
    pub batches: usize,
}

/// Existing links for `property_ids`, read `batch_size` ids at a time.
///
/// The first failed read aborts the whole load.
pub async fn load_linked_pairs(
    store: &dyn LinkStore,
    property_ids: &[PropertyId],
    batch_size: usize,
    concurrency: usize,
) -> Result<LinkedPairs, StoreError> {
    stream::iter(property_ids.chunks(batch_size.max(1)))
        .map(|chunk| store.list_existing(chunk))
        .buffer_unordered(concurrency.max(1))
        .try_fold(LinkedPairs::new(), |mut pairs, rows| async move {
            pairs.extend(rows);
            Ok::<_, StoreError>(pairs)
        })
        .await
}

/// Write `links` in batches. A failed batch counts all its links as failed and the
/// remaining batches still run; committed batches stay committed.
pub async fn persist_links(
    store: &dyn LinkStore,
    links: &[Link],
    batch_size: usize,
    concurrency: usize,
) -> PersistTotals {
    stream::iter(links.chunks(batch_size.max(1)).enumerate())
        .map(|(index, chunk)| async move { (index, chunk.len(), store.create_batch(chunk).await) })
        .buffer_unordered(concurrency.max(1))
        .fold(PersistTotals::default(), |mut totals, (index, size, result)| async move {
            totals.batches += 1;
            match result {
                Ok(outcome) => {
                    debug!(batch = index, size, created = outcome.created, failed = outcome.failed, "link batch written");
                    totals.created += outcome.created;
                    totals.failed += outcome.failed;
                }
                Err(err) => {
                    warn!(batch = index, size, error = %err, "link batch failed");
                    totals.failed += size;
                }
            }
            totals
        })
        .await
}

/// Registry wells touching any of `locations`, deduplicated by well id (sorted by id).
pub async fn query_registry(
    registry: &dyn WellRegistry,
    locations: &[LocationKey],
    filter: &RegistryFilter,
    batch_size: usize,
    concurrency: usize,
) -> Result<Vec<WellRecord>, StoreError> {
    let found = stream::iter(locations.chunks(batch_size.max(1)))
        .map(|chunk| registry.find_by_locations(chunk, filter))
        .buffer_unordered(concurrency.max(1))
        .try_fold(BTreeMap::<WellId, WellRecord>::new(), |mut wells, batch| async move {
            for well in batch {
                wells.entry(well.id.clone()).or_insert(well);
            }
            Ok::<_, StoreError>(wells)
        })
        .await?;
    Ok(found.into_values().collect())
}
