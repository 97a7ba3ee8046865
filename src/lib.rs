//! Spatial matching of oil-and-gas wells to mineral owners' land parcels.
//!
//! Properties and wells are located on the Public Land Survey grid (section / township /
//! range / meridian). The [`core`] modules normalize those locations, trace horizontal
//! laterals across sections and decide whether a property and a well are related;
//! [`sync`] runs that decision over whole owner scopes and keeps the persisted link set
//! in step.

pub mod config;
pub mod core;
pub mod error;
pub mod store;
pub mod sync;

pub use crate::config::{StoreBackend, SyncConfig};
pub use crate::core::adjacency::{adjacent_locations, is_adjacent};
pub use crate::core::lateral::{compute_lateral_sections, trace_lateral_path};
pub use crate::core::links::{ExistingLink, Link, LinkedPairs};
pub use crate::core::location::{LocationKey, make_location_key, normalize_section, resolve_meridian};
pub use crate::core::matcher::find_best_match;
pub use crate::core::records::{PropertyRecord, WellExclusions, WellRecord};
pub use crate::core::types::{LinkStatus, LinkType, MatchReason, Meridian, OwnerScope, PropertyId, WellId};
pub use crate::error::{ConfigError, SnapshotError, StoreError, SyncError};
pub use crate::sync::{DiscoverRequest, DiscoveryOutcome, DiscoveryPreview, LinkSynchronizer, SyncSummary, plan_links};
