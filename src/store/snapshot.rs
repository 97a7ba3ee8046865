// TOON snapshot backend: raw string rows on disk, typed records in memory
/*
A snapshot is the flat export the older record store produced: every field is a string
(or missing), exactly as keyed in upstream. Rows are parsed into typed records once,
when the snapshot is loaded, and served from a MemoryStore afterwards.
*/
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::links::Link;
use crate::core::location::{LocationKey, location_from_raw};
use crate::core::records::{PropertyRecord, WellRecord};
use crate::core::types::{LinkStatus, LinkType, MatchReason, OwnerScope};
use crate::error::SnapshotError;
use crate::store::MemoryStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRow {
    pub id: String,
    pub owner: String,
    pub section: Option<String>,
    pub township: Option<String>,
    pub range: Option<String>,
    pub meridian: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellRow {
    pub id: String,
    //empty for registry rows
    pub owner: Option<String>,
    pub well_type: Option<String>,
    pub status: Option<String>,
    pub section: Option<String>,
    pub township: Option<String>,
    pub range: Option<String>,
    pub bh_section: Option<String>,
    pub bh_township: Option<String>,
    pub bh_range: Option<String>,
    pub meridian: Option<String>,
    //blank means the bottom hole shares `meridian`
    pub bh_meridian: Option<String>,
    pub county: Option<String>,
    pub last_activity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkRow {
    pub property_id: String,
    pub well_id: String,
    pub match_reason: Option<MatchReason>,
    pub status: Option<LinkStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub properties: Vec<PropertyRow>,
    pub wells: Vec<WellRow>,
    pub registry: Vec<WellRow>,
    pub links: Vec<LinkRow>,
}

//"user:abc" / "org:xyz"; a bare id is a user
fn parse_owner(raw: &str) -> OwnerScope {
    match raw.split_once(':') {
        Some(("org", id)) => OwnerScope::Organization(id.to_string()),
        Some(("user", id)) => OwnerScope::User(id.to_string()),
        _ => OwnerScope::User(raw.to_string()),
    }
}

impl PropertyRow {
    pub fn to_record(&self) -> PropertyRecord {
        let location = location_from_raw(
            self.section.as_deref(),
            self.township.as_deref(),
            self.range.as_deref(),
            self.meridian.as_deref(),
            self.county.as_deref(),
        );
        PropertyRecord::new(self.id.as_str(), location)
    }
}

impl WellRow {
    fn surface(&self) -> Option<LocationKey> {
        location_from_raw(
            self.section.as_deref(),
            self.township.as_deref(),
            self.range.as_deref(),
            self.meridian.as_deref(),
            self.county.as_deref(),
        )
    }

    //bottom hole defaults to the surface township/range when only the section was recorded
    fn bottom_hole(&self) -> Option<LocationKey> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        let township = if blank(&self.bh_township) { &self.township } else { &self.bh_township };
        let range = if blank(&self.bh_range) { &self.range } else { &self.bh_range };
        let meridian = if blank(&self.bh_meridian) { &self.meridian } else { &self.bh_meridian };
        location_from_raw(
            self.bh_section.as_deref(),
            township.as_deref(),
            range.as_deref(),
            meridian.as_deref(),
            self.county.as_deref(),
        )
    }

    pub fn to_record(&self) -> WellRecord {
        let mut well = WellRecord::new(self.id.as_str(), self.surface(), self.bottom_hole());
        well.well_type = self.well_type.clone().filter(|s| !s.trim().is_empty());
        well.status = self.status.clone().filter(|s| !s.trim().is_empty());
        well.last_activity = self
            .last_activity
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok());
        well
    }

    pub fn from_record(well: &WellRecord, owner: Option<&OwnerScope>) -> Self {
        let surface = well.surface_location.as_ref();
        let bottom = well.bottom_hole_location.as_ref();
        Self {
            id: well.id.to_string(),
            owner: owner.map(ToString::to_string),
            well_type: well.well_type.clone(),
            status: well.status.clone(),
            section: surface.map(|k| k.section().to_string()),
            township: surface.map(|k| k.township().to_string()),
            range: surface.map(|k| k.range().to_string()),
            bh_section: bottom.map(|k| k.section().to_string()),
            bh_township: bottom.map(|k| k.township().to_string()),
            bh_range: bottom.map(|k| k.range().to_string()),
            meridian: well.meridian.map(|m| m.to_string()),
            bh_meridian: bottom.map(|k| k.meridian().to_string()),
            county: None,
            last_activity: well.last_activity.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl Snapshot {
    pub fn decode(text: &str) -> Result<Self, SnapshotError> {
        toon_format::decode_default(text).map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    pub fn encode(&self) -> Result<String, SnapshotError> {
        toon_format::encode_default(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&text)
    }

    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let text = self.encode()?;
        std::fs::write(path, text).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse every row into typed records and serve them from memory.
    pub async fn into_store(self) -> MemoryStore {
        let store = MemoryStore::new();
        for row in &self.properties {
            store.add_properties(&parse_owner(&row.owner), [row.to_record()]).await;
        }
        for row in &self.wells {
            let owner = row.owner.as_deref().map(parse_owner).unwrap_or(OwnerScope::User(String::new()));
            store.add_tracked_wells(&owner, [row.to_record()]).await;
        }
        store.add_registry_wells(self.registry.iter().map(WellRow::to_record)).await;
        for row in &self.links {
            store
                .insert_link(Link {
                    property_id: row.property_id.as_str().into(),
                    well_id: row.well_id.as_str().into(),
                    //pre-reason links are treated as the weakest reason
                    match_reason: row.match_reason.unwrap_or(MatchReason::AdjacentSection),
                    status: row.status.unwrap_or_default(),
                    link_type: LinkType::Auto,
                })
                .await;
        }
        store
    }

    pub async fn load(path: &Path) -> Result<MemoryStore, SnapshotError> {
        Ok(Self::read(path)?.into_store().await)
    }

    /// Export the current contents of a store (links and tracked wells included).
    pub async fn capture(store: &MemoryStore) -> Self {
        let mut snapshot = Snapshot::default();

        for (scope, records) in store.properties.lock().await.iter() {
            for record in records {
                let location = record.location.as_ref();
                snapshot.properties.push(PropertyRow {
                    id: record.id.to_string(),
                    owner: scope.to_string(),
                    section: location.map(|k| k.section().to_string()),
                    township: location.map(|k| k.township().to_string()),
                    range: location.map(|k| k.range().to_string()),
                    meridian: location.map(|k| k.meridian().to_string()),
                    county: None,
                });
            }
        }
        for (scope, wells) in store.tracked_wells.lock().await.iter() {
            snapshot.wells.extend(wells.iter().map(|w| WellRow::from_record(w, Some(scope))));
        }
        snapshot.registry = store.registry.lock().await.iter().map(|w| WellRow::from_record(w, None)).collect();
        snapshot.links = store
            .links
            .lock()
            .await
            .values()
            .map(|link| LinkRow {
                property_id: link.property_id.to_string(),
                well_id: link.well_id.to_string(),
                match_reason: Some(link.match_reason),
                status: Some(link.status),
            })
            .collect();

        //HashMap iteration order is arbitrary
        snapshot.properties.sort_by(|a, b| (&a.owner, &a.id).cmp(&(&b.owner, &b.id)));
        snapshot.wells.sort_by(|a, b| (&a.owner, &a.id).cmp(&(&b.owner, &b.id)));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Meridian;
    use crate::store::{LinkStore, PropertyStore, WellStore};

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn mk_property_row(id: &str, section: &str) -> PropertyRow {
        PropertyRow {
            id: id.to_string(),
            owner: "org:acme".to_string(),
            section: s(section),
            township: s("012N"),
            range: s("05W"),
            meridian: None,
            county: s("017-CANADIAN"),
        }
    }

    #[test]
    fn property_row_parses_location() {
        let record = mk_property_row("p1", "16").to_record();
        let location = record.location.unwrap();
        assert_eq!(location.to_string(), "16-12N-5W-IM");

        let bad = PropertyRow { section: s("99"), ..mk_property_row("p2", "16") }.to_record();
        assert!(bad.location.is_none());
    }

    #[test]
    fn well_row_bottom_hole_inherits_township() {
        let row = WellRow {
            id: "w1".to_string(),
            section: s("21"),
            township: s("12N"),
            range: s("5W"),
            bh_section: s("9"),
            county: s("CANADIAN"),
            last_activity: s("2024-05-01"),
            ..WellRow::default()
        };
        let well = row.to_record();
        assert_eq!(well.bottom_hole_location.as_ref().unwrap().to_string(), "9-12N-5W-IM");
        assert_eq!(well.lateral_sections.len(), 3);
        assert_eq!(well.last_activity, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(well.meridian, Some(Meridian::IM));
    }

    #[test]
    fn owner_prefixes() {
        assert_eq!(parse_owner("org:acme"), OwnerScope::Organization("acme".into()));
        assert_eq!(parse_owner("user:u1"), OwnerScope::User("u1".into()));
        assert_eq!(parse_owner("u2"), OwnerScope::User("u2".into()));
    }

    #[tokio::test]
    async fn snapshot_file_loads_into_store() {
        let snapshot = Snapshot {
            properties: vec![mk_property_row("p1", "16"), mk_property_row("p2", "9")],
            wells: vec![WellRow {
                id: "w1".to_string(),
                owner: s("org:acme"),
                section: s("16"),
                township: s("12N"),
                range: s("5W"),
                ..WellRow::default()
            }],
            registry: Vec::new(),
            links: vec![LinkRow {
                property_id: "p1".to_string(),
                well_id: "w1".to_string(),
                match_reason: Some(MatchReason::SurfaceLocation),
                status: None,
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.toon");
        snapshot.write(&path).unwrap();

        let store = Snapshot::load(&path).await.unwrap();
        let scope = OwnerScope::Organization("acme".into());
        assert_eq!(PropertyStore::list_by_owner(&store, &scope).await.unwrap().len(), 2);
        assert_eq!(WellStore::list_by_owner(&store, &scope).await.unwrap().len(), 1);
        let existing = store.list_existing(&["p1".into()]).await.unwrap();
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].status, LinkStatus::Active);
    }

    #[tokio::test]
    async fn capture_keeps_bottom_hole_meridian() {
        let surface = location_from_raw(Some("36"), Some("1N"), Some("1E"), Some("IM"), None);
        let bottom = location_from_raw(Some("31"), Some("1N"), Some("1E"), Some("CM"), None);
        let well = WellRecord::new("w1", surface.clone(), bottom.clone());
        let store = MemoryStore::new();
        let scope = OwnerScope::User("u1".into());
        store.add_tracked_wells(&scope, [well]).await;

        let snapshot = Snapshot::capture(&store).await;
        assert_eq!(snapshot.wells[0].bh_meridian.as_deref(), Some("CM"));

        let reloaded = Snapshot::decode(&snapshot.encode().unwrap()).unwrap().into_store().await;
        let wells = WellStore::list_by_owner(&reloaded, &scope).await.unwrap();
        assert_eq!(wells[0].surface_location, surface);
        assert_eq!(wells[0].bottom_hole_location, bottom);
        assert_eq!(wells[0].bottom_hole_location.as_ref().map(|k| k.meridian()), Some(Meridian::CM));
    }

    #[tokio::test]
    async fn capture_exports_links_and_wells() {
        let store = MemoryStore::new();
        let scope = OwnerScope::User("u1".into());
        store
            .add_tracked_wells(&scope, [WellRecord::new("w1", mk_property_row("x", "16").to_record().location, None)])
            .await;
        store.insert_link(Link::auto("p1".into(), "w1".into(), MatchReason::SurfaceLocation)).await;

        let snapshot = Snapshot::capture(&store).await;
        assert_eq!(snapshot.wells.len(), 1);
        assert_eq!(snapshot.wells[0].owner.as_deref(), Some("user:u1"));
        assert_eq!(snapshot.wells[0].section.as_deref(), Some("16"));
        assert_eq!(snapshot.links.len(), 1);
    }
}
