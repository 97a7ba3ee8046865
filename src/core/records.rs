// property + well records, populated once at the store boundary
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::lateral::trace_lateral_path;
use crate::core::location::LocationKey;
use crate::core::types::{Meridian, PropertyId, WellId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecord {
    pub id: PropertyId,
    pub location: Option<LocationKey>,
}

impl PropertyRecord {
    pub fn new(id: impl Into<PropertyId>, location: Option<LocationKey>) -> Self {
        Self { id: id.into(), location }
    }
}

/// Keyword lists for wells that never produce links.
///
/// Matched case-insensitively as substrings of the well's type/status text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WellExclusions {
    pub excluded_types: Vec<String>,
    pub excluded_statuses: Vec<String>,
}

impl Default for WellExclusions {
    fn default() -> Self {
        Self {
            excluded_types: ["DISPOSAL", "INJECTION", "DRY HOLE", "SWD"].map(String::from).to_vec(),
            excluded_statuses: ["PLUGGED", "RETIRED", "ABANDONED"].map(String::from).to_vec(),
        }
    }
}

fn contains_keyword(value: Option<&str>, keywords: &[String]) -> bool {
    let Some(value) = value else {
        return false;
    };
    let upper = value.to_ascii_uppercase();
    keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .any(|k| upper.contains(&k.trim().to_ascii_uppercase()))
}

impl WellExclusions {
    pub fn excludes(&self, well: &WellRecord) -> bool {
        contains_keyword(well.well_type.as_deref(), &self.excluded_types)
            || contains_keyword(well.status.as_deref(), &self.excluded_statuses)
    }
}

/// A well with its surface/bottom-hole footprint.
///
/// `lateral_sections`, `township`, `range` and `meridian` are derived from the two locations
/// and never read from an external store. They still serialize, so a previewed candidate can
/// go out to a caller and come back; `refresh_lateral` re-derives them on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellRecord {
    pub id: WellId,
    pub surface_location: Option<LocationKey>,
    pub bottom_hole_location: Option<LocationKey>,
    #[serde(default)]
    pub lateral_sections: Vec<LocationKey>,
    #[serde(default)]
    pub township: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub meridian: Option<Meridian>,
    pub well_type: Option<String>,
    pub status: Option<String>,
    pub last_activity: Option<NaiveDate>,
}

impl WellRecord {
    pub fn new(
        id: impl Into<WellId>,
        surface_location: Option<LocationKey>,
        bottom_hole_location: Option<LocationKey>,
    ) -> Self {
        let mut well = Self {
            id: id.into(),
            surface_location,
            bottom_hole_location,
            lateral_sections: Vec::new(),
            township: None,
            range: None,
            meridian: None,
            well_type: None,
            status: None,
            last_activity: None,
        };
        well.refresh_lateral();
        well
    }

    pub fn with_type(mut self, well_type: impl Into<String>) -> Self {
        self.well_type = Some(well_type.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_last_activity(mut self, date: NaiveDate) -> Self {
        self.last_activity = Some(date);
        self
    }

    /// Recompute every derived field from the surface and bottom-hole locations.
    pub fn refresh_lateral(&mut self) {
        self.lateral_sections = match (&self.surface_location, &self.bottom_hole_location) {
            (Some(surface), Some(bottom)) => trace_lateral_path(surface, bottom),
            (Some(surface), None) => vec![surface.clone()],
            //a bottom hole alone is not a path; BottomHole covers it
            (None, _) => Vec::new(),
        };

        let anchor = self.surface_location.as_ref().or(self.bottom_hole_location.as_ref());
        self.township = anchor.map(|k| k.township().to_string());
        self.range = anchor.map(|k| k.range().to_string());
        self.meridian = anchor.map(LocationKey::meridian);
    }

    //no recorded activity never passes a window
    pub fn is_active_since(&self, cutoff: NaiveDate) -> bool {
        self.last_activity.is_some_and(|d| d >= cutoff)
    }

    /// Every distinct location this well touches (surface, lateral, bottom hole).
    pub fn footprint(&self) -> impl Iterator<Item = &LocationKey> {
        self.surface_location
            .iter()
            .chain(self.lateral_sections.iter())
            .chain(self.bottom_hole_location.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::make_location_key;

    fn key(section: u8) -> LocationKey {
        make_location_key(Some(section), Some("12N"), Some("5W"), Meridian::IM).unwrap()
    }

    #[test]
    fn new_well_derives_lateral_and_anchor() {
        let well = WellRecord::new("w1", Some(key(21)), Some(key(9)));
        assert_eq!(well.lateral_sections, vec![key(21), key(16), key(9)]);
        assert_eq!(well.township.as_deref(), Some("12N"));
        assert_eq!(well.range.as_deref(), Some("5W"));
        assert_eq!(well.meridian, Some(Meridian::IM));
    }

    #[test]
    fn vertical_well_lateral_is_its_own_section() {
        let well = WellRecord::new("w2", Some(key(4)), None);
        assert_eq!(well.lateral_sections, vec![key(4)]);

        let bottom_only = WellRecord::new("w3", None, Some(key(9)));
        assert!(bottom_only.lateral_sections.is_empty());
        assert_eq!(bottom_only.footprint().collect::<Vec<_>>(), vec![&key(9)]);
        assert_eq!(bottom_only.meridian, Some(Meridian::IM));

        let no_location = WellRecord::new("w3b", None, None);
        assert!(no_location.lateral_sections.is_empty());
        assert!(no_location.meridian.is_none());
    }

    #[test]
    fn refresh_lateral_overwrites_stale_sections() {
        let mut well = WellRecord::new("w4", Some(key(21)), Some(key(9)));
        well.lateral_sections = vec![key(36)];
        well.refresh_lateral();
        assert_eq!(well.lateral_sections, vec![key(21), key(16), key(9)]);
    }

    #[test]
    fn exclusions_match_type_and_status_keywords() {
        let rules = WellExclusions::default();
        let base = WellRecord::new("w5", Some(key(1)), None);

        assert!(!rules.excludes(&base.clone().with_type("OIL").with_status("ACTIVE")));
        assert!(rules.excludes(&base.clone().with_type("Salt Water Disposal")));
        assert!(rules.excludes(&base.clone().with_type("2R - injection")));
        assert!(rules.excludes(&base.clone().with_type("Dry Hole")));
        assert!(rules.excludes(&base.clone().with_status("Plugged and Abandoned")));
        assert!(rules.excludes(&base.clone().with_status("retired")));
    }

    #[test]
    fn activity_window() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let well = WellRecord::new("w6", Some(key(1)), None);
        assert!(!well.is_active_since(cutoff));

        let recent = well.clone().with_last_activity(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(recent.is_active_since(cutoff));
        let stale = well.with_last_activity(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert!(!stale.is_active_since(cutoff));
    }
}
