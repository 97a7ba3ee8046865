// matcher: does this well belong to this property, and why?
/*

SurfaceLocation: property section == well surface section (all four fields)

LateralPath: property section is on the traced lateral, same township/range/meridian

BottomHole: property section == well bottom-hole section

AdjacentSection: property section touches the bottom hole, else touches the surface

First rule that fires wins. Nothing accumulates.

*/
use crate::core::adjacency::is_adjacent;
use crate::core::location::LocationKey;
use crate::core::records::{PropertyRecord, WellRecord};
use crate::core::types::MatchReason;

/// Rules in the order they are tried.
pub const MATCH_RULES: [MatchReason; 4] = [
    MatchReason::SurfaceLocation,
    MatchReason::LateralPath,
    MatchReason::BottomHole,
    MatchReason::AdjacentSection,
];

/// Whether a single rule holds for a property location, ignoring the others.
pub fn rule_fires(rule: MatchReason, location: &LocationKey, well: &WellRecord) -> bool {
    match rule {
        MatchReason::SurfaceLocation => well.surface_location.as_ref() == Some(location),
        MatchReason::LateralPath => {
            well.meridian == Some(location.meridian())
                && well
                    .lateral_sections
                    .iter()
                    .any(|s| s.same_township_range(location) && s.section() == location.section())
        }
        MatchReason::BottomHole => well.bottom_hole_location.as_ref() == Some(location),
        MatchReason::AdjacentSection => {
            let touches = |anchor: &Option<LocationKey>| anchor.as_ref().is_some_and(|a| is_adjacent(location, a));
            touches(&well.bottom_hole_location) || touches(&well.surface_location)
        }
    }
}

/// Strongest reason linking `property` to `well`, or `None`.
///
/// A property without a location never matches.
pub fn find_best_match(property: &PropertyRecord, well: &WellRecord) -> Option<MatchReason> {
    let location = property.location.as_ref()?;
    MATCH_RULES.into_iter().find(|&rule| rule_fires(rule, location, well))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::make_location_key;
    use crate::core::types::Meridian;

    fn key(section: u8) -> LocationKey {
        make_location_key(Some(section), Some("12N"), Some("5W"), Meridian::IM).unwrap()
    }

    fn mk_property(id: &str, section: Option<u8>) -> PropertyRecord {
        PropertyRecord::new(id, section.map(key))
    }

    fn mk_well(surface: Option<u8>, bottom: Option<u8>) -> WellRecord {
        WellRecord::new("well", surface.map(key), bottom.map(key))
    }

    //end-to-end scenario: 16 / 12N / 5W
    #[test]
    fn surface_match_wins() {
        let property = mk_property("p", Some(16));
        let well = mk_well(Some(16), Some(9));
        assert_eq!(find_best_match(&property, &well), Some(MatchReason::SurfaceLocation));
    }

    #[test]
    fn lateral_match_when_path_crosses_property() {
        let property = mk_property("p", Some(16));
        let well = mk_well(Some(21), Some(9));
        assert_eq!(find_best_match(&property, &well), Some(MatchReason::LateralPath));
    }

    #[test]
    fn adjacent_when_off_path_but_touching_bottom_hole() {
        //path 27 -> 10 runs up column 3 through 22 and 15; 16 is beside it and touches 10
        let property = mk_property("p", Some(16));
        let well = mk_well(Some(27), Some(10));
        assert!(!well.lateral_sections.contains(&key(16)));
        assert_eq!(find_best_match(&property, &well), Some(MatchReason::AdjacentSection));
    }

    #[test]
    fn no_match_when_far_away() {
        let property = mk_property("p", Some(16));
        let well = mk_well(Some(36), Some(31));
        assert_eq!(find_best_match(&property, &well), None);
    }

    #[test]
    fn surface_beats_bottom_hole_of_another_property() {
        let first = mk_property("first", Some(16));
        let second = mk_property("second", Some(9));
        let well = mk_well(Some(16), Some(9));

        assert_eq!(find_best_match(&first, &well), Some(MatchReason::SurfaceLocation));
        //the bottom-hole section also lies on the lateral, which outranks BottomHole
        assert_eq!(find_best_match(&second, &well), Some(MatchReason::LateralPath));
    }

    #[test]
    fn bottom_hole_rule_fires_when_lateral_is_other_meridian() {
        //surface on a different meridian keeps the lateral anchored there
        let surface = make_location_key(Some(16), Some("12N"), Some("5W"), Meridian::CM).unwrap();
        let well = WellRecord::new("well", Some(surface), Some(key(9)));
        let property = mk_property("p", Some(9));
        assert_eq!(find_best_match(&property, &well), Some(MatchReason::BottomHole));
    }

    #[test]
    fn bottom_hole_only_well_matches_bottom_hole() {
        let well = mk_well(None, Some(9));
        assert_eq!(find_best_match(&mk_property("p", Some(9)), &well), Some(MatchReason::BottomHole));
        assert_eq!(find_best_match(&mk_property("p", Some(16)), &well), Some(MatchReason::AdjacentSection));
    }

    #[test]
    fn property_without_location_never_matches() {
        let property = mk_property("p", None);
        for well in [mk_well(Some(16), Some(9)), mk_well(None, None), mk_well(None, Some(16))] {
            assert_eq!(find_best_match(&property, &well), None);
        }
    }

    #[test]
    fn well_without_locations_never_matches() {
        let property = mk_property("p", Some(16));
        assert_eq!(find_best_match(&property, &mk_well(None, None)), None);
    }

    #[test]
    fn adjacency_falls_back_to_surface() {
        let property = mk_property("p", Some(16));
        //surface 15 touches 16, bottom hole 13 does not, and the path 15 -> 13 stays in row 2 eastward
        let well = mk_well(Some(15), Some(13));
        assert_eq!(find_best_match(&property, &well), Some(MatchReason::AdjacentSection));
    }

    #[test]
    fn rule_fires_reports_each_rule_independently() {
        let location = key(16);
        let well = mk_well(Some(16), Some(16));
        assert!(rule_fires(MatchReason::SurfaceLocation, &location, &well));
        assert!(rule_fires(MatchReason::LateralPath, &location, &well));
        assert!(rule_fires(MatchReason::BottomHole, &location, &well));
        assert!(!rule_fires(MatchReason::AdjacentSection, &location, &well));
    }
}
