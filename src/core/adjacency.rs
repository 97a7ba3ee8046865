// adjacency calculator
use crate::core::grid::location_at;
use crate::core::location::LocationKey;

/// (north, east) steps in the order neighbors are reported: N, NE, E, SE, S, SW, W, NW.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// The 8 sections touching `location`, crossing into neighbouring townships/ranges at the
/// grid edge (leaving section 1 northward lands in section 36 of the next township north).
pub fn adjacent_locations(location: &LocationKey) -> Vec<LocationKey> {
    let Some(origin) = location.survey_point() else {
        return Vec::new();
    };
    NEIGHBOR_OFFSETS
        .iter()
        .filter_map(|&(d_north, d_east)| location_at(origin.offset(d_north, d_east), location.meridian()))
        .collect()
}

/// True when `a` and `b` share an edge or corner. A location is not adjacent to itself.
pub fn is_adjacent(a: &LocationKey, b: &LocationKey) -> bool {
    if a.meridian() != b.meridian() {
        return false;
    }
    match (a.survey_point(), b.survey_point()) {
        (Some(pa), Some(pb)) => pa.span_to(pb) == 1,
        _ => false,
    }
}
