// lateral path computer
//which sections does a horizontal wellbore pass through between surface and bottom hole?
use std::collections::HashSet;

use tracing::debug;

use crate::core::grid::{GridCell, SurveyPoint, cell_to_section, location_at, section_to_cell};
use crate::core::location::LocationKey;

/// Laterals longer than this many sections (on either axis) are treated as bad data and
/// not traced cell by cell.
pub const MAX_TRACE_SPAN: i64 = 12;

/// Integer line between two cells, all octants, both endpoints included.
///
/// Always walks from the smaller endpoint so the visited set does not depend on direction,
/// then flips the result back so it starts at `start`.
fn trace_line(start: (i64, i64), end: (i64, i64)) -> Vec<(i64, i64)> {
    let reversed = end < start;
    let (from, to) = if reversed { (end, start) } else { (start, end) };

    let dx = (to.0 - from.0).abs();
    let dy = -(to.1 - from.1).abs();
    let sx = if from.0 < to.0 { 1 } else { -1 };
    let sy = if from.1 < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = from;

    let mut cells = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        cells.push((x, y));
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    if reversed {
        cells.reverse();
    }
    cells
}

fn dedup_in_order<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

/// Sections visited going from surface section `surface` to bottom-hole section `bottom`
/// inside one township. Ordered from surface to bottom hole, both included.
///
/// Returns an empty list when either section is outside 1..=36.
pub fn compute_lateral_sections(surface: u8, bottom: u8) -> Vec<u8> {
    let (Some(from), Some(to)) = (section_to_cell(surface), section_to_cell(bottom)) else {
        return Vec::new();
    };
    if surface == bottom {
        return vec![surface];
    }

    let sections = trace_line(
        (i64::from(from.row), i64::from(from.col)),
        (i64::from(to.row), i64::from(to.col)),
    )
    .into_iter()
    .filter_map(|(row, col)| {
        let cell = GridCell { row: u8::try_from(row).ok()?, col: u8::try_from(col).ok()? };
        cell_to_section(cell)
    })
    .collect();

    dedup_in_order(sections)
}

fn endpoints_only(surface: &LocationKey, bottom: &LocationKey) -> Vec<LocationKey> {
    dedup_in_order(vec![surface.clone(), bottom.clone()])
}

/// Full lateral trace between two keys.
///
/// Same township/range uses `compute_lateral_sections` directly. Different townships or
/// ranges on the same meridian are traced on the meridian-wide grid. Different meridians,
/// or spans beyond `MAX_TRACE_SPAN`, fall back to just the two endpoints.
pub fn trace_lateral_path(surface: &LocationKey, bottom: &LocationKey) -> Vec<LocationKey> {
    if surface.same_township_range(bottom) {
        return compute_lateral_sections(surface.section(), bottom.section())
            .into_iter()
            .filter_map(|section| surface.with_section(section))
            .collect();
    }

    if surface.meridian() != bottom.meridian() {
        debug!(%surface, %bottom, "lateral crosses meridians, keeping endpoints only");
        return endpoints_only(surface, bottom);
    }

    let (Some(from), Some(to)) = (surface.survey_point(), bottom.survey_point()) else {
        return endpoints_only(surface, bottom);
    };
    if from.span_to(to) > MAX_TRACE_SPAN {
        debug!(%surface, %bottom, span = from.span_to(to), "lateral span too long to trace");
        return endpoints_only(surface, bottom);
    }

    let keys = trace_line((from.north, from.east), (to.north, to.east))
        .into_iter()
        .filter_map(|(north, east)| location_at(SurveyPoint { north, east }, surface.meridian()))
        .collect();
    dedup_in_order(keys)
}
