// section grid geometry
/*
Sections inside a township are numbered boustrophedon style:

     6  5  4  3  2  1     row 0 (north)
     7  8  9 10 11 12     row 1
    18 17 16 15 14 13     row 2
    19 20 21 22 23 24     row 3
    30 29 28 27 26 25     row 4
    31 32 33 34 35 36     row 5 (south)

col 0 is the west column. Townships stack north/south of the baseline (1N is the first
tier north, 1S the first tier south) and ranges stack east/west of the meridian, which
gives every section one integer coordinate on a meridian-wide grid.
*/
use crate::core::location::{LocationKey, MAX_SECTION, MIN_SECTION};
use crate::core::types::Meridian;

pub const GRID_SIZE: u8 = 6;

/// Cell inside one township: row counted from the north edge, col from the west edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub row: u8,
    pub col: u8,
}

pub fn section_to_cell(section: u8) -> Option<GridCell> {
    if !(MIN_SECTION..=MAX_SECTION).contains(&section) {
        return None;
    }
    let idx = section - 1;
    let row = idx / GRID_SIZE;
    let offset = idx % GRID_SIZE;
    //even rows run east -> west
    let col = if row % 2 == 0 { GRID_SIZE - 1 - offset } else { offset };
    Some(GridCell { row, col })
}

pub fn cell_to_section(cell: GridCell) -> Option<u8> {
    if cell.row >= GRID_SIZE || cell.col >= GRID_SIZE {
        return None;
    }
    let offset = if cell.row % 2 == 0 { GRID_SIZE - 1 - cell.col } else { cell.col };
    Some(cell.row * GRID_SIZE + offset + 1)
}

/// Meridian-wide coordinate of a section: `north` grows northward, `east` grows eastward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurveyPoint {
    pub north: i64,
    pub east: i64,
}

impl SurveyPoint {
    pub fn offset(self, d_north: i64, d_east: i64) -> SurveyPoint {
        SurveyPoint { north: self.north + d_north, east: self.east + d_east }
    }

    //chebyshev distance, i.e. king moves
    pub fn span_to(self, other: SurveyPoint) -> i64 {
        (self.north - other.north).abs().max((self.east - other.east).abs())
    }
}

//"12N" -> (12, 'N'); only valid on canonical strings
fn split_axis(value: &str) -> Option<(i64, char)> {
    let direction = value.chars().last()?;
    let number: i64 = value[..value.len() - direction.len_utf8()].parse().ok()?;
    (number > 0).then_some((number, direction))
}

//tier index: 1N -> 0, 2N -> 1, 1S -> -1
fn township_tier(township: &str) -> Option<i64> {
    match split_axis(township)? {
        (n, 'N') => Some(n - 1),
        (n, 'S') => Some(-n),
        _ => None,
    }
}

//range index: 1E -> 0, 1W -> -1
fn range_column(range: &str) -> Option<i64> {
    match split_axis(range)? {
        (n, 'E') => Some(n - 1),
        (n, 'W') => Some(-n),
        _ => None,
    }
}

fn tier_to_township(tier: i64) -> String {
    if tier >= 0 { format!("{}N", tier + 1) } else { format!("{}S", -tier) }
}

fn column_to_range(column: i64) -> String {
    if column >= 0 { format!("{}E", column + 1) } else { format!("{}W", -column) }
}

impl LocationKey {
    pub fn grid_cell(&self) -> Option<GridCell> {
        section_to_cell(self.section())
    }

    /// Position on the meridian-wide grid; `None` only for keys with unparseable axes.
    pub fn survey_point(&self) -> Option<SurveyPoint> {
        let cell = self.grid_cell()?;
        let tier = township_tier(self.township())?;
        let column = range_column(self.range())?;
        let size = i64::from(GRID_SIZE);
        Some(SurveyPoint {
            north: tier * size + (size - 1 - i64::from(cell.row)),
            east: column * size + i64::from(cell.col),
        })
    }
}

/// Inverse of `LocationKey::survey_point` for a given meridian.
pub fn location_at(point: SurveyPoint, meridian: Meridian) -> Option<LocationKey> {
    let size = i64::from(GRID_SIZE);
    let tier = point.north.div_euclid(size);
    let row = size - 1 - point.north.rem_euclid(size);
    let column = point.east.div_euclid(size);
    let col = point.east.rem_euclid(size);

    let cell = GridCell { row: u8::try_from(row).ok()?, col: u8::try_from(col).ok()? };
    let section = cell_to_section(cell)?;
    Some(LocationKey::from_canonical(
        section,
        tier_to_township(tier),
        column_to_range(column),
        meridian,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::make_location_key;

    fn key(section: u8, township: &str, range: &str) -> LocationKey {
        make_location_key(Some(section), Some(township), Some(range), Meridian::IM).unwrap()
    }

    #[test]
    fn serpentine_corners_and_rows() {
        assert_eq!(section_to_cell(1), Some(GridCell { row: 0, col: 5 }));
        assert_eq!(section_to_cell(6), Some(GridCell { row: 0, col: 0 }));
        assert_eq!(section_to_cell(7), Some(GridCell { row: 1, col: 0 }));
        assert_eq!(section_to_cell(12), Some(GridCell { row: 1, col: 5 }));
        assert_eq!(section_to_cell(16), Some(GridCell { row: 2, col: 2 }));
        assert_eq!(section_to_cell(31), Some(GridCell { row: 5, col: 0 }));
        assert_eq!(section_to_cell(36), Some(GridCell { row: 5, col: 5 }));
        assert_eq!(section_to_cell(0), None);
        assert_eq!(section_to_cell(37), None);
    }

    #[test]
    fn cell_mapping_inverts_for_every_section() {
        for section in MIN_SECTION..=MAX_SECTION {
            let cell = section_to_cell(section).unwrap();
            assert_eq!(cell_to_section(cell), Some(section), "section {section}");
        }
        assert_eq!(cell_to_section(GridCell { row: 6, col: 0 }), None);
    }

    #[test]
    fn survey_points_straddle_baseline_and_meridian() {
        //section 31 of 1N/1E is the SW corner just above the baseline, just east of the meridian
        let p = key(31, "1N", "1E").survey_point().unwrap();
        assert_eq!(p, SurveyPoint { north: 0, east: 0 });

        //section 1 of 1S/1W is the NE corner just below the baseline, just west of the meridian
        let p = key(1, "1S", "1W").survey_point().unwrap();
        assert_eq!(p, SurveyPoint { north: -1, east: -1 });
    }

    #[test]
    fn location_at_inverts_survey_point() {
        for (section, township, range) in [(16, "12N", "5W"), (1, "1S", "1W"), (36, "3N", "27E"), (6, "9S", "2W")] {
            let k = key(section, township, range);
            let p = k.survey_point().unwrap();
            assert_eq!(location_at(p, Meridian::IM), Some(k));
        }
    }
}
