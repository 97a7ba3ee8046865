// location model: raw STR tuples -> canonical LocationKey
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::Meridian;

/// Counties that sit on the Cimarron Meridian grid instead of the Indian Meridian one.
pub const PANHANDLE_COUNTIES: [&str; 3] = ["BEAVER", "CIMARRON", "TEXAS"];

pub const MIN_SECTION: u8 = 1;
pub const MAX_SECTION: u8 = 36;

/// Canonical Section/Township/Range/Meridian location.
///
/// Township and range are stored in canonical form (`"12N"`, `"5W"`) and compared as
/// plain strings. Only `make_location_key` builds one from raw input, so an existing
/// key always holds a section in 1..=36 and parseable township/range strings. Decoding
/// goes through the same normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawLocationKey")]
pub struct LocationKey {
    section: u8,
    township: String,
    range: String,
    meridian: Meridian,
}

impl LocationKey {
    //only for values that already went through normalization (grid math, tests)
    pub(crate) fn from_canonical(section: u8, township: String, range: String, meridian: Meridian) -> Self {
        Self { section, township, range, meridian }
    }

    pub fn section(&self) -> u8 {
        self.section
    }

    pub fn township(&self) -> &str {
        &self.township
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn meridian(&self) -> Meridian {
        self.meridian
    }

    /// Same township, range and meridian (section may differ).
    pub fn same_township_range(&self, other: &LocationKey) -> bool {
        self.township == other.township && self.range == other.range && self.meridian == other.meridian
    }

    pub fn with_section(&self, section: u8) -> Option<LocationKey> {
        normalize_section_value(i64::from(section)).map(|section| LocationKey {
            section,
            township: self.township.clone(),
            range: self.range.clone(),
            meridian: self.meridian,
        })
    }
}

//wire shape before normalization
#[derive(Deserialize)]
struct RawLocationKey {
    section: u8,
    township: String,
    range: String,
    #[serde(default)]
    meridian: Meridian,
}

impl TryFrom<RawLocationKey> for LocationKey {
    type Error = String;

    fn try_from(raw: RawLocationKey) -> Result<Self, Self::Error> {
        make_location_key(Some(raw.section), Some(&raw.township), Some(&raw.range), raw.meridian).ok_or_else(|| {
            format!("invalid location {}-{}-{}-{}", raw.section, raw.township, raw.range, raw.meridian)
        })
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.section, self.township, self.range, self.meridian)
    }
}

fn normalize_section_value(value: i64) -> Option<u8> {
    if (i64::from(MIN_SECTION)..=i64::from(MAX_SECTION)).contains(&value) {
        u8::try_from(value).ok()
    } else {
        None
    }
}

/// Parse a raw section value; anything that is not an integer in 1..=36 is `None`.
///
/// Accepts a trailing `.0` because spreadsheet-era records store sections as floats.
pub fn normalize_section(raw: &str) -> Option<u8> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    let value: i64 = digits.parse().ok()?;
    normalize_section_value(value)
}

//shared by township + range: optional label letter, digits, direction letter
fn normalize_axis(raw: &str, label: char, directions: [char; 2]) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let body = match compact.strip_prefix(label) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => compact.as_str(),
    };

    let direction = body.chars().last()?;
    if !directions.contains(&direction) {
        return None;
    }
    let digits = &body[..body.len() - direction.len_utf8()];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: u32 = digits.parse().ok()?;
    if number == 0 {
        return None;
    }
    Some(format!("{number}{direction}"))
}

/// `"012N"`, `"T12N"`, `" 12 n"` all become `"12N"`. Malformed input is `None`.
pub fn normalize_township(raw: &str) -> Option<String> {
    normalize_axis(raw, 'T', ['N', 'S'])
}

/// `"05W"`, `"R5W"` become `"5W"`. Malformed input is `None`.
pub fn normalize_range(raw: &str) -> Option<String> {
    normalize_axis(raw, 'R', ['E', 'W'])
}

//"007-BEAVER", "025 Cimarron County" -> "BEAVER", "CIMARRON"
fn normalize_county(raw: &str) -> String {
    let upper = raw.trim().to_ascii_uppercase();
    let stripped = upper.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-' || c == ' ');
    let stripped = stripped.strip_suffix(" COUNTY").unwrap_or(stripped);
    stripped.trim().to_string()
}

pub fn is_panhandle_county(county: &str) -> bool {
    let normalized = normalize_county(county);
    PANHANDLE_COUNTIES.contains(&normalized.as_str())
}

/// Explicit meridian wins when present and non-empty; otherwise the county decides.
pub fn resolve_meridian(explicit: Option<&str>, county: Option<&str>) -> Meridian {
    if let Some(raw) = explicit.filter(|s| !s.trim().is_empty()) {
        match Meridian::parse(raw) {
            Some(meridian) => return meridian,
            None => debug!(explicit = raw, "unrecognized meridian, falling back to county default"),
        }
    }

    match county {
        Some(c) if is_panhandle_county(c) => Meridian::CM,
        _ => Meridian::default(),
    }
}

/// Build a key from already-parsed section plus raw township/range.
///
/// Returns `None` when the section is missing or township/range are empty or malformed.
pub fn make_location_key(
    section: Option<u8>,
    township: Option<&str>,
    range: Option<&str>,
    meridian: Meridian,
) -> Option<LocationKey> {
    let section = normalize_section_value(i64::from(section?))?;
    let township = normalize_township(township?)?;
    let range = normalize_range(range?)?;
    Some(LocationKey { section, township, range, meridian })
}

/// Convenience for store boundaries: every field raw, meridian resolved from explicit/county.
pub fn location_from_raw(
    section: Option<&str>,
    township: Option<&str>,
    range: Option<&str>,
    meridian: Option<&str>,
    county: Option<&str>,
) -> Option<LocationKey> {
    let section = section.and_then(normalize_section);
    make_location_key(section, township, range, resolve_meridian(meridian, county))
}
