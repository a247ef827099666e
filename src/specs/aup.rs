// src/specs/aup.rs
//! Scraping *spec* for the AUP/UUP details table.
//!
//! Purpose:
//! - Read the rendered **AUP/UUP details** page (one `<tr>` per activation) and
//!   collect, per Portuguese restricted area, the active time/altitude windows.
//! - Rows are matched on their joined cell text, not on column positions; the
//!   portal shuffles columns between AUP and UUP layouts.
//!
//! Row recipe:
//! - identifier: first `LP…` token (`LPD10`, `LP-R42A`), uppercased; `LPA` is the
//!   airport-wide marker and never a region.
//! - times: every `HH:MM`; only rows with 2..=4 of them are schedules. The first
//!   two make the window.
//! - levels: `SFC` or three digits, first two kept (`GND`, `9500 ft`, `FL245`).
//!
//! Output: `RegionTable`, key `d10` → `["10:00 - 12:00 | 10000 ft AMSL", …]`,
//! windows in row order, exact repeats dropped.

use std::collections::{ HashMap, HashSet };
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{ html, sanitize::region_key };
use crate::error::AupError;

/// Joins cell texts of one row before matching.
pub const ROW_SEP: &str = "|";
/// Placeholder when a row carries no level at all.
pub const NOT_SPECIFIED: &str = "Not specified";
const AIRPORT_WIDE: &str = "LPA";
const MAX_LEVELS: usize = 2;

// Literal patterns; Regex::new() cannot fail on them.
static IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(LP(?:-?[A-Z0-9]+)+)\b").expect("ident pattern"));
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{2}:[0-9]{2}").expect("time pattern"));
static LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:[0-9]{3}|SFC)\b").expect("level pattern"));

/// Normalised vertical limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Altitude {
    Ground,
    /// Feet AMSL (already multiplied out of hundreds).
    Feet(u32),
    FlightLevel(u32),
}

impl Altitude {
    /// Lowest level written as a flight level rather than feet.
    pub const FL_FLOOR: u32 = 245;

    /// `SFC`/`000` → ground, `< 245` → hundreds of feet, otherwise a flight level.
    pub fn from_token(tok: &str) -> Option<Self> {
        if tok.eq_ignore_ascii_case("SFC") {
            return Some(Altitude::Ground);
        }
        let v: u32 = tok.parse().ok()?;
        Some(match v {
            0 => Altitude::Ground,
            v if v < Self::FL_FLOOR => Altitude::Feet(v * 100),
            v => Altitude::FlightLevel(v),
        })
    }
}

impl fmt::Display for Altitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Altitude::Ground => f.write_str("GND"),
            Altitude::Feet(ft) => write!(f, "{ft} ft"),
            Altitude::FlightLevel(fl) => write!(f, "FL{fl:03}"),
        }
    }
}

/// One accepted schedule row.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegionRow {
    /// Uppercased identifier as printed, e.g. `LP-D10`.
    pub ident: String,
    /// `HH:MM - HH:MM`
    pub time_range: String,
    /// `GND/9500 ft`, or `NOT_SPECIFIED`
    pub altitude: String,
}

impl RegionRow {
    /// Apply the row recipe to one joined row; `None` for rows that are not schedules.
    pub fn from_row_text(text: &str) -> Option<Self> {
        let ident = IDENT.captures(text)?.get(1)?.as_str().to_uppercase();
        if ident == AIRPORT_WIDE {
            return None;
        }

        let times: Vec<&str> = TIME.find_iter(text).map(|m| m.as_str()).collect();
        if !(2..=4).contains(&times.len()) {
            return None;
        }
        let time_range = times[..2].join(" - ");

        let levels: Vec<String> = LEVEL
            .find_iter(text)
            .filter_map(|m| Altitude::from_token(m.as_str()))
            .take(MAX_LEVELS)
            .map(|a| a.to_string())
            .collect();
        let altitude = if levels.is_empty() { NOT_SPECIFIED.to_string() } else { levels.join("/") };

        Some(Self { ident, time_range, altitude })
    }

    /// Table key: `LP-D10` → `d10`.
    pub fn key(&self) -> String {
        region_key(&self.ident)
    }

    /// `10:00 - 12:00 | 10000 ft AMSL`
    pub fn window(&self) -> String {
        format!("{} | {} AMSL", self.time_range, self.altitude)
    }
}

/// Region key → active windows, as read from one page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionTable {
    regions: HashMap<String, Vec<String>>,
}

impl RegionTable {
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.regions.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.regions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Keys sorted, for stable console/log output.
    pub fn sorted(&self) -> Vec<(&str, &[String])> {
        let mut out: Vec<_> = self.regions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
            .collect();
        out.sort_unstable_by_key(|(k, _)| *k);
        out
    }

    pub fn push(&mut self, key: String, window: String) {
        self.regions.entry(key).or_default().push(window);
    }
}

impl FromIterator<(String, Vec<String>)> for RegionTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self { regions: iter.into_iter().collect() }
    }
}

/// Parse a rendered AUP/UUP page. Fails only when the page has no rows at all;
/// a page whose rows match nothing gives an empty table.
pub fn parse(doc: &str) -> Result<RegionTable, AupError> {
    let rows = html::row_texts(doc, ROW_SEP);
    if rows.is_empty() {
        return Err(AupError::NoTableRows);
    }
    logd!("AUP: {} table rows", rows.len());
    Ok(parse_rows(&rows))
}

/// Split out for unit tests: rows already joined with `ROW_SEP`.
pub fn parse_rows<S: AsRef<str>>(rows: &[S]) -> RegionTable {
    let mut seen: HashSet<RegionRow> = HashSet::new();
    let mut table = RegionTable::default();

    for text in rows {
        let Some(row) = RegionRow::from_row_text(text.as_ref()) else { continue };
        let key = row.key();
        if key.is_empty() || seen.contains(&row) {
            continue;
        }
        let window = row.window();
        logd!("AUP: {key}\t{window}");
        table.push(key, window);
        seen.insert(row);
    }
    table
}
