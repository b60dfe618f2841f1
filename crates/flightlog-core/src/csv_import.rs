// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Import of flight-tracker CSV exports.
//!
//! Exports from different trackers (and different versions of the same tracker)
//! disagree on column order and sometimes on column names, so columns are located
//! by header name. Free-text cells for duration and location go through a short
//! cascade of formats, first match wins.

use crate::flight::{FlightRecord, Location, NOT_AVAILABLE};
use crate::{LogbookError, Result};
use log::debug;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const COLUMN_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    From,
    To,
    FlightNumber,
    Airline,
    Distance,
    Duration,
    Aircraft,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Date,
        Column::From,
        Column::To,
        Column::FlightNumber,
        Column::Airline,
        Column::Distance,
        Column::Duration,
        Column::Aircraft,
    ];

    /// Header spellings accepted for this column, in order of preference.
    pub fn accepted_names(self) -> &'static [&'static str] {
        match self {
            Column::Date => &["Date"],
            Column::From => &["From"],
            Column::To => &["To"],
            Column::FlightNumber => &["Flight number"],
            Column::Airline => &["Airline"],
            Column::Distance => &["Distance"],
            Column::Duration => &["Duration"],
            Column::Aircraft => &["Aircraft type", "Aircraft"],
        }
    }

    /// Name used when reporting the column as missing.
    pub fn label(self) -> String {
        self.accepted_names().join("/")
    }

    pub fn is_required(self) -> bool {
        self != Column::Distance
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Resolved position of every logical column within a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [Option<usize>; COLUMN_COUNT],
}

impl ColumnMap {
    /// Resolves all columns against `header`, failing with every missing required
    /// column named in one error.
    pub fn resolve<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        let mut indices = [None; COLUMN_COUNT];
        for column in Column::ALL {
            indices[column.slot()] = column.accepted_names().iter().find_map(|name| {
                header.iter().position(|cell| cell.as_ref() == *name)
            });
        }

        let missing: Vec<String> = Column::ALL
            .iter()
            .filter(|c| c.is_required() && indices[c.slot()].is_none())
            .map(|c| c.label())
            .collect();

        if !missing.is_empty() {
            return Err(LogbookError::Format(format!(
                "CSV file has missing required columns. Could not find: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { indices })
    }

    pub fn index(&self, column: Column) -> Option<usize> {
        self.indices[column.slot()]
    }
}

/// Reads and parses a CSV export from disk.
pub fn parse_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<FlightRecord>> {
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text)
}

/// Parses the full text of a CSV export into flight records.
///
/// Rows that end up without a date or either airport code are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<FlightRecord>> {
    let text = text.trim();
    if text.lines().count() < 2 {
        return Err(LogbookError::Format(
            "CSV file is empty or has no data rows.".to_string(),
        ));
    }

    // Quotes are not a grouping construct in these exports: every comma splits.
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(clean_cell).collect(),
        None => {
            return Err(LogbookError::Format(
                "CSV file is empty or has no data rows.".to_string(),
            ))
        }
    };

    let columns = ColumnMap::resolve(&header)?;
    debug!("Resolved CSV columns — header={:?} map={:?}", header, columns);

    let mut flights = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        let record = record?;
        let values: Vec<String> = record.iter().map(clean_cell).collect();
        let flight = build_record(&values, &columns);

        if flight.date.is_empty() || flight.from.is_empty() || flight.to.is_empty() {
            dropped += 1;
            continue;
        }
        flights.push(flight);
    }

    debug!(
        "Parsed CSV export — flights={} dropped_rows={}",
        flights.len(),
        dropped
    );
    Ok(flights)
}

fn build_record(values: &[String], columns: &ColumnMap) -> FlightRecord {
    let cell = |column: Column| cell_at(values, columns, column);
    let or_na = |value: &str| {
        if value.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            value.to_string()
        }
    };

    let from = parse_location(cell(Column::From));
    let to = parse_location(cell(Column::To));

    FlightRecord {
        date: cell(Column::Date).to_string(),
        from: from.iata,
        to: to.iata,
        from_name: from.name,
        to_name: to.name,
        from_icao: from.icao,
        to_icao: to.icao,
        airline: or_na(cell(Column::Airline)),
        flight_number: or_na(cell(Column::FlightNumber)),
        aircraft: or_na(cell(Column::Aircraft)),
        distance: parse_distance(cell(Column::Distance)),
        duration: parse_duration(cell(Column::Duration)),
    }
}

fn cell_at<'a>(values: &'a [String], columns: &ColumnMap, column: Column) -> &'a str {
    columns
        .index(column)
        .and_then(|i| values.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

fn clean_cell(raw: &str) -> String {
    raw.trim().replace('"', "")
}

/// Parses a duration cell into whole minutes.
///
/// Accepts `"1h 30m"` style text, `HH:MM` or `HH:MM:SS` clock values (seconds are
/// dropped) and bare minute counts. Anything else is 0.
pub fn parse_duration(raw: &str) -> u32 {
    if raw.is_empty() {
        return 0;
    }

    static HOURS_RE: OnceLock<Regex> = OnceLock::new();
    static MINUTES_RE: OnceLock<Regex> = OnceLock::new();
    let hours_re = HOURS_RE.get_or_init(|| Regex::new(r"(\d+)\s*h").unwrap());
    let minutes_re = MINUTES_RE.get_or_init(|| Regex::new(r"(\d+)\s*m").unwrap());

    let hours = hours_re.captures(raw).map(|c| saturating_digits(&c[1]));
    let minutes = minutes_re.captures(raw).map(|c| saturating_digits(&c[1]));
    if hours.is_some() || minutes.is_some() {
        let total = hours
            .unwrap_or(0)
            .saturating_mul(60)
            .saturating_add(minutes.unwrap_or(0));
        return clamp_u32(total);
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() == 2 || parts.len() == 3 {
        if let (Some(h), Some(m)) = (leading_int(parts[0]), leading_int(parts[1])) {
            return clamp_u32(h.saturating_mul(60).saturating_add(m));
        }
    }

    leading_int(raw).map(clamp_u32).unwrap_or(0)
}

/// Extracts a location descriptor from a free-text airport cell.
pub fn parse_location(raw: &str) -> Location {
    let value = raw.trim();
    if value.is_empty() {
        return Location {
            name: NOT_AVAILABLE.to_string(),
            iata: NOT_AVAILABLE.to_string(),
            icao: None,
        };
    }

    static IATA_ICAO_RE: OnceLock<Regex> = OnceLock::new();
    static IATA_RE: OnceLock<Regex> = OnceLock::new();
    let iata_icao_re = IATA_ICAO_RE.get_or_init(|| {
        Regex::new(r"(.*?)\s*\(([A-Z]{3})\s*/\s*([A-Z]{4})\)").unwrap()
    });
    let iata_re = IATA_RE.get_or_init(|| Regex::new(r"(.*?)\s*\(([A-Z]{3})\)").unwrap());

    // Name (IATA / ICAO)
    if let Some(caps) = iata_icao_re.captures(value) {
        return Location {
            name: caps[1].trim().to_string(),
            iata: caps[2].to_string(),
            icao: Some(caps[3].to_string()),
        };
    }

    // Name (IATA)
    if let Some(caps) = iata_re.captures(value) {
        return Location {
            name: caps[1].trim().to_string(),
            iata: caps[2].to_string(),
            icao: None,
        };
    }

    if value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase()) {
        return Location {
            name: value.to_string(),
            iata: value.to_string(),
            icao: None,
        };
    }

    Location::unresolved(value)
}

/// Parses a distance cell such as `"4178 km"` into whole kilometres, 0 when unusable.
pub fn parse_distance(raw: &str) -> u32 {
    let value = raw.trim();
    let value = value.strip_suffix(" km").unwrap_or(value);
    leading_int(value).map(clamp_u32).unwrap_or(0)
}

/// Integer prefix of `s` after leading whitespace, with an optional sign.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let value = saturating_digits(&rest[..end]);
    Some(if negative { -value } else { value })
}

/// Value of an ASCII digit run, pinned at `i64::MAX` instead of overflowing.
fn saturating_digits(digits: &str) -> i64 {
    digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    })
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date,Flight number,From,To,Dep time,Arr time,Duration,\
                          Airline,Aircraft,Registration,Distance";

    #[test]
    fn test_duration_formats() {
        assert_eq!(parse_duration("3h 15m"), 195);
        assert_eq!(parse_duration("1h"), 60);
        assert_eq!(parse_duration("45m"), 45);
        assert_eq!(parse_duration("2 h 5 m"), 125);
        assert_eq!(parse_duration("2:05"), 125);
        assert_eq!(parse_duration("2:05:30"), 125);
        assert_eq!(parse_duration("90"), 90);
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("soon"), 0);
        assert_eq!(parse_duration("1:2:3:4"), 1);
    }

    #[test]
    fn test_huge_values_saturate() {
        assert_eq!(parse_duration("99999999999999999999h"), u32::MAX);
        assert_eq!(parse_duration("99999999999999999999"), u32::MAX);
        assert_eq!(parse_duration("4294967296"), u32::MAX);
        assert_eq!(parse_duration("99999999999999999999:00"), u32::MAX);
        assert_eq!(parse_distance("99999999999999999999 km"), u32::MAX);
        assert_eq!(parse_distance("-99999999999999999999 km"), 0);
    }

    #[test]
    fn test_duration_never_negative() {
        assert_eq!(parse_duration("-15"), 0);
        assert_eq!(parse_duration("-1:30"), 0);
    }

    #[test]
    fn test_location_formats() {
        assert_eq!(
            parse_location("San Francisco (SFO / KSFO)"),
            Location {
                name: "San Francisco".to_string(),
                iata: "SFO".to_string(),
                icao: Some("KSFO".to_string()),
            }
        );
        assert_eq!(
            parse_location("Tokyo (HND)"),
            Location {
                name: "Tokyo".to_string(),
                iata: "HND".to_string(),
                icao: None,
            }
        );
        let bare = parse_location("JFK");
        assert_eq!(bare.name, "JFK");
        assert_eq!(bare.iata, "JFK");
        assert!(bare.icao.is_none());

        let text = parse_location("Some Unrecognized Text");
        assert_eq!(text.name, "Some Unrecognized Text");
        assert_eq!(text.iata, "N/A");
        assert!(!text.is_resolved());
    }

    #[test]
    fn test_location_edge_cases() {
        assert_eq!(parse_location("jfk").iata, "N/A");
        assert_eq!(parse_location("  LHR ").iata, "LHR");
        assert_eq!(parse_location("").name, "N/A");
        assert_eq!(parse_location("London Heathrow (LHR/EGLL)").icao.as_deref(), Some("EGLL"));
    }

    #[test]
    fn test_distance_values() {
        assert_eq!(parse_distance("4178 km"), 4178);
        assert_eq!(parse_distance("4178"), 4178);
        assert_eq!(parse_distance("4178.6 km"), 4178);
        assert_eq!(parse_distance(""), 0);
        assert_eq!(parse_distance("far"), 0);
        assert_eq!(parse_distance("-12 km"), 0);
    }

    #[test]
    fn test_too_few_lines() {
        assert!(matches!(parse_csv(""), Err(LogbookError::Format(_))));
        assert!(matches!(
            parse_csv("OnlyHeaderRow"),
            Err(LogbookError::Format(_))
        ));
        assert!(matches!(
            parse_csv(&format!("{}\n\n  \n", HEADER)),
            Err(LogbookError::Format(_))
        ));
    }

    #[test]
    fn test_missing_columns_reported_together() {
        let text = "Date,From,To,Flight number,Aircraft\n2024-01-01,SFO,JFK,UA1,A320";
        let err = parse_csv(text).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Airline"), "{}", msg);
        assert!(msg.contains("Duration"), "{}", msg);
        assert!(!msg.contains("Distance"), "{}", msg);
    }

    #[test]
    fn test_aircraft_label_when_missing() {
        let text = "Date,From,To,Flight number,Airline,Duration\n\
                    2024-01-01,SFO,JFK,UA1,United,1h";
        let msg = parse_csv(text).unwrap_err().to_string();
        assert!(msg.contains("Aircraft type/Aircraft"), "{}", msg);
    }

    #[test]
    fn test_parse_row() {
        let row = [
            "2024-05-01",
            "UA837",
            "San Francisco (SFO / KSFO)",
            "Tokyo Haneda (HND / RJTT)",
            "11:05",
            "15:00",
            "10:55:00",
            "United Airlines (UA/UAL)",
            "Boeing 777-300ER (B77W)",
            "N2749U",
            "8277 km",
        ]
        .map(|cell| format!("\"{}\"", cell))
        .join(",");
        let text = format!("{}\n{}", HEADER, row);
        let flights = parse_csv(&text).unwrap();
        assert_eq!(flights.len(), 1);
        let f = &flights[0];
        assert_eq!(f.date, "2024-05-01");
        assert_eq!(f.from, "SFO");
        assert_eq!(f.to, "HND");
        assert_eq!(f.from_name, "San Francisco");
        assert_eq!(f.to_icao.as_deref(), Some("RJTT"));
        assert_eq!(f.flight_number, "UA837");
        assert_eq!(f.airline, "United Airlines (UA/UAL)");
        assert_eq!(f.aircraft, "Boeing 777-300ER (B77W)");
        assert_eq!(f.duration, 655);
        assert_eq!(f.distance, 8277);
    }

    #[test]
    fn test_blank_fields_default() {
        let text = "Date,From,To,Flight number,Airline,Duration,Aircraft type\n\
                    2024-01-01,SFO,JFK,,,,";
        let flights = parse_csv(text).unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].airline, "N/A");
        assert_eq!(flights[0].flight_number, "N/A");
        assert_eq!(flights[0].aircraft, "N/A");
        assert_eq!(flights[0].duration, 0);
        assert_eq!(flights[0].distance, 0);
    }

    #[test]
    fn test_rows_without_date_are_dropped() {
        let text = "Date,From,To,Flight number,Airline,Duration,Aircraft\n\
                    2024-01-01,SFO,JFK,UA1,United,5h 10m,A320\n\
                    ,,,,,,\n\
                    2024-01-03,JFK,LHR,BA112,British Airways,6:50,B777";
        let flights = parse_csv(text).unwrap();
        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0].flight_number, "UA1");
        assert_eq!(flights[1].flight_number, "BA112");
    }

    #[test]
    fn test_short_row_reads_missing_cells_as_blank() {
        let text = "Date,From,To,Flight number,Airline,Duration,Aircraft\n2024-01-01,SFO,JFK";
        let flights = parse_csv(text).unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].airline, "N/A");
    }

    #[test]
    fn test_column_map_prefers_first_spelling() {
        let header = [
            "Aircraft",
            "Aircraft type",
            "Date",
            "From",
            "To",
            "Flight number",
            "Airline",
            "Duration",
        ];
        let map = ColumnMap::resolve(&header).unwrap();
        assert_eq!(map.index(Column::Aircraft), Some(1));
        assert_eq!(map.index(Column::Distance), None);
        assert_eq!(map.index(Column::Date), Some(2));
    }
}
