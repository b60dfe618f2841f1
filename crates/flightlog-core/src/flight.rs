// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder used for unresolved airports and blank free-text fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single flight as imported or entered, before the logbook gives it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// ISO 8601 calendar date (`YYYY-MM-DD`), kept as imported.
    pub date: String,
    pub from: String,
    pub to: String,
    pub from_name: String,
    pub to_name: String,
    #[serde(rename = "fromICAO", default, skip_serializing_if = "Option::is_none")]
    pub from_icao: Option<String>,
    #[serde(rename = "toICAO", default, skip_serializing_if = "Option::is_none")]
    pub to_icao: Option<String>,
    pub airline: String,
    pub flight_number: String,
    pub aircraft: String,
    /// Kilometres.
    pub distance: u32,
    /// Minutes.
    pub duration: u32,
}

impl FlightRecord {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// Key used to detect the same flight being imported twice.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.date, self.from, self.to, self.flight_number
        )
    }

    pub fn route(&self) -> String {
        format!("{} → {}", self.from, self.to)
    }

    /// Like [`route`](Self::route), with the ICAO code appended to each end that has one.
    pub fn route_with_icao(&self) -> String {
        format!(
            "{} → {}",
            endpoint_label(&self.from, self.from_icao.as_deref()),
            endpoint_label(&self.to, self.to_icao.as_deref())
        )
    }
}

fn endpoint_label(iata: &str, icao: Option<&str>) -> String {
    match icao {
        Some(icao) => format!("{}/{}", iata, icao),
        None => iata.to_string(),
    }
}

impl AsRef<FlightRecord> for FlightRecord {
    fn as_ref(&self) -> &FlightRecord {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFlight {
    pub id: u64,
    #[serde(flatten)]
    pub record: FlightRecord,
}

impl AsRef<FlightRecord> for StoredFlight {
    fn as_ref(&self) -> &FlightRecord {
        &self.record
    }
}

/// Airport reference extracted from a single free-text location cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub iata: String,
    pub icao: Option<String>,
}

impl Location {
    pub fn unresolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
            iata: NOT_AVAILABLE.to_string(),
            icao: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.iata != NOT_AVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn sample() -> FlightRecord {
        FlightRecord {
            date: "2024-03-09".to_string(),
            from: "SFO".to_string(),
            to: "HND".to_string(),
            from_name: "San Francisco".to_string(),
            to_name: "Tokyo".to_string(),
            from_icao: Some("KSFO".to_string()),
            to_icao: None,
            airline: "United Airlines".to_string(),
            flight_number: "UA837".to_string(),
            aircraft: "Boeing 777-300ER".to_string(),
            distance: 8277,
            duration: 655,
        }
    }

    #[test]
    fn test_parsed_date() {
        let date = sample().parsed_date().unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 3);

        let mut bad = sample();
        bad.date = "09/03/2024".to_string();
        assert!(bad.parsed_date().is_none());
    }

    #[test]
    fn test_dedup_key() {
        assert_eq!(sample().dedup_key(), "2024-03-09-SFO-HND-UA837");
    }

    #[test]
    fn test_route_with_icao() {
        let flight = sample();
        assert_eq!(flight.route(), "SFO → HND");
        assert_eq!(flight.route_with_icao(), "SFO/KSFO → HND");

        let mut both = sample();
        both.to_icao = Some("RJTT".to_string());
        assert_eq!(both.route_with_icao(), "SFO/KSFO → HND/RJTT");
    }

    #[test]
    fn test_json_shape() {
        let stored = StoredFlight {
            id: 7,
            record: sample(),
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["fromName"], "San Francisco");
        assert_eq!(value["fromICAO"], "KSFO");
        assert_eq!(value["flightNumber"], "UA837");
        assert!(value.get("toICAO").is_none());

        let back: StoredFlight = serde_json::from_value(value).unwrap();
        assert_eq!(back, stored);
    }
}
