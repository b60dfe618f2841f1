// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::flight::{FlightRecord, StoredFlight};
use crate::{LogbookError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// The user's flights as kept on disk. Ids are assigned here and never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logbook {
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub flights: Vec<StoredFlight>,
}

fn first_id() -> u64 {
    1
}

impl Default for Logbook {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            flights: Vec::new(),
        }
    }
}

impl Logbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the logbook at `path`, or an empty one if the file does not exist yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No logbook on disk yet — path={}", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let mut logbook: Logbook = serde_json::from_str(&content)?;

        // Hand-edited files may carry ids at or past next_id.
        let max_id = logbook.flights.iter().map(|f| f.id).max().unwrap_or(0);
        logbook.next_id = logbook.next_id.max(max_id + 1);
        Ok(logbook)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Always keep the previous version as a backup
        if path.exists() {
            fs::copy(path, path.with_extension("bak"))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        debug!(
            "Saved logbook — path={} flights={}",
            path.display(),
            self.flights.len()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&StoredFlight> {
        self.flights.iter().find(|f| f.id == id)
    }

    pub fn add(&mut self, record: FlightRecord) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.flights.push(StoredFlight { id, record });
        id
    }

    /// Adds the flights not already in the logbook (matched on date, route and
    /// flight number) and returns how many were added.
    pub fn add_many<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = FlightRecord>,
    {
        let mut seen: HashSet<String> = self.flights.iter().map(|f| f.record.dedup_key()).collect();
        let mut added = 0;
        let mut skipped = 0;

        for record in records {
            if seen.insert(record.dedup_key()) {
                self.add(record);
                added += 1;
            } else {
                skipped += 1;
            }
        }

        info!(
            "Added flights to logbook — added={} duplicates_skipped={}",
            added, skipped
        );
        added
    }

    pub fn update(&mut self, id: u64, record: FlightRecord) -> Result<()> {
        let flight = self
            .flights
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(LogbookError::NotFound(id))?;
        flight.record = record;
        Ok(())
    }

    pub fn delete(&mut self, id: u64) -> Result<StoredFlight> {
        let pos = self
            .flights
            .iter()
            .position(|f| f.id == id)
            .ok_or(LogbookError::NotFound(id))?;
        Ok(self.flights.remove(pos))
    }

    /// Newest first; flights with the same date keep insertion order.
    pub fn flights_by_date_desc(&self) -> Vec<&StoredFlight> {
        let mut flights: Vec<&StoredFlight> = self.flights.iter().collect();
        flights.sort_by(|a, b| b.record.date.cmp(&a.record.date));
        flights
    }

    /// Records in insertion order, without their ids.
    pub fn records(&self) -> impl Iterator<Item = &FlightRecord> + '_ {
        self.flights.iter().map(|f| &f.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, number: &str) -> FlightRecord {
        FlightRecord {
            date: date.to_string(),
            from: "SFO".to_string(),
            to: "JFK".to_string(),
            from_name: "SFO".to_string(),
            to_name: "JFK".to_string(),
            from_icao: None,
            to_icao: None,
            airline: "United".to_string(),
            flight_number: number.to_string(),
            aircraft: "A320".to_string(),
            distance: 4160,
            duration: 320,
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut book = Logbook::new();
        assert_eq!(book.add(record("2024-01-01", "UA1")), 1);
        assert_eq!(book.add(record("2024-01-02", "UA2")), 2);
        book.delete(2).unwrap();
        assert_eq!(book.add(record("2024-01-03", "UA3")), 3);
    }

    #[test]
    fn test_add_many_skips_duplicates() {
        let mut book = Logbook::new();
        book.add(record("2024-01-01", "UA1"));

        let added = book.add_many(vec![
            record("2024-01-01", "UA1"),
            record("2024-01-02", "UA1"),
            record("2024-01-02", "UA1"),
            record("2024-01-02", "UA2"),
        ]);
        assert_eq!(added, 2);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_update_and_delete_missing() {
        let mut book = Logbook::new();
        let id = book.add(record("2024-01-01", "UA1"));

        let mut changed = record("2024-01-01", "UA1");
        changed.duration = 330;
        book.update(id, changed).unwrap();
        assert_eq!(book.get(id).unwrap().record.duration, 330);

        assert!(matches!(
            book.update(99, record("2024-01-01", "UA1")),
            Err(LogbookError::NotFound(99))
        ));
        assert!(matches!(book.delete(99), Err(LogbookError::NotFound(99))));
        assert_eq!(book.delete(id).unwrap().id, id);
        assert!(book.is_empty());
    }

    #[test]
    fn test_sorted_newest_first() {
        let mut book = Logbook::new();
        book.add(record("2023-05-01", "A"));
        book.add(record("2024-05-01", "B"));
        book.add(record("2023-12-01", "C"));
        let sorted = book.flights_by_date_desc();
        let order: Vec<&str> = sorted
            .iter()
            .map(|f| f.record.flight_number.as_str())
            .collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_records_follow_insertion_order() {
        let mut book = Logbook::new();
        book.add(record("2024-05-01", "B"));
        book.add(record("2023-05-01", "A"));
        let numbers: Vec<&str> = book.records().map(|r| r.flight_number.as_str()).collect();
        assert_eq!(numbers, vec!["B", "A"]);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("logbook.json");

        assert!(Logbook::load(&path).unwrap().is_empty());

        let mut book = Logbook::new();
        book.add(record("2024-01-01", "UA1"));
        book.save(&path).unwrap();
        book.add(record("2024-01-02", "UA2"));
        book.save(&path).unwrap();

        assert!(path.with_extension("bak").exists());
        let loaded = Logbook::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.next_id, 3);
        assert_eq!(loaded.get(2).unwrap().record.flight_number, "UA2");
    }

    #[test]
    fn test_load_repairs_next_id() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("logbook.json");
        let mut book = Logbook::new();
        book.add(record("2024-01-01", "UA1"));
        book.add(record("2024-01-02", "UA2"));
        book.next_id = 1;
        book.save(&path).unwrap();

        let loaded = Logbook::load(&path).unwrap();
        assert_eq!(loaded.next_id, 3);
    }
}
