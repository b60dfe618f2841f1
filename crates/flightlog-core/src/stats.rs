// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::flight::{FlightRecord, NOT_AVAILABLE};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

const TOP_N: usize = 3;
const MINUTES_PER_DAY: u64 = 24 * 60;

/// Totals shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TravelStats {
    pub total_flights: usize,
    pub total_distance_km: u64,
    pub total_duration_minutes: u64,
    pub unique_airports: usize,
}

impl TravelStats {
    pub fn compute(flights: &[FlightRecord]) -> Self {
        let airports: HashSet<&str> = flights
            .iter()
            .flat_map(|f| [f.from.as_str(), f.to.as_str()])
            .collect();

        Self {
            total_flights: flights.len(),
            total_distance_km: flights.iter().map(|f| u64::from(f.distance)).sum(),
            total_duration_minutes: flights.iter().map(|f| u64::from(f.duration)).sum(),
            unique_airports: airports.len(),
        }
    }
}

/// Records and favourites shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileHighlights {
    pub longest_by_distance: FlightRecord,
    pub longest_by_duration: FlightRecord,
    pub top_airlines: Vec<(String, usize)>,
    pub top_aircraft: Vec<(String, usize)>,
    pub top_airports: Vec<(String, usize)>,
}

impl ProfileHighlights {
    /// `None` for an empty logbook.
    pub fn compute(flights: &[FlightRecord]) -> Option<Self> {
        let longest_by_distance = first_max_by_key(flights, |f| f.distance)?.clone();
        let longest_by_duration = first_max_by_key(flights, |f| f.duration)?.clone();

        let airlines = flights
            .iter()
            .map(|f| f.airline.as_str())
            .filter(|a| *a != NOT_AVAILABLE);
        let aircraft = flights
            .iter()
            .map(|f| f.aircraft.as_str())
            .filter(|a| *a != NOT_AVAILABLE);
        let airports = flights
            .iter()
            .flat_map(|f| [f.from_name.as_str(), f.to_name.as_str()]);

        Some(Self {
            longest_by_distance,
            longest_by_duration,
            top_airlines: top_counts(airlines, TOP_N),
            top_aircraft: top_counts(aircraft, TOP_N),
            top_airports: top_counts(airports, TOP_N),
        })
    }
}

fn first_max_by_key<F>(flights: &[FlightRecord], key: F) -> Option<&FlightRecord>
where
    F: Fn(&FlightRecord) -> u32,
{
    flights.iter().fold(None, |best, f| match best {
        Some(b) if key(b) >= key(f) => Some(b),
        _ => Some(f),
    })
}

/// Most frequent values, ties kept in order of first appearance.
fn top_counts<'a, I>(values: I, n: usize) -> Vec<(String, usize)>
where
    I: Iterator<Item = &'a str>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for value in values {
        match index.get(value) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(value, order.len());
                order.push((value.to_string(), 1));
            }
        }
    }
    // sort_by is stable
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(n);
    order
}

/// `"2d 3h 15m"`
pub fn format_duration_long(minutes: u64) -> String {
    let d = minutes / MINUTES_PER_DAY;
    let h = (minutes % MINUTES_PER_DAY) / 60;
    let m = minutes % 60;
    format!("{}d {}h {}m", d, h, m)
}

/// Drops the smallest unit once a larger one is present: `"2d 3h"`, `"3h 15m"`, `"15m"`.
pub fn format_duration_compact(minutes: u64) -> String {
    let d = minutes / MINUTES_PER_DAY;
    let h = (minutes % MINUTES_PER_DAY) / 60;
    let m = minutes % 60;
    if d > 0 {
        format!("{}d {}h", d, h)
    } else if h > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}m", m)
    }
}

/// `"10h 55m"`, hours are not rolled into days.
pub fn format_hours_minutes(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

pub fn format_distance_compact(km: u64) -> String {
    if km >= 1_000_000 {
        format!("{:.1}m", km as f64 / 1_000_000.0)
    } else if km >= 1000 {
        format!("{}k", (km as f64 / 1000.0).round() as u64)
    } else {
        km.to_string()
    }
}

/// Distinct years present in the logbook, newest first.
pub fn available_years(flights: &[FlightRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = flights
        .iter()
        .filter_map(|f| f.parsed_date())
        .map(|d| d.year())
        .collect();
    years.into_iter().rev().collect()
}

fn date_of<T: AsRef<FlightRecord>>(flight: &T) -> Option<NaiveDate> {
    flight.as_ref().parsed_date()
}

/// Works on bare records and on stored flights (or references to either).
pub fn filter_by_year<T>(flights: &[T], year: i32) -> Vec<T>
where
    T: AsRef<FlightRecord> + Clone,
{
    flights
        .iter()
        .filter(|f| date_of(*f).map(|d| d.year()) == Some(year))
        .cloned()
        .collect()
}

/// Splits into flights on or after `today` (soonest first) and the rest (input order).
/// Flights without a readable date count as past.
pub fn split_upcoming_past<T>(flights: &[T], today: NaiveDate) -> (Vec<T>, Vec<T>)
where
    T: AsRef<FlightRecord> + Clone,
{
    let (mut upcoming, past): (Vec<T>, Vec<T>) = flights
        .iter()
        .cloned()
        .partition(|f| date_of(f).is_some_and(|d| d >= today));
    upcoming.sort_by_key(|f| date_of(f));
    (upcoming, past)
}
