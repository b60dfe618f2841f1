// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::flight::{FlightRecord, NOT_AVAILABLE};
use crate::geo::{haversine_km, Coordinates};
use crate::Result;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One row of the airport coordinate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub iata: String,
    #[serde(default)]
    pub icao: Option<String>,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl Airport {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// IATA-keyed airport table used to verify and fill in imported flights.
#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    airports: HashMap<String, Airport>,
}

impl AirportDirectory {
    pub fn new(airports: Vec<Airport>) -> Self {
        let airports = airports
            .into_iter()
            .map(|mut a| {
                a.iata = a.iata.trim().to_uppercase();
                a.icao = a
                    .icao
                    .map(|c| c.trim().to_uppercase())
                    .filter(|c| !c.is_empty());
                (a.iata.clone(), a)
            })
            .collect();
        Self { airports }
    }

    /// Loads a table with the header `iata,icao,name,city,country,lat,lon`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut airports = Vec::new();
        for row in rdr.deserialize() {
            let airport: Airport = row?;
            airports.push(airport);
        }
        debug!("Loaded airport directory — airports={}", airports.len());
        Ok(Self::new(airports))
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn get(&self, iata: &str) -> Option<&Airport> {
        self.airports.get(&iata.trim().to_uppercase())
    }

    /// Batch lookup keyed by the distinct requested codes. Unknown codes are left out.
    pub fn lookup_many<I, S>(&self, codes: I) -> HashMap<String, &Airport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .filter_map(|code| {
                let key = code.as_ref().trim().to_uppercase();
                self.airports.get(&key).map(|a| (key, a))
            })
            .collect()
    }

    pub fn distance_between(&self, from: &str, to: &str) -> Option<f64> {
        let a = self.get(from)?;
        let b = self.get(to)?;
        Some(haversine_km(a.lat, a.lon, b.lat, b.lon))
    }

    /// Recomputes the distance of every flight whose endpoints are both known, and
    /// fills in names and ICAO codes the import could not resolve.
    ///
    /// Returns the number of flights whose distance was recomputed.
    pub fn recalculate_distances(&self, flights: &mut [FlightRecord]) -> usize {
        let unknown = self.unknown_codes(flights);
        for code in &unknown {
            warn!("Airport not in directory; distance left as imported — iata={}", code);
        }

        let updated = flights
            .par_iter_mut()
            .map(|flight| self.refresh_flight(flight))
            .filter(|&updated| updated)
            .count();

        debug!(
            "Recalculated flight distances — flights={} updated={} unknown_airports={}",
            flights.len(),
            updated,
            unknown.len()
        );
        updated
    }

    /// Distinct airport codes in `flights` missing from the directory, sorted.
    /// Unresolved `N/A` locations are not codes and are left out.
    pub fn unknown_codes(&self, flights: &[FlightRecord]) -> Vec<String> {
        let unknown: BTreeSet<&str> = flights
            .iter()
            .flat_map(|f| [f.from.as_str(), f.to.as_str()])
            .filter(|code| *code != NOT_AVAILABLE && self.get(code).is_none())
            .collect();
        unknown.into_iter().map(str::to_string).collect()
    }

    fn refresh_flight(&self, flight: &mut FlightRecord) -> bool {
        let (from, to) = match (self.get(&flight.from), self.get(&flight.to)) {
            (Some(from), Some(to)) => (from, to),
            _ => return false,
        };

        if flight.from_name == flight.from {
            flight.from_name = from.name.clone();
        }
        if flight.to_name == flight.to {
            flight.to_name = to.name.clone();
        }
        if flight.from_icao.is_none() {
            flight.from_icao = from.icao.clone();
        }
        if flight.to_icao.is_none() {
            flight.to_icao = to.icao.clone();
        }

        let km = from.coordinates().distance_km_to(&to.coordinates());
        flight.distance = km.round() as u32;
        true
    }
}
