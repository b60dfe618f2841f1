// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::csv_import::Column;
use crate::flight::FlightRecord;
use crate::stats::format_hours_minutes;
use crate::Result;
use std::io::Write;

/// Writes flights in the same shape the importer reads.
pub fn write_csv<W: Write>(writer: W, flights: &[FlightRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let header = [
        Column::Date,
        Column::From,
        Column::To,
        Column::FlightNumber,
        Column::Airline,
        Column::Distance,
        Column::Duration,
        Column::Aircraft,
    ]
    .map(|c| c.accepted_names()[0]);
    wtr.write_record(header)?;

    for f in flights {
        wtr.write_record([
            f.date.clone(),
            format_location(&f.from_name, &f.from, f.from_icao.as_deref()),
            format_location(&f.to_name, &f.to, f.to_icao.as_deref()),
            f.flight_number.clone(),
            f.airline.clone(),
            format!("{} km", f.distance),
            format_hours_minutes(u64::from(f.duration)),
            f.aircraft.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(flights: &[FlightRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, flights)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn format_location(name: &str, iata: &str, icao: Option<&str>) -> String {
    if iata == crate::flight::NOT_AVAILABLE {
        return name.to_string();
    }
    match icao {
        Some(icao) => format!("{} ({} / {})", name, iata, icao),
        None if name == iata => iata.to_string(),
        None => format!("{} ({})", name, iata),
    }
}
