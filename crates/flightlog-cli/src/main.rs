// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flightlog_core::airports::AirportDirectory;
use flightlog_core::csv_import::parse_csv_file;
use flightlog_core::settings::Settings;
use flightlog_core::stats::{self, ProfileHighlights, TravelStats};
use flightlog_core::store::Logbook;
use flightlog_core::{haversine_km, DistanceUnit, FlightRecord, StoredFlight};
use log::info;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the logbook file
    #[arg(short, long, env = "FLIGHTLOG_PATH")]
    logbook: Option<PathBuf>,

    /// Airport table used to recompute distances (iata,icao,name,city,country,lat,lon)
    #[arg(short, long, env = "FLIGHTLOG_AIRPORTS")]
    airports: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import flights from a flight-tracker CSV export
    Import {
        file: PathBuf,
        /// Parse and report without touching the logbook
        #[arg(long)]
        dry_run: bool,
    },
    /// Add a single flight by hand
    Add(AddArgs),
    /// List upcoming flights (soonest first), then past flights (newest first)
    List {
        #[arg(long)]
        year: Option<i32>,
        /// Show ICAO codes next to IATA codes where known
        #[arg(long)]
        icao: bool,
    },
    /// Remove a flight by id
    Delete { id: u64 },
    /// Show totals
    Stats {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show longest flights and favourite airlines, aircraft and airports
    Profile,
    /// Great-circle distance between two coordinates
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lon1: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
        #[arg(allow_hyphen_values = true)]
        lon2: f64,
    },
    /// Write the logbook as CSV in the import format
    Export { out: PathBuf },
    /// Set the display unit (km or mi); toggles when no unit is given
    Unit { unit: Option<DistanceUnit> },
}

#[derive(Args)]
struct AddArgs {
    /// Date as YYYY-MM-DD
    #[arg(long)]
    date: chrono::NaiveDate,
    /// Departure IATA code
    #[arg(long)]
    from: String,
    /// Arrival IATA code
    #[arg(long)]
    to: String,
    #[arg(long, default_value = "N/A")]
    airline: String,
    #[arg(long, default_value = "N/A")]
    flight_number: String,
    #[arg(long, default_value = "N/A")]
    aircraft: String,
    /// Kilometres; computed from the airport table when omitted
    #[arg(long)]
    distance: Option<u32>,
    /// Minutes
    #[arg(long, default_value_t = 0)]
    duration: u32,
}

impl AddArgs {
    fn into_record(self) -> FlightRecord {
        let from = self.from.trim().to_uppercase();
        let to = self.to.trim().to_uppercase();
        FlightRecord {
            date: self.date.format("%Y-%m-%d").to_string(),
            from_name: from.clone(),
            to_name: to.clone(),
            from,
            to,
            from_icao: None,
            to_icao: None,
            airline: self.airline,
            flight_number: self.flight_number,
            aircraft: self.aircraft,
            distance: self.distance.unwrap_or(0),
            duration: self.duration,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .build();
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn load_airports(path: Option<&PathBuf>) -> Result<Option<AirportDirectory>> {
    match path {
        Some(path) => {
            let dir = AirportDirectory::from_path(path)
                .with_context(|| format!("Failed to load airport table {:?}", path))?;
            Ok(Some(dir))
        }
        None => Ok(None),
    }
}

/// Stored flights newest first, limited to `year` when given.
fn scoped_flights(book: &Logbook, year: Option<i32>) -> Vec<&StoredFlight> {
    let flights = book.flights_by_date_desc();
    match year {
        Some(year) => stats::filter_by_year(&flights, year),
        None => flights,
    }
}

fn scoped_records(book: &Logbook, year: Option<i32>) -> Vec<FlightRecord> {
    scoped_flights(book, year)
        .into_iter()
        .map(|f| f.record.clone())
        .collect()
}

fn print_flight(stored: &StoredFlight, unit: DistanceUnit, icao: bool) {
    let f = &stored.record;
    let route = if icao { f.route_with_icao() } else { f.route() };
    println!(
        "#{:<4} {}  {:<8} {} ({} → {})  {:>6.0} {}  {}  {}  {}",
        stored.id,
        f.date,
        f.flight_number,
        route,
        f.from_name,
        f.to_name,
        unit.convert(f64::from(f.distance)),
        unit,
        stats::format_hours_minutes(u64::from(f.duration)),
        f.airline,
        f.aircraft
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load();
    let logbook_path = cli
        .logbook
        .clone()
        .unwrap_or_else(|| settings.resolved_logbook_path());
    let airports_path = cli.airports.clone().or_else(|| settings.airports_path.clone());
    let unit = settings.distance_unit;

    match cli.command {
        Commands::Import { file, dry_run } => {
            let mut flights = parse_csv_file(&file)
                .with_context(|| format!("Failed to parse CSV file {:?}", file))?;
            println!("Parsed {} flights from {:?}", flights.len(), file);

            if let Some(airports) = load_airports(airports_path.as_ref())? {
                let updated = airports.recalculate_distances(&mut flights);
                println!("Recalculated distance for {} flights", updated);
            }

            if dry_run {
                for f in &flights {
                    println!(
                        "{}  {:<8} {}  {:>6.0} {}  {}",
                        f.date,
                        f.flight_number,
                        f.route(),
                        unit.convert(f64::from(f.distance)),
                        unit,
                        stats::format_hours_minutes(u64::from(f.duration))
                    );
                }
                return Ok(());
            }

            let mut book = Logbook::load(&logbook_path)?;
            let added = book.add_many(flights);
            book.save(&logbook_path)?;
            println!("Added {} new flights to {:?}", added, logbook_path);
        }
        Commands::Add(args) => {
            let explicit_distance = args.distance.is_some();
            let mut record = args.into_record();
            if !explicit_distance {
                if let Some(airports) = load_airports(airports_path.as_ref())? {
                    airports.recalculate_distances(std::slice::from_mut(&mut record));
                }
            }

            let mut book = Logbook::load(&logbook_path)?;
            let id = book.add(record);
            book.save(&logbook_path)?;
            println!("Added flight #{}", id);
        }
        Commands::List { year, icao } => {
            let book = Logbook::load(&logbook_path)?;
            let flights = scoped_flights(&book, year);
            let today = chrono::Local::now().date_naive();
            let (upcoming, past) = stats::split_upcoming_past(&flights, today);

            for (title, section) in [("Upcoming", &upcoming), ("Past", &past)] {
                if section.is_empty() {
                    continue;
                }
                println!("{} ({}):", title, section.len());
                for stored in section {
                    print_flight(stored, unit, icao);
                }
            }
            if flights.is_empty() {
                println!("No flights logged.");
            }
        }
        Commands::Delete { id } => {
            let mut book = Logbook::load(&logbook_path)?;
            let removed = book.delete(id)?;
            book.save(&logbook_path)?;
            println!(
                "Deleted flight #{} ({} {})",
                removed.id,
                removed.record.date,
                removed.record.route()
            );
        }
        Commands::Stats { year } => {
            let book = Logbook::load(&logbook_path)?;
            let records = scoped_records(&book, year);
            let totals = TravelStats::compute(&records);

            let all: Vec<FlightRecord> = book.records().cloned().collect();
            let years = stats::available_years(&all);
            if !years.is_empty() {
                let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
                println!("Years:           {}", years.join(", "));
            }
            println!("Total flights:   {}", totals.total_flights);
            println!(
                "Total distance:  {:.0} {}",
                unit.convert(totals.total_distance_km as f64),
                unit
            );
            println!(
                "Time in air:     {}",
                stats::format_duration_long(totals.total_duration_minutes)
            );
            println!("Airports:        {}", totals.unique_airports);

            let today = chrono::Local::now().date_naive();
            let (upcoming, _) = stats::split_upcoming_past(&records, today);
            if let Some(next) = upcoming.first() {
                println!(
                    "Next flight:     {} {} {}",
                    next.date,
                    next.flight_number,
                    next.route()
                );
            }
        }
        Commands::Profile => {
            let book = Logbook::load(&logbook_path)?;
            let records: Vec<FlightRecord> = book.records().cloned().collect();
            let Some(h) = ProfileHighlights::compute(&records) else {
                println!("No flights logged yet.");
                return Ok(());
            };

            let d = &h.longest_by_distance;
            println!(
                "Longest by distance: {:.0} {} ({} on {})",
                unit.convert(f64::from(d.distance)),
                unit,
                d.route(),
                d.airline
            );
            let t = &h.longest_by_duration;
            println!(
                "Longest by duration: {} ({} on {})",
                stats::format_hours_minutes(u64::from(t.duration)),
                t.route(),
                t.airline
            );
            for (title, list) in [
                ("Top airlines", &h.top_airlines),
                ("Top aircraft", &h.top_aircraft),
                ("Top airports", &h.top_airports),
            ] {
                println!("{}:", title);
                for (rank, (name, count)) in list.iter().enumerate() {
                    let noun = if *count > 1 { "flights" } else { "flight" };
                    println!("  {}. {} ({} {})", rank + 1, name, count, noun);
                }
            }
        }
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let km = haversine_km(lat1, lon1, lat2, lon2);
            println!("{:.1} {}", unit.convert(km), unit);
        }
        Commands::Export { out } => {
            let book = Logbook::load(&logbook_path)?;
            let file = File::create(&out).with_context(|| format!("Failed to create {:?}", out))?;
            let records: Vec<FlightRecord> = book.records().cloned().collect();
            flightlog_core::export::write_csv(file, &records)?;
            println!("Exported {} flights to {:?}", book.len(), out);
        }
        Commands::Unit { unit } => {
            let current = settings.distance_unit;
            settings.distance_unit = unit.unwrap_or_else(|| current.toggle());
            settings.save()?;
            info!("Saved settings — distance_unit={}", settings.distance_unit);
            println!("Distances are shown in {}", settings.distance_unit);
        }
    }

    Ok(())
}
