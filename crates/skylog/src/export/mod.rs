//! Static site exporter.
//!
//! Reads the logbook, computes every JSON document and HTML page in memory,
//! and only then writes the bundle to the output directory. A failure part
//! way through computation therefore leaves the previous bundle untouched.
//!
//! The export is deterministic for a given database state and reference
//! date: re-exporting unchanged data produces byte-identical output, which
//! is what lets the publisher detect "no changes" reliably.

pub mod html;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::currency::{
    license_status, medical_status, passenger_currency, LicenseStatus, MedicalStatus,
    PassengerCurrency,
};
use crate::error::{Error, Result};
use crate::model::{Airport, Flight, Pilot};
use crate::stats;
use crate::storage::Storage;

/// Earth radius in nautical miles, for route distances.
const EARTH_RADIUS_NM: f64 = 3440.065;

/// Summary of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Directory the bundle was written to.
    pub output_dir: PathBuf,
    /// Number of flights exported.
    pub flight_count: usize,
    /// Number of unique routes exported.
    pub route_count: usize,
}

/// One flight as it appears in `data/flights.json`.
#[derive(Debug, Serialize)]
struct FlightDoc {
    date: NaiveDate,
    aircraft: String,
    model: String,
    total_time: f64,
    pic_time: f64,
    sic_time: f64,
    dual_time: f64,
    xc_time: f64,
    solo_time: f64,
    day_time: f64,
    night_time: f64,
    actual_instrument: f64,
    simulated_instrument: f64,
    day_landings: u32,
    day_fullstop_landings: u32,
    night_landings: u32,
    night_fullstop_landings: u32,
    route: String,
    instructor: Option<String>,
    passengers: Vec<String>,
    notes: String,
}

impl From<&Flight> for FlightDoc {
    fn from(flight: &Flight) -> Self {
        Self {
            date: flight.date,
            aircraft: flight.aircraft.tail_number.clone(),
            model: flight.aircraft.model.clone(),
            total_time: flight.hours.total,
            pic_time: flight.hours.pic,
            sic_time: flight.hours.sic,
            dual_time: flight.hours.dual_received,
            xc_time: flight.hours.cross_country,
            solo_time: flight.hours.solo,
            day_time: flight.hours.day,
            night_time: flight.hours.night,
            actual_instrument: flight.hours.actual_instrument,
            simulated_instrument: flight.hours.simulated_instrument,
            day_landings: flight.landings.day,
            day_fullstop_landings: flight.landings.day_full_stop,
            night_landings: flight.landings.night,
            night_fullstop_landings: flight.landings.night_full_stop,
            route: flight.route.clone(),
            instructor: flight.instructor.as_ref().map(Pilot::full_name),
            passengers: flight.passengers.iter().map(Pilot::full_name).collect(),
            notes: flight.notes.clone(),
        }
    }
}

/// The `data/stats.json` document.
///
/// `as_of` carries day precision rather than a timestamp so that a same-day
/// re-export of unchanged data is byte-identical.
#[derive(Debug, Serialize)]
struct StatsDoc {
    total_times: stats::Totals,
    currency: PassengerCurrency,
    medical: MedicalStatus,
    license: LicenseStatus,
    ir_progress: stats::InstrumentRatingProgress,
    commercial_progress: stats::CommercialProgress,
    instrument_breakdown: stats::InstrumentBreakdown,
    days_since_last_flight: Option<i64>,
    as_of: NaiveDate,
}

/// The `data/charts.json` document.
#[derive(Debug, Serialize)]
struct ChartsDoc {
    monthly_labels: Vec<String>,
    monthly_hours: Vec<f64>,
    cumulative_data: Vec<stats::CumulativePoint>,
    aircraft_breakdown: Vec<stats::AircraftHours>,
}

/// The `data/leaderboards.json` document.
#[derive(Debug, Serialize)]
struct LeaderboardsDoc {
    passengers: Vec<stats::LeaderboardEntry>,
    instructors: Vec<stats::LeaderboardEntry>,
}

/// The `data/aircraft.json` document.
#[derive(Debug, Serialize)]
struct AircraftDoc {
    sel_hours: f64,
    class_breakdown: BTreeMap<String, stats::ClassHours>,
    type_stats: Vec<stats::TypeStatistics>,
    highlights: stats::AircraftHighlights,
    aircraft_breakdown: Vec<stats::AircraftHours>,
}

/// One waypoint of a route in `data/routes.json`.
#[derive(Debug, Clone, Serialize)]
struct WaypointDoc {
    code: String,
    name: String,
    lat: f64,
    lon: f64,
    visit_count: u32,
}

/// One unique route in `data/routes.json`.
#[derive(Debug, Serialize)]
struct RouteDoc {
    name: String,
    waypoints: Vec<WaypointDoc>,
    flight_count: u32,
    distance: f64,
}

/// A fully computed bundle, ready to be written.
struct Bundle {
    index_html: String,
    logbook_html: String,
    flights_json: Vec<u8>,
    stats_json: Vec<u8>,
    charts_json: Vec<u8>,
    leaderboards_json: Vec<u8>,
    aircraft_json: Vec<u8>,
    routes_json: Vec<u8>,
    flight_count: usize,
    route_count: usize,
}

/// Export the logbook as a static site.
///
/// Loads the primary pilot's records, validates them, computes all documents
/// in memory, and writes the bundle to `config.export.output_dir` (or
/// `output_dir` when given). Nothing is written until every document has
/// been computed.
///
/// # Errors
///
/// Returns [`Error::PrimaryPilotMissing`] when the configured pilot does not
/// exist, [`Error::InvalidRecord`] when a flight fails validation, or an
/// I/O error from writing the bundle.
pub fn export(
    storage: &Storage,
    config: &Config,
    output_dir: Option<&Path>,
    as_of: NaiveDate,
) -> Result<ExportReport> {
    let output_dir = output_dir.unwrap_or(&config.export.output_dir);
    info!("Exporting static site to {}", output_dir.display());

    let bundle = compute_bundle(storage, config, as_of)?;
    write_bundle(&bundle, output_dir)?;

    info!(
        "Exported {} flights and {} routes",
        bundle.flight_count, bundle.route_count
    );
    Ok(ExportReport {
        output_dir: output_dir.to_path_buf(),
        flight_count: bundle.flight_count,
        route_count: bundle.route_count,
    })
}

/// Load records and compute every document without touching the filesystem.
fn compute_bundle(storage: &Storage, config: &Config, as_of: NaiveDate) -> Result<Bundle> {
    let pilot_id = config.pilot.primary_id;
    let _pilot = storage
        .get_pilot(pilot_id)?
        .ok_or(Error::PrimaryPilotMissing { id: pilot_id })?;

    let flights = storage.flights_for_pilot(pilot_id)?;
    for flight in &flights {
        flight.validate().map_err(|message| Error::InvalidRecord {
            date: flight.date,
            message,
        })?;
    }
    debug!("Loaded {} flights", flights.len());

    let medicals = storage.medicals_for_pilot(pilot_id)?;
    let licenses = storage.licenses_for_pilot(pilot_id)?;
    let airports = storage.airports_by_code()?;

    let totals = stats::totals(&flights);
    let currency = passenger_currency(&flights, as_of);
    let medical = medical_status(&medicals, as_of);
    let license = license_status(&licenses, as_of);
    let commercial = stats::commercial_progress(&flights);
    let instrument = stats::instrument_rating_progress(&flights);
    let monthly = stats::monthly_breakdown(&flights, as_of, config.export.chart_months);
    let recent = stats::recent_flights(&flights, config.export.recent_flights_limit);
    let passengers = stats::passenger_leaderboard(&flights, config.export.leaderboard_limit);
    let instructors = stats::instructor_leaderboard(&flights, config.export.leaderboard_limit);
    let days_since = stats::days_since_last_flight(&flights, as_of);

    let flight_docs: Vec<FlightDoc> = flights.iter().map(FlightDoc::from).collect();

    let stats_doc = StatsDoc {
        total_times: totals.clone(),
        currency: currency.clone(),
        medical: medical.clone(),
        license: license.clone(),
        ir_progress: instrument.clone(),
        commercial_progress: commercial.clone(),
        instrument_breakdown: stats::instrument_breakdown(&flights),
        days_since_last_flight: days_since,
        as_of,
    };

    let charts_doc = ChartsDoc {
        monthly_labels: monthly.iter().map(|m| m.month.clone()).collect(),
        monthly_hours: monthly.iter().map(|m| m.hours).collect(),
        cumulative_data: stats::cumulative_time_data(&flights),
        aircraft_breakdown: stats::aircraft_breakdown(&flights),
    };

    let leaderboards_doc = LeaderboardsDoc {
        passengers: passengers.clone(),
        instructors: instructors.clone(),
    };

    let aircraft_doc = AircraftDoc {
        sel_hours: stats::sel_total_hours(&flights),
        class_breakdown: stats::aircraft_class_breakdown(&flights),
        type_stats: stats::aircraft_type_statistics(&flights),
        highlights: stats::aircraft_highlights(&flights),
        aircraft_breakdown: stats::aircraft_breakdown(&flights),
    };

    let routes = build_routes(&flights, &airports);

    let index_html = html::render_dashboard(&html::DashboardContext {
        site_title: &config.export.site_title,
        as_of,
        totals: &totals,
        currency: &currency,
        medical: &medical,
        license: &license,
        commercial: &commercial,
        instrument: &instrument,
        days_since_last_flight: days_since,
        recent_flights: &recent,
        passengers: &passengers,
        instructors: &instructors,
    });
    let logbook_html = html::render_logbook(&config.export.site_title, &flights);

    Ok(Bundle {
        index_html,
        logbook_html,
        flights_json: to_json(&flight_docs)?,
        stats_json: to_json(&stats_doc)?,
        charts_json: to_json(&charts_doc)?,
        leaderboards_json: to_json(&leaderboards_doc)?,
        aircraft_json: to_json(&aircraft_doc)?,
        routes_json: to_json(&routes)?,
        flight_count: flight_docs.len(),
        route_count: routes.len(),
    })
}

/// Write a computed bundle to disk.
fn write_bundle(bundle: &Bundle, output_dir: &Path) -> Result<()> {
    let data_dir = output_dir.join("data");
    for dir in [output_dir, data_dir.as_path()] {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(output_dir.join("index.html"), &bundle.index_html)?;
    std::fs::write(output_dir.join("logbook.html"), &bundle.logbook_html)?;
    std::fs::write(data_dir.join("flights.json"), &bundle.flights_json)?;
    std::fs::write(data_dir.join("stats.json"), &bundle.stats_json)?;
    std::fs::write(data_dir.join("charts.json"), &bundle.charts_json)?;
    std::fs::write(data_dir.join("leaderboards.json"), &bundle.leaderboards_json)?;
    std::fs::write(data_dir.join("aircraft.json"), &bundle.aircraft_json)?;
    std::fs::write(data_dir.join("routes.json"), &bundle.routes_json)?;
    // GitHub Pages: skip Jekyll processing.
    std::fs::write(output_dir.join(".nojekyll"), "")?;
    Ok(())
}

/// Serialize to pretty JSON with a trailing newline.
fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Group flights by route string and resolve waypoints against the airport
/// table. Routes whose codes all fail to resolve are dropped; unresolvable
/// codes within an otherwise known route are skipped.
fn build_routes(flights: &[Flight], airports: &HashMap<String, Airport>) -> Vec<RouteDoc> {
    let mut route_counts: BTreeMap<&str, u32> = BTreeMap::new();
    let mut airport_visits: BTreeMap<&str, u32> = BTreeMap::new();

    for flight in flights {
        if flight.route.trim().is_empty() {
            continue;
        }
        *route_counts.entry(flight.route.as_str()).or_insert(0) += 1;

        // Each airport counts once per flight, however many times it
        // appears on the route.
        let unique: BTreeSet<&str> = flight.route_codes().into_iter().collect();
        for code in unique {
            *airport_visits.entry(code).or_insert(0) += 1;
        }
    }

    route_counts
        .into_iter()
        .filter_map(|(route, flight_count)| {
            let waypoints: Vec<WaypointDoc> = route
                .split_whitespace()
                .filter_map(|code| {
                    airports.get(code).map(|airport| WaypointDoc {
                        code: airport.code.clone(),
                        name: airport.name.clone(),
                        lat: airport.latitude,
                        lon: airport.longitude,
                        visit_count: airport_visits.get(code).copied().unwrap_or(0),
                    })
                })
                .collect();
            if waypoints.is_empty() {
                return None;
            }

            let distance: f64 = waypoints
                .windows(2)
                .map(|pair| haversine_nm(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
                .sum();

            Some(RouteDoc {
                name: route.to_string(),
                waypoints,
                flight_count,
                distance: stats::round1(distance),
            })
        })
        .collect()
}

/// Great-circle distance between two points, in nautical miles.
fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_NM
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aircraft, AircraftClass, FlightHours, Landings, Role};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded_storage() -> Storage {
        let mut storage = Storage::open_in_memory().unwrap();
        storage
            .insert_pilot(&Pilot::new("Jane", "Doe", Role::Pilot))
            .unwrap();
        storage
            .insert_aircraft(&Aircraft::new(
                "N12345",
                "C172",
                AircraftClass::SingleEngineLand,
            ))
            .unwrap();
        storage
            .replace_airports(&[
                Airport {
                    id: None,
                    code: "KBFI".to_string(),
                    name: "Boeing Field".to_string(),
                    latitude: 47.53,
                    longitude: -122.3,
                    country: "US".to_string(),
                    municipality: "Seattle".to_string(),
                },
                Airport {
                    id: None,
                    code: "KRNT".to_string(),
                    name: "Renton Municipal".to_string(),
                    latitude: 47.49,
                    longitude: -122.21,
                    country: "US".to_string(),
                    municipality: "Renton".to_string(),
                },
            ])
            .unwrap();
        storage
    }

    fn sample_flight(on: NaiveDate) -> Flight {
        Flight {
            id: None,
            date: on,
            aircraft: Aircraft::new("N12345", "C172", AircraftClass::SingleEngineLand),
            route: "KBFI KRNT KBFI".to_string(),
            hours: FlightHours {
                total: 1.5,
                pic: 1.5,
                day: 1.5,
                ..FlightHours::default()
            },
            landings: Landings {
                day: 3,
                ..Landings::default()
            },
            instructor: None,
            passengers: vec![],
            notes: String::new(),
        }
    }

    #[test]
    fn test_export_writes_all_files() {
        let storage = seeded_storage();
        storage.insert_flight(1, &sample_flight(date(2024, 5, 1))).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();

        let report = export(&storage, &config, Some(dir.path()), date(2024, 6, 1)).unwrap();
        assert_eq!(report.flight_count, 1);
        assert_eq!(report.route_count, 1);

        for file in ["index.html", "logbook.html", ".nojekyll"] {
            assert!(dir.path().join(file).exists(), "missing {file}");
        }
        for file in [
            "flights.json",
            "stats.json",
            "charts.json",
            "leaderboards.json",
            "aircraft.json",
            "routes.json",
        ] {
            assert!(dir.path().join("data").join(file).exists(), "missing {file}");
        }
    }

    #[test]
    fn test_export_idempotent() {
        let storage = seeded_storage();
        storage.insert_flight(1, &sample_flight(date(2024, 5, 1))).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let as_of = date(2024, 6, 1);

        export(&storage, &config, Some(dir.path()), as_of).unwrap();
        let first = std::fs::read(dir.path().join("data/stats.json")).unwrap();
        let first_index = std::fs::read(dir.path().join("index.html")).unwrap();

        export(&storage, &config, Some(dir.path()), as_of).unwrap();
        let second = std::fs::read(dir.path().join("data/stats.json")).unwrap();
        let second_index = std::fs::read(dir.path().join("index.html")).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_index, second_index);
    }

    #[test]
    fn test_export_missing_pilot() {
        let storage = Storage::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();

        let result = export(&storage, &config, Some(dir.path()), date(2024, 6, 1));
        assert!(matches!(result, Err(Error::PrimaryPilotMissing { id: 1 })));
        // Nothing was written.
        assert!(!dir.path().join("index.html").exists());
    }

    #[test]
    fn test_export_invalid_flight_aborts_before_writing() {
        let storage = seeded_storage();
        let mut bad = sample_flight(date(2024, 5, 1));
        bad.hours.pic = 5.0; // exceeds total, caught at export time
        storage.insert_flight(1, &bad).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("site");
        let config = Config::default();

        let result = export(&storage, &config, Some(&out), date(2024, 6, 1));
        assert!(matches!(result, Err(Error::InvalidRecord { .. })));
        assert!(!out.exists());
    }

    #[test]
    fn test_flights_json_shape() {
        let storage = seeded_storage();
        storage
            .insert_pilot(&Pilot::new("Pat", "Pax", Role::Passenger))
            .unwrap();
        let mut flight = sample_flight(date(2024, 5, 1));
        flight.passengers = vec![Pilot::new("Pat", "Pax", Role::Passenger)];
        storage.insert_flight(1, &flight).unwrap();

        let dir = tempfile::tempdir().unwrap();
        export(&storage, &Config::default(), Some(dir.path()), date(2024, 6, 1)).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("data/flights.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &parsed[0];
        assert_eq!(first["date"], "2024-05-01");
        assert_eq!(first["aircraft"], "N12345");
        assert_eq!(first["route"], "KBFI KRNT KBFI");
        assert_eq!(first["passengers"][0], "Pat Pax");
        assert_eq!(first["day_landings"], 3);
        assert!(first["instructor"].is_null());
    }

    #[test]
    fn test_stats_json_day_precision() {
        let storage = seeded_storage();
        let dir = tempfile::tempdir().unwrap();
        export(&storage, &Config::default(), Some(dir.path()), date(2024, 6, 1)).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("data/stats.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["as_of"], "2024-06-01");
        assert_eq!(parsed["medical"]["status"], "none");
        assert_eq!(parsed["currency"]["day"]["current"], false);
    }

    #[test]
    fn test_routes_json_distance_and_counts() {
        let storage = seeded_storage();
        storage.insert_flight(1, &sample_flight(date(2024, 5, 1))).unwrap();
        storage.insert_flight(1, &sample_flight(date(2024, 5, 2))).unwrap();

        let dir = tempfile::tempdir().unwrap();
        export(&storage, &Config::default(), Some(dir.path()), date(2024, 6, 1)).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("data/routes.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        let route = &parsed[0];
        assert_eq!(route["name"], "KBFI KRNT KBFI");
        assert_eq!(route["flight_count"], 2);
        assert_eq!(route["waypoints"].as_array().unwrap().len(), 3);
        // KBFI appears twice on the route but each flight visits it once.
        assert_eq!(route["waypoints"][0]["visit_count"], 2);
        // Out and back: roughly 4 nm each way.
        let distance = route["distance"].as_f64().unwrap();
        assert!(distance > 7.0 && distance < 10.0, "distance {distance}");
    }

    #[test]
    fn test_route_with_unknown_airports_dropped() {
        let storage = seeded_storage();
        let mut flight = sample_flight(date(2024, 5, 1));
        flight.route = "ZZZZ YYYY".to_string();
        storage.insert_flight(1, &flight).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let report =
            export(&storage, &Config::default(), Some(dir.path()), date(2024, 6, 1)).unwrap();
        assert_eq!(report.route_count, 0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Boeing Field to Renton Municipal is roughly 4 nautical miles.
        let distance = haversine_nm(47.53, -122.3, 47.49, -122.21);
        assert!(distance > 3.0 && distance < 5.0, "distance {distance}");
        // Zero distance to itself.
        assert!(haversine_nm(47.53, -122.3, 47.53, -122.3).abs() < 1e-9);
    }

    #[test]
    fn test_export_empty_logbook() {
        let storage = seeded_storage();
        let dir = tempfile::tempdir().unwrap();

        let report =
            export(&storage, &Config::default(), Some(dir.path()), date(2024, 6, 1)).unwrap();
        assert_eq!(report.flight_count, 0);
        assert_eq!(report.route_count, 0);

        let raw = std::fs::read_to_string(dir.path().join("data/flights.json")).unwrap();
        assert_eq!(raw.trim(), "[]");
    }
}
