//! Logbook statistics.
//!
//! Pure aggregation over flight records: column totals, chart series,
//! leaderboards, per-aircraft figures, and certificate-requirement progress.
//! The exporter serializes these structures directly, so field names here
//! are the JSON contract of the static site.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::{AircraftClass, Flight, Role};

/// Hours required for a commercial certificate.
const COMMERCIAL_TOTAL_HOURS: f64 = 250.0;
/// PIC hours required for a commercial certificate.
const COMMERCIAL_PIC_HOURS: f64 = 100.0;
/// Cross-country PIC hours required for commercial and instrument ratings.
const REQUIRED_XC_PIC_HOURS: f64 = 50.0;
/// Instrument hours required for an instrument rating.
const INSTRUMENT_RATING_HOURS: f64 = 40.0;
/// Simulated instrument hours creditable toward the instrument rating.
const MAX_CREDITABLE_SIMULATED: f64 = 20.0;

/// Round to one decimal place, the precision of a logbook column.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregated totals for every logbook column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    /// Total flight time.
    pub total_time: f64,
    /// Pilot-in-command time.
    pub pic_time: f64,
    /// Second-in-command time.
    pub sic_time: f64,
    /// Dual instruction received.
    pub dual_time: f64,
    /// Cross-country time.
    pub xc_time: f64,
    /// Day time.
    pub day_time: f64,
    /// Night time.
    pub night_time: f64,
    /// Actual instrument time.
    pub actual_instrument: f64,
    /// Simulated instrument time.
    pub simulated_instrument: f64,
    /// Day landings, touch-and-go column only.
    pub day_landings: u32,
    /// Night landings, touch-and-go column only.
    pub night_landings: u32,
    /// All landings across the four columns.
    pub total_landings: u32,
}

/// Sum every hour and landing column.
#[must_use]
pub fn totals(flights: &[Flight]) -> Totals {
    let mut sums = Totals {
        total_time: 0.0,
        pic_time: 0.0,
        sic_time: 0.0,
        dual_time: 0.0,
        xc_time: 0.0,
        day_time: 0.0,
        night_time: 0.0,
        actual_instrument: 0.0,
        simulated_instrument: 0.0,
        day_landings: 0,
        night_landings: 0,
        total_landings: 0,
    };

    for flight in flights {
        sums.total_time += flight.hours.total;
        sums.pic_time += flight.hours.pic;
        sums.sic_time += flight.hours.sic;
        sums.dual_time += flight.hours.dual_received;
        sums.xc_time += flight.hours.cross_country;
        sums.day_time += flight.hours.day;
        sums.night_time += flight.hours.night;
        sums.actual_instrument += flight.hours.actual_instrument;
        sums.simulated_instrument += flight.hours.simulated_instrument;
        sums.day_landings += flight.landings.day;
        sums.night_landings += flight.landings.night;
        sums.total_landings += flight.landings.total();
    }

    sums.total_time = round1(sums.total_time);
    sums.pic_time = round1(sums.pic_time);
    sums.sic_time = round1(sums.sic_time);
    sums.dual_time = round1(sums.dual_time);
    sums.xc_time = round1(sums.xc_time);
    sums.day_time = round1(sums.day_time);
    sums.night_time = round1(sums.night_time);
    sums.actual_instrument = round1(sums.actual_instrument);
    sums.simulated_instrument = round1(sums.simulated_instrument);
    sums
}

/// One bar in the monthly-hours chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyHours {
    /// Month label, e.g. "Jun 2024".
    pub month: String,
    /// Hours flown that month.
    pub hours: f64,
}

/// Hours per month for the trailing `months` months, zero-filled.
///
/// The window ends in the month of `as_of` and includes months with no
/// flights so the chart axis stays continuous.
#[must_use]
pub fn monthly_breakdown(flights: &[Flight], as_of: NaiveDate, months: u32) -> Vec<MonthlyHours> {
    let end_index = month_index(as_of);
    let months = i32::try_from(months.max(1)).unwrap_or(12);
    let start_index = end_index - (months - 1);

    let mut hours_by_month: BTreeMap<i32, f64> = BTreeMap::new();
    for flight in flights {
        let index = month_index(flight.date);
        if index >= start_index && index <= end_index {
            *hours_by_month.entry(index).or_insert(0.0) += flight.hours.total;
        }
    }

    (start_index..=end_index)
        .map(|index| MonthlyHours {
            month: month_label(index),
            hours: round1(hours_by_month.get(&index).copied().unwrap_or(0.0)),
        })
        .collect()
}

/// Months since year zero, for month arithmetic.
fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + i32::try_from(date.month0()).unwrap_or(0)
}

/// Label for a month index, e.g. "Jun 2024".
fn month_label(index: i32) -> String {
    let year = index.div_euclid(12);
    let month0 = index.rem_euclid(12);
    #[allow(clippy::cast_sign_loss)]
    let date = NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1)
        .unwrap_or(NaiveDate::MIN);
    date.format("%b %Y").to_string()
}

/// Actual versus simulated instrument time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentBreakdown {
    /// Actual instrument time.
    pub actual: f64,
    /// Simulated (hood) instrument time.
    pub simulated: f64,
    /// Combined instrument time.
    pub total: f64,
}

/// Split instrument time into actual and simulated.
#[must_use]
pub fn instrument_breakdown(flights: &[Flight]) -> InstrumentBreakdown {
    let actual: f64 = flights.iter().map(|f| f.hours.actual_instrument).sum();
    let simulated: f64 = flights.iter().map(|f| f.hours.simulated_instrument).sum();
    InstrumentBreakdown {
        actual: round1(actual),
        simulated: round1(simulated),
        total: round1(actual + simulated),
    }
}

/// Hours flown in one aircraft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftHours {
    /// Registration.
    pub tail_number: String,
    /// Type designator.
    pub model: String,
    /// Hours flown in this aircraft.
    pub hours: f64,
    /// Departure airport of the most recent flight, as a proxy for where
    /// the aircraft is based.
    pub location: Option<String>,
}

/// Hours per aircraft, most flown first.
#[must_use]
pub fn aircraft_breakdown(flights: &[Flight]) -> Vec<AircraftHours> {
    // Keyed by tail number; tracks the date of the newest flight seen so the
    // location comes from the most recent one.
    let mut by_tail: BTreeMap<String, (AircraftHours, NaiveDate)> = BTreeMap::new();

    for flight in flights {
        let first_code = flight.route_codes().first().map(|c| (*c).to_string());
        let entry = by_tail
            .entry(flight.aircraft.tail_number.clone())
            .or_insert_with(|| {
                (
                    AircraftHours {
                        tail_number: flight.aircraft.tail_number.clone(),
                        model: flight.aircraft.model.clone(),
                        hours: 0.0,
                        location: None,
                    },
                    NaiveDate::MIN,
                )
            });
        entry.0.hours += flight.hours.total;
        if flight.date >= entry.1 {
            entry.1 = flight.date;
            if first_code.is_some() {
                entry.0.location = first_code;
            }
        }
    }

    let mut breakdown: Vec<AircraftHours> = by_tail
        .into_values()
        .map(|(mut aircraft, _)| {
            aircraft.hours = round1(aircraft.hours);
            aircraft
        })
        .collect();
    breakdown.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.tail_number.cmp(&b.tail_number))
    });
    breakdown
}

/// A recent-flights table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentFlight {
    /// Date of the flight.
    pub date: NaiveDate,
    /// Aircraft registration.
    pub tail_number: String,
    /// Aircraft type designator.
    pub model: String,
    /// Route flown.
    pub route: String,
    /// Total time for the flight.
    pub total_time: f64,
    /// Day landings including full stops.
    pub day_landings: u32,
    /// Night landings including full stops.
    pub night_landings: u32,
}

/// The most recent flights, newest first.
///
/// Assumes `flights` is already ordered newest first, as the storage layer
/// returns them.
#[must_use]
pub fn recent_flights(flights: &[Flight], limit: usize) -> Vec<RecentFlight> {
    flights
        .iter()
        .take(limit)
        .map(|flight| RecentFlight {
            date: flight.date,
            tail_number: flight.aircraft.tail_number.clone(),
            model: flight.aircraft.model.clone(),
            route: flight.route.clone(),
            total_time: round1(flight.hours.total),
            day_landings: flight.landings.day + flight.landings.day_full_stop,
            night_landings: flight.landings.night + flight.landings.night_full_stop,
        })
        .collect()
}

/// Days since the most recent flight, `None` for an empty logbook.
#[must_use]
pub fn days_since_last_flight(flights: &[Flight], as_of: NaiveDate) -> Option<i64> {
    let last = flights.iter().map(|f| f.date).max()?;
    Some((as_of - last).num_days())
}

/// One point in the cumulative-hours line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    /// Date of the flight this point lands on.
    pub date: NaiveDate,
    /// Running total time.
    pub total: f64,
    /// Running PIC time.
    pub pic: f64,
    /// Running dual received.
    pub dual: f64,
    /// Running instrument time, actual plus simulated.
    pub instrument: f64,
}

/// Running column totals in chronological order, one point per flight.
#[must_use]
pub fn cumulative_time_data(flights: &[Flight]) -> Vec<CumulativePoint> {
    let mut ordered: Vec<&Flight> = flights.iter().collect();
    ordered.sort_by_key(|f| (f.date, f.id));

    let mut total = 0.0;
    let mut pic = 0.0;
    let mut dual = 0.0;
    let mut instrument = 0.0;

    ordered
        .into_iter()
        .map(|flight| {
            total += flight.hours.total;
            pic += flight.hours.pic;
            dual += flight.hours.dual_received;
            instrument += flight.hours.actual_instrument + flight.hours.simulated_instrument;
            CumulativePoint {
                date: flight.date,
                total: round1(total),
                pic: round1(pic),
                dual: round1(dual),
                instrument: round1(instrument),
            }
        })
        .collect()
}

/// Cross-country PIC time: XC hours on flights logging both XC and PIC time.
#[must_use]
pub fn xc_pic_time(flights: &[Flight]) -> f64 {
    let sum: f64 = flights
        .iter()
        .filter(|f| f.hours.cross_country > 0.0 && f.hours.pic > 0.0)
        .map(|f| f.hours.cross_country)
        .sum();
    round1(sum)
}

/// Progress toward one hour requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementProgress {
    /// Hours logged.
    pub current: f64,
    /// Hours required.
    pub required: f64,
    /// Hours still needed, zero once met.
    pub remaining: f64,
    /// Percent complete, capped at 100.
    pub percentage: f64,
}

impl RequirementProgress {
    fn new(current: f64, required: f64) -> Self {
        Self {
            current: round1(current),
            required,
            remaining: round1((required - current).max(0.0)),
            percentage: round1((current / required * 100.0).min(100.0)),
        }
    }
}

/// Progress toward the commercial certificate hour requirements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommercialProgress {
    /// 250 hours total time.
    pub total_time: RequirementProgress,
    /// 100 hours PIC.
    pub pic_time: RequirementProgress,
    /// 50 hours cross-country PIC.
    pub xc_pic_time: RequirementProgress,
}

/// Evaluate the commercial certificate hour requirements.
#[must_use]
pub fn commercial_progress(flights: &[Flight]) -> CommercialProgress {
    let sums = totals(flights);
    CommercialProgress {
        total_time: RequirementProgress::new(sums.total_time, COMMERCIAL_TOTAL_HOURS),
        pic_time: RequirementProgress::new(sums.pic_time, COMMERCIAL_PIC_HOURS),
        xc_pic_time: RequirementProgress::new(xc_pic_time(flights), REQUIRED_XC_PIC_HOURS),
    }
}

/// Progress toward the instrument rating hour requirements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentRatingProgress {
    /// Actual instrument hours.
    pub actual: f64,
    /// Simulated instrument hours as logged.
    pub simulated: f64,
    /// Simulated hours creditable, capped at 20.
    pub creditable_simulated: f64,
    /// Actual plus creditable simulated.
    pub creditable_total: f64,
    /// Hours still needed toward 40.
    pub remaining: f64,
    /// Percent complete, capped at 100.
    pub percentage: f64,
    /// Cross-country PIC progress.
    pub xc_pic: RequirementProgress,
}

/// Evaluate the instrument rating hour requirements.
///
/// At most 20 of the 40 required hours may be simulated.
#[must_use]
pub fn instrument_rating_progress(flights: &[Flight]) -> InstrumentRatingProgress {
    let breakdown = instrument_breakdown(flights);
    let creditable_simulated = breakdown.simulated.min(MAX_CREDITABLE_SIMULATED);
    let creditable_total = breakdown.actual + creditable_simulated;

    InstrumentRatingProgress {
        actual: breakdown.actual,
        simulated: breakdown.simulated,
        creditable_simulated: round1(creditable_simulated),
        creditable_total: round1(creditable_total),
        remaining: round1((INSTRUMENT_RATING_HOURS - creditable_total).max(0.0)),
        percentage: round1((creditable_total / INSTRUMENT_RATING_HOURS * 100.0).min(100.0)),
        xc_pic: RequirementProgress::new(xc_pic_time(flights), REQUIRED_XC_PIC_HOURS),
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// Person's display name.
    pub name: String,
    /// Role on the flights counted.
    pub role: Role,
    /// Flights shared with the logbook owner.
    pub flight_count: u32,
    /// Hours shared with the logbook owner.
    pub total_time: f64,
}

/// Passengers ranked by flights shared, then hours.
#[must_use]
pub fn passenger_leaderboard(flights: &[Flight], limit: usize) -> Vec<LeaderboardEntry> {
    let mut stats: BTreeMap<String, LeaderboardEntry> = BTreeMap::new();
    for flight in flights {
        for passenger in &flight.passengers {
            if passenger.role != Role::Passenger {
                continue;
            }
            let entry = stats
                .entry(passenger.full_name())
                .or_insert_with(|| LeaderboardEntry {
                    name: passenger.full_name(),
                    role: passenger.role,
                    flight_count: 0,
                    total_time: 0.0,
                });
            entry.flight_count += 1;
            entry.total_time += flight.hours.total;
        }
    }
    rank(stats, limit)
}

/// Instructors and examiners ranked by flights given, then hours.
#[must_use]
pub fn instructor_leaderboard(flights: &[Flight], limit: usize) -> Vec<LeaderboardEntry> {
    let mut stats: BTreeMap<String, LeaderboardEntry> = BTreeMap::new();
    for flight in flights {
        let Some(instructor) = &flight.instructor else {
            continue;
        };
        if !matches!(instructor.role, Role::Instructor | Role::Examiner) {
            continue;
        }
        let entry = stats
            .entry(instructor.full_name())
            .or_insert_with(|| LeaderboardEntry {
                name: instructor.full_name(),
                role: instructor.role,
                flight_count: 0,
                total_time: 0.0,
            });
        entry.flight_count += 1;
        entry.total_time += flight.hours.total;
    }
    rank(stats, limit)
}

/// Order leaderboard entries and truncate. Ties fall back to name so the
/// output is stable across runs.
fn rank(stats: BTreeMap<String, LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = stats
        .into_values()
        .map(|mut entry| {
            entry.total_time = round1(entry.total_time);
            entry
        })
        .collect();
    entries.sort_by(|a, b| {
        b.flight_count
            .cmp(&a.flight_count)
            .then_with(|| {
                b.total_time
                    .partial_cmp(&a.total_time)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.name.cmp(&b.name))
    });
    entries.truncate(limit);
    entries
}

/// Total hours in single engine land aircraft.
#[must_use]
pub fn sel_total_hours(flights: &[Flight]) -> f64 {
    let sum: f64 = flights
        .iter()
        .filter(|f| f.aircraft.class == AircraftClass::SingleEngineLand)
        .map(|f| f.hours.total)
        .sum();
    round1(sum)
}

/// Hours and share of total for one aircraft class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassHours {
    /// Hours in this class.
    pub hours: f64,
    /// Flights in this class.
    pub flight_count: u32,
    /// Share of total hours, in percent.
    pub percentage: f64,
}

/// Hours by aircraft class, keyed by the class display name.
#[must_use]
pub fn aircraft_class_breakdown(flights: &[Flight]) -> BTreeMap<String, ClassHours> {
    let mut raw: BTreeMap<String, (f64, u32)> = BTreeMap::new();
    for flight in flights {
        let entry = raw.entry(flight.aircraft.class.to_string()).or_insert((0.0, 0));
        entry.0 += flight.hours.total;
        entry.1 += 1;
    }

    let total_hours: f64 = raw.values().map(|(hours, _)| hours).sum();
    raw.into_iter()
        .map(|(class, (hours, flight_count))| {
            let percentage = if total_hours > 0.0 {
                hours / total_hours * 100.0
            } else {
                0.0
            };
            (
                class,
                ClassHours {
                    hours: round1(hours),
                    flight_count,
                    percentage: round1(percentage),
                },
            )
        })
        .collect()
}

/// Per-type figures for the aircraft page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeStatistics {
    /// Type designator, e.g. "C172".
    pub model: String,
    /// Aircraft class.
    pub class: AircraftClass,
    /// Hours in this type.
    pub hours: f64,
    /// Flights in this type.
    pub flight_count: u32,
}

/// Hours and flight counts per aircraft type, most flown first.
#[must_use]
pub fn aircraft_type_statistics(flights: &[Flight]) -> Vec<TypeStatistics> {
    let mut by_type: BTreeMap<(String, AircraftClass), (f64, u32)> = BTreeMap::new();
    for flight in flights {
        let entry = by_type
            .entry((flight.aircraft.model.clone(), flight.aircraft.class))
            .or_insert((0.0, 0));
        entry.0 += flight.hours.total;
        entry.1 += 1;
    }

    let mut stats: Vec<TypeStatistics> = by_type
        .into_iter()
        .map(|((model, class), (hours, flight_count))| TypeStatistics {
            model,
            class,
            hours: round1(hours),
            flight_count,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.model.cmp(&b.model))
    });
    stats
}

/// Most and least flown aircraft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftHighlights {
    /// The aircraft with the most hours.
    pub most_flown: Option<AircraftHours>,
    /// The aircraft with the fewest hours.
    pub least_flown: Option<AircraftHours>,
    /// Number of distinct aircraft flown.
    pub total_aircraft: usize,
}

/// Pick out the most and least flown aircraft.
#[must_use]
pub fn aircraft_highlights(flights: &[Flight]) -> AircraftHighlights {
    let breakdown = aircraft_breakdown(flights);
    AircraftHighlights {
        most_flown: breakdown.first().cloned(),
        least_flown: breakdown.last().cloned(),
        total_aircraft: breakdown.len(),
    }
}
