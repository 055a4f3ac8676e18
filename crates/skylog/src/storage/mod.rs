//! Storage layer for skylog.
//!
//! `SQLite`-based persistence for the logbook: pilots, aircraft, flights,
//! medical certificates, licenses, and the airport database. All reads the
//! exporter depends on live here; the exporter itself never writes.

pub mod migrations;
pub mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{
    Aircraft, AircraftClass, Airport, Flight, FlightHours, Landings, License, Medical,
    MedicalClass, Pilot, Role,
};

/// Storage engine for the logbook.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a logbook database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Pilots ===

    /// Insert a pilot, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_pilot(&self, pilot: &Pilot) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO pilots (first_name, last_name, role) VALUES (?1, ?2, ?3)",
            params![pilot.first_name, pilot.last_name, pilot.role.to_string()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted pilot {} with id {}", pilot.full_name(), id);
        Ok(id)
    }

    /// Get a pilot by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_pilot(&self, id: i64) -> Result<Option<Pilot>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, first_name, last_name, role FROM pilots WHERE id = ?1",
                [id],
                Self::row_to_pilot,
            )
            .optional()?;
        Ok(result)
    }

    /// Find a pilot by display name, "First Last".
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_pilot_by_name(&self, full_name: &str) -> Result<Option<Pilot>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, first_name, last_name, role FROM pilots \
                 WHERE first_name || ' ' || last_name = ?1",
                [full_name],
                Self::row_to_pilot,
            )
            .optional()?;
        Ok(result)
    }

    /// Count pilots.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_pilots(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM pilots", [], |row| row.get(0))?;
        Ok(count)
    }

    // === Aircraft ===

    /// Insert an aircraft, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// tail number already exists.
    pub fn insert_aircraft(&self, aircraft: &Aircraft) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO aircraft (tail_number, model, class) VALUES (?1, ?2, ?3)",
            params![
                aircraft.tail_number,
                aircraft.model,
                aircraft.class.to_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Look up an aircraft by tail number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_aircraft_by_tail(&self, tail_number: &str) -> Result<Option<Aircraft>> {
        let result = self
            .conn
            .query_row(
                "SELECT id, tail_number, model, class FROM aircraft WHERE tail_number = ?1",
                [tail_number],
                Self::row_to_aircraft,
            )
            .optional()?;
        Ok(result)
    }

    /// Count aircraft.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_aircraft(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM aircraft", [], |row| row.get(0))?;
        Ok(count)
    }

    // === Flights ===

    /// Insert a flight for the given pilot, returning the assigned id.
    ///
    /// The aircraft is resolved by tail number; the instructor and any
    /// passengers are resolved by display name. All referenced records must
    /// already exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] when a referenced aircraft or person
    /// does not exist, or a database error.
    pub fn insert_flight(&self, pilot_id: i64, flight: &Flight) -> Result<i64> {
        let aircraft = self
            .get_aircraft_by_tail(&flight.aircraft.tail_number)?
            .ok_or_else(|| Error::not_found("aircraft", flight.aircraft.tail_number.clone()))?;
        let aircraft_id = aircraft
            .id
            .ok_or_else(|| Error::internal("aircraft row missing id"))?;

        let instructor_id = match &flight.instructor {
            Some(instructor) => {
                let name = instructor.full_name();
                let found = self
                    .find_pilot_by_name(&name)?
                    .ok_or_else(|| Error::not_found("pilot", name))?;
                found.id
            }
            None => None,
        };

        let mut passenger_ids = Vec::with_capacity(flight.passengers.len());
        for passenger in &flight.passengers {
            let name = passenger.full_name();
            let found = self
                .find_pilot_by_name(&name)?
                .ok_or_else(|| Error::not_found("pilot", name.clone()))?;
            passenger_ids.push(
                found
                    .id
                    .ok_or_else(|| Error::internal("pilot row missing id"))?,
            );
        }

        self.conn.execute(
            r"
            INSERT INTO flights (
                pilot_id, date, aircraft_id, route,
                total_time, pic_time, sic_time, dual_received, xc_time, solo_time,
                day_time, night_time, actual_instrument, simulated_instrument,
                day_landings, day_fullstop_landings, night_landings, night_fullstop_landings,
                instructor_id, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                      ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            ",
            params![
                pilot_id,
                flight.date.to_string(),
                aircraft_id,
                flight.route,
                flight.hours.total,
                flight.hours.pic,
                flight.hours.sic,
                flight.hours.dual_received,
                flight.hours.cross_country,
                flight.hours.solo,
                flight.hours.day,
                flight.hours.night,
                flight.hours.actual_instrument,
                flight.hours.simulated_instrument,
                flight.landings.day,
                flight.landings.day_full_stop,
                flight.landings.night,
                flight.landings.night_full_stop,
                instructor_id,
                flight.notes,
            ],
        )?;
        let flight_id = self.conn.last_insert_rowid();

        for passenger_id in passenger_ids {
            self.conn.execute(
                "INSERT INTO flight_passengers (flight_id, pilot_id) VALUES (?1, ?2)",
                params![flight_id, passenger_id],
            )?;
        }

        debug!("Inserted flight {} on {}", flight_id, flight.date);
        Ok(flight_id)
    }

    /// All flights for a pilot, newest first, with aircraft, instructor, and
    /// passengers resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn flights_for_pilot(&self, pilot_id: i64) -> Result<Vec<Flight>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT f.id, f.date, f.route,
                   f.total_time, f.pic_time, f.sic_time, f.dual_received, f.xc_time, f.solo_time,
                   f.day_time, f.night_time, f.actual_instrument, f.simulated_instrument,
                   f.day_landings, f.day_fullstop_landings, f.night_landings, f.night_fullstop_landings,
                   f.notes,
                   a.id, a.tail_number, a.model, a.class,
                   i.id, i.first_name, i.last_name, i.role
            FROM flights f
            JOIN aircraft a ON a.id = f.aircraft_id
            LEFT JOIN pilots i ON i.id = f.instructor_id
            WHERE f.pilot_id = ?1
            ORDER BY f.date DESC, f.id DESC
            ",
        )?;

        let mut flights = stmt
            .query_map([pilot_id], Self::row_to_flight)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut passenger_stmt = self.conn.prepare(
            r"
            SELECT p.id, p.first_name, p.last_name, p.role
            FROM flight_passengers fp
            JOIN pilots p ON p.id = fp.pilot_id
            WHERE fp.flight_id = ?1
            ORDER BY p.id
            ",
        )?;
        for flight in &mut flights {
            if let Some(id) = flight.id {
                flight.passengers = passenger_stmt
                    .query_map([id], Self::row_to_pilot)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
            }
        }

        Ok(flights)
    }

    /// Count flights for a pilot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_flights(&self, pilot_id: i64) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM flights WHERE pilot_id = ?1",
            [pilot_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // === Medicals ===

    /// Insert a medical certificate for the given pilot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_medical(&self, pilot_id: i64, medical: &Medical) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO medicals (pilot_id, class, examination_date, examiner_name) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                pilot_id,
                medical.class.number(),
                medical.examination_date.to_string(),
                medical.examiner_name,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Medical certificates for a pilot, most recent examination first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn medicals_for_pilot(&self, pilot_id: i64) -> Result<Vec<Medical>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, class, examination_date, examiner_name FROM medicals \
             WHERE pilot_id = ?1 ORDER BY examination_date DESC, id DESC",
        )?;
        let medicals = stmt
            .query_map([pilot_id], Self::row_to_medical)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(medicals)
    }

    // === Licenses ===

    /// Insert a license for the given pilot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_license(&self, pilot_id: i64, license: &License) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO licenses (pilot_id, name, number, expiration) VALUES (?1, ?2, ?3, ?4)",
            params![
                pilot_id,
                license.name,
                license.number,
                license.expiration.to_string(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Licenses for a pilot, latest expiration first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn licenses_for_pilot(&self, pilot_id: i64) -> Result<Vec<License>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, number, expiration FROM licenses \
             WHERE pilot_id = ?1 ORDER BY expiration DESC, id DESC",
        )?;
        let licenses = stmt
            .query_map([pilot_id], Self::row_to_license)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(licenses)
    }

    // === Airports ===

    /// Replace the airport table with a new dataset.
    ///
    /// Returns the number of rows deleted before the import.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_airports(&mut self, airports: &[Airport]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM airports", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO airports (code, name, latitude, longitude, country, municipality) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for airport in airports {
                stmt.execute(params![
                    airport.code,
                    airport.name,
                    airport.latitude,
                    airport.longitude,
                    airport.country,
                    airport.municipality,
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "Replaced {} airport records with {}",
            deleted,
            airports.len()
        );
        Ok(deleted)
    }

    /// All airports, keyed by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn airports_by_code(&self) -> Result<HashMap<String, Airport>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, name, latitude, longitude, country, municipality FROM airports",
        )?;
        let airports = stmt
            .query_map([], Self::row_to_airport)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(airports
            .into_iter()
            .map(|airport| (airport.code.clone(), airport))
            .collect())
    }

    /// Count airports.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_airports(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM airports", [], |row| row.get(0))?;
        Ok(count)
    }

    // === Row mapping ===

    fn row_to_pilot(row: &rusqlite::Row) -> rusqlite::Result<Pilot> {
        let role_str: String = row.get(3)?;
        let role = role_str.parse().unwrap_or_else(|_| {
            warn!("Unknown pilot role '{}', defaulting to passenger", role_str);
            Role::Passenger
        });
        Ok(Pilot {
            id: Some(row.get(0)?),
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            role,
        })
    }

    fn row_to_aircraft(row: &rusqlite::Row) -> rusqlite::Result<Aircraft> {
        let class_str: String = row.get(3)?;
        let class = class_str.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown aircraft class '{}', defaulting to single engine land",
                class_str
            );
            AircraftClass::SingleEngineLand
        });
        Ok(Aircraft {
            id: Some(row.get(0)?),
            tail_number: row.get(1)?,
            model: row.get(2)?,
            class,
        })
    }

    fn row_to_flight(row: &rusqlite::Row) -> rusqlite::Result<Flight> {
        let date = parse_date(row, 1)?;

        let class_str: String = row.get(21)?;
        let class = class_str
            .parse()
            .unwrap_or(AircraftClass::SingleEngineLand);
        let aircraft = Aircraft {
            id: Some(row.get(18)?),
            tail_number: row.get(19)?,
            model: row.get(20)?,
            class,
        };

        let instructor_id: Option<i64> = row.get(22)?;
        let instructor = match instructor_id {
            Some(id) => {
                let role_str: String = row.get(25)?;
                Some(Pilot {
                    id: Some(id),
                    first_name: row.get(23)?,
                    last_name: row.get(24)?,
                    role: role_str.parse().unwrap_or(Role::Instructor),
                })
            }
            None => None,
        };

        Ok(Flight {
            id: Some(row.get(0)?),
            date,
            aircraft,
            route: row.get(2)?,
            hours: FlightHours {
                total: row.get(3)?,
                pic: row.get(4)?,
                sic: row.get(5)?,
                dual_received: row.get(6)?,
                cross_country: row.get(7)?,
                solo: row.get(8)?,
                day: row.get(9)?,
                night: row.get(10)?,
                actual_instrument: row.get(11)?,
                simulated_instrument: row.get(12)?,
            },
            landings: Landings {
                day: row.get(13)?,
                day_full_stop: row.get(14)?,
                night: row.get(15)?,
                night_full_stop: row.get(16)?,
            },
            instructor,
            passengers: Vec::new(),
            notes: row.get(17)?,
        })
    }

    fn row_to_medical(row: &rusqlite::Row) -> rusqlite::Result<Medical> {
        let class_number: u8 = row.get(1)?;
        let class = MedicalClass::from_number(class_number).unwrap_or_else(|| {
            warn!(
                "Unknown medical class {}, defaulting to third",
                class_number
            );
            MedicalClass::Third
        });
        Ok(Medical {
            id: Some(row.get(0)?),
            class,
            examination_date: parse_date(row, 2)?,
            examiner_name: row.get(3)?,
        })
    }

    fn row_to_license(row: &rusqlite::Row) -> rusqlite::Result<License> {
        Ok(License {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            number: row.get(2)?,
            expiration: parse_date(row, 3)?,
        })
    }

    fn row_to_airport(row: &rusqlite::Row) -> rusqlite::Result<Airport> {
        Ok(Airport {
            id: Some(row.get(0)?),
            code: row.get(1)?,
            name: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            country: row.get(5)?,
            municipality: row.get(6)?,
        })
    }
}

/// Parse an ISO date column, reporting a type error on malformed data.
fn parse_date(row: &rusqlite::Row, index: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(index)?;
    text.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            format!("invalid date: {text}").into(),
        )
    })
}
