//! `SQLite` schema definitions for skylog.
//!
//! SQL statements for creating and managing the logbook schema.

/// SQL statement to create the pilots table.
pub const CREATE_PILOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS pilots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role TEXT NOT NULL
)
";

/// SQL statement to create the aircraft table.
pub const CREATE_AIRCRAFT_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS aircraft (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tail_number TEXT NOT NULL UNIQUE,
    model TEXT NOT NULL,
    class TEXT NOT NULL
)
";

/// SQL statement to create the flights table.
pub const CREATE_FLIGHTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flights (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pilot_id INTEGER NOT NULL REFERENCES pilots(id),
    date TEXT NOT NULL,
    aircraft_id INTEGER NOT NULL REFERENCES aircraft(id),
    route TEXT NOT NULL DEFAULT '',
    total_time REAL NOT NULL DEFAULT 0,
    pic_time REAL NOT NULL DEFAULT 0,
    sic_time REAL NOT NULL DEFAULT 0,
    dual_received REAL NOT NULL DEFAULT 0,
    xc_time REAL NOT NULL DEFAULT 0,
    solo_time REAL NOT NULL DEFAULT 0,
    day_time REAL NOT NULL DEFAULT 0,
    night_time REAL NOT NULL DEFAULT 0,
    actual_instrument REAL NOT NULL DEFAULT 0,
    simulated_instrument REAL NOT NULL DEFAULT 0,
    day_landings INTEGER NOT NULL DEFAULT 0,
    day_fullstop_landings INTEGER NOT NULL DEFAULT 0,
    night_landings INTEGER NOT NULL DEFAULT 0,
    night_fullstop_landings INTEGER NOT NULL DEFAULT 0,
    instructor_id INTEGER REFERENCES pilots(id),
    notes TEXT NOT NULL DEFAULT ''
)
";

/// SQL statement to create the flight/passenger join table.
pub const CREATE_FLIGHT_PASSENGERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flight_passengers (
    flight_id INTEGER NOT NULL REFERENCES flights(id) ON DELETE CASCADE,
    pilot_id INTEGER NOT NULL REFERENCES pilots(id),
    PRIMARY KEY (flight_id, pilot_id)
)
";

/// SQL statement to create the medicals table.
pub const CREATE_MEDICALS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS medicals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pilot_id INTEGER NOT NULL REFERENCES pilots(id),
    class INTEGER NOT NULL,
    examination_date TEXT NOT NULL,
    examiner_name TEXT NOT NULL
)
";

/// SQL statement to create the licenses table.
pub const CREATE_LICENSES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS licenses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pilot_id INTEGER NOT NULL REFERENCES pilots(id),
    name TEXT NOT NULL,
    number INTEGER NOT NULL,
    expiration TEXT NOT NULL
)
";

/// SQL statement to create the airports table.
pub const CREATE_AIRPORTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS airports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    country TEXT NOT NULL,
    municipality TEXT NOT NULL
)
";

/// SQL statement to create an index on flight date for ordered listings.
pub const CREATE_FLIGHT_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_pilot_date ON flights(pilot_id, date DESC)
";

/// SQL statement to create an index on airport code for route lookups.
pub const CREATE_AIRPORT_CODE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_airports_code ON airports(code)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PILOTS_TABLE,
    CREATE_AIRCRAFT_TABLE,
    CREATE_FLIGHTS_TABLE,
    CREATE_FLIGHT_PASSENGERS_TABLE,
    CREATE_MEDICALS_TABLE,
    CREATE_LICENSES_TABLE,
    CREATE_AIRPORTS_TABLE,
    CREATE_FLIGHT_DATE_INDEX,
    CREATE_AIRPORT_CODE_INDEX,
    CREATE_METADATA_TABLE,
];
