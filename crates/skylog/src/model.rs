//! Core domain types for skylog.
//!
//! This module defines the records a logbook is made of: pilots, aircraft,
//! flights, medical certificates, licenses, and airports. Storage and export
//! both operate on these types.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The role a person plays in the logbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The logbook owner or another rated pilot.
    Pilot,
    /// A flight instructor.
    Instructor,
    /// A designated examiner.
    Examiner,
    /// A passenger with no crew role.
    Passenger,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pilot => write!(f, "pilot"),
            Self::Instructor => write!(f, "instructor"),
            Self::Examiner => write!(f, "examiner"),
            Self::Passenger => write!(f, "passenger"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pilot" => Ok(Self::Pilot),
            "instructor" => Ok(Self::Instructor),
            "examiner" => Ok(Self::Examiner),
            "passenger" => Ok(Self::Passenger),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A person appearing in the logbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pilot {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role this person plays in the logbook.
    pub role: Role,
}

impl Pilot {
    /// Create a new pilot record (not yet persisted).
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
        }
    }

    /// Display form, "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// FAA aircraft class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AircraftClass {
    /// Single engine land.
    #[serde(rename = "Single Engine Land")]
    SingleEngineLand,
    /// Multi engine land.
    #[serde(rename = "Multi Engine Land")]
    MultiEngineLand,
}

impl std::fmt::Display for AircraftClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleEngineLand => write!(f, "Single Engine Land"),
            Self::MultiEngineLand => write!(f, "Multi Engine Land"),
        }
    }
}

impl std::str::FromStr for AircraftClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Single Engine Land" | "sel" | "SEL" => Ok(Self::SingleEngineLand),
            "Multi Engine Land" | "mel" | "MEL" => Ok(Self::MultiEngineLand),
            other => Err(format!("unknown aircraft class: {other}")),
        }
    }
}

/// An aircraft flown in the logbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aircraft {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Registration, e.g. "N12345".
    pub tail_number: String,
    /// Type designator, e.g. "C172".
    pub model: String,
    /// Aircraft class.
    pub class: AircraftClass,
}

impl Aircraft {
    /// Create a new aircraft record (not yet persisted).
    #[must_use]
    pub fn new(
        tail_number: impl Into<String>,
        model: impl Into<String>,
        class: AircraftClass,
    ) -> Self {
        Self {
            id: None,
            tail_number: tail_number.into(),
            model: model.into(),
            class,
        }
    }
}

/// Flight time in each logbook column, in decimal hours.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightHours {
    /// Total flight time.
    pub total: f64,
    /// Pilot-in-command time.
    pub pic: f64,
    /// Second-in-command time.
    pub sic: f64,
    /// Dual instruction received.
    pub dual_received: f64,
    /// Cross-country time.
    pub cross_country: f64,
    /// Solo time.
    pub solo: f64,
    /// Day time.
    pub day: f64,
    /// Night time.
    pub night: f64,
    /// Actual instrument time.
    pub actual_instrument: f64,
    /// Simulated (hood) instrument time.
    pub simulated_instrument: f64,
}

impl FlightHours {
    /// All the hour columns, for validation.
    fn columns(&self) -> [(&'static str, f64); 10] {
        [
            ("total", self.total),
            ("pic", self.pic),
            ("sic", self.sic),
            ("dual_received", self.dual_received),
            ("cross_country", self.cross_country),
            ("solo", self.solo),
            ("day", self.day),
            ("night", self.night),
            ("actual_instrument", self.actual_instrument),
            ("simulated_instrument", self.simulated_instrument),
        ]
    }
}

/// Landing counts by time of day and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Landings {
    /// Day landings (touch-and-go or full-stop not separately logged).
    pub day: u32,
    /// Day full-stop landings.
    pub day_full_stop: u32,
    /// Night landings.
    pub night: u32,
    /// Night full-stop landings.
    pub night_full_stop: u32,
}

impl Landings {
    /// Total landings across all columns.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.day + self.day_full_stop + self.night + self.night_full_stop
    }
}

/// A single logbook entry.
///
/// Flights are created through the CLI and read-only from there on; the
/// exporter never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Date of the flight.
    pub date: NaiveDate,
    /// Aircraft flown.
    pub aircraft: Aircraft,
    /// Route flown as space-separated airport codes, e.g. "KBFI KRNT KBFI".
    pub route: String,
    /// Hour columns.
    pub hours: FlightHours,
    /// Landing columns.
    pub landings: Landings,
    /// Instructor on board, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<Pilot>,
    /// Passengers on board.
    pub passengers: Vec<Pilot>,
    /// Free-text remarks.
    pub notes: String,
}

impl Flight {
    /// Validate the record before it is persisted or exported.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found: a negative hour
    /// column, or a time column exceeding the total.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.hours.columns() {
            if value < 0.0 {
                return Err(format!("{name} time is negative ({value})"));
            }
            if !value.is_finite() {
                return Err(format!("{name} time is not a finite number"));
            }
        }
        if self.hours.pic > self.hours.total {
            return Err(format!(
                "pic time ({}) exceeds total time ({})",
                self.hours.pic, self.hours.total
            ));
        }
        Ok(())
    }

    /// Airport codes on the route, in flown order.
    #[must_use]
    pub fn route_codes(&self) -> Vec<&str> {
        self.route.split_whitespace().collect()
    }
}

/// FAA medical certificate class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicalClass {
    /// First class.
    First,
    /// Second class.
    Second,
    /// Third class.
    Third,
}

impl MedicalClass {
    /// Numeric form used in storage and display.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }

    /// Parse from the numeric storage form.
    #[must_use]
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            _ => None,
        }
    }
}

impl std::fmt::Display for MedicalClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "First Class"),
            Self::Second => write!(f, "Second Class"),
            Self::Third => write!(f, "Third Class"),
        }
    }
}

/// A medical certificate.
///
/// Privileges expire on the last day of a calendar month: first- and
/// second-class privileges 12 months after examination, third-class 60
/// months. A certificate downgrades through lower privilege levels before
/// expiring entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medical {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Class of the certificate as issued.
    pub class: MedicalClass,
    /// Date of the examination.
    pub examination_date: NaiveDate,
    /// Name of the aviation medical examiner.
    pub examiner_name: String,
}

impl Medical {
    /// Expiry of first-class privileges, `None` unless issued first class.
    #[must_use]
    pub fn first_class_expiry(&self) -> Option<NaiveDate> {
        if self.class != MedicalClass::First {
            return None;
        }
        calendar_months_expiry(self.examination_date, 12)
    }

    /// Expiry of second-class privileges, `None` unless issued first or second class.
    #[must_use]
    pub fn second_class_expiry(&self) -> Option<NaiveDate> {
        if self.class == MedicalClass::Third {
            return None;
        }
        calendar_months_expiry(self.examination_date, 12)
    }

    /// Expiry of third-class privileges. All classes can exercise these.
    #[must_use]
    pub fn third_class_expiry(&self) -> Option<NaiveDate> {
        calendar_months_expiry(self.examination_date, 60)
    }

    /// The privilege level this certificate allows on the given date,
    /// or `None` if completely expired.
    #[must_use]
    pub fn privilege_level(&self, as_of: NaiveDate) -> Option<MedicalClass> {
        if let Some(expiry) = self.first_class_expiry() {
            if as_of <= expiry {
                return Some(MedicalClass::First);
            }
        }
        if let Some(expiry) = self.second_class_expiry() {
            if as_of <= expiry {
                return Some(MedicalClass::Second);
            }
        }
        if let Some(expiry) = self.third_class_expiry() {
            if as_of <= expiry {
                return Some(MedicalClass::Third);
            }
        }
        None
    }

    /// The next upcoming expiration for the privileges held on the given
    /// date, or `None` if already expired.
    #[must_use]
    pub fn next_expiration(&self, as_of: NaiveDate) -> Option<NaiveDate> {
        match self.privilege_level(as_of)? {
            MedicalClass::First => self.first_class_expiry(),
            MedicalClass::Second => self.second_class_expiry(),
            MedicalClass::Third => self.third_class_expiry(),
        }
    }
}

/// A pilot certificate or rating with an expiration date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Name, e.g. "Private Pilot".
    pub name: String,
    /// Certificate number.
    pub number: i64,
    /// Expiration date.
    pub expiration: NaiveDate,
}

/// An airport from the ourairports.com dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// ICAO code or local identifier, at most 4 characters.
    pub code: String,
    /// Airport name.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// ISO 3166 country code.
    pub country: String,
    /// Municipality served.
    pub municipality: String,
}

/// Last day of the month `months` calendar months after `from`.
///
/// Returns `None` only on date arithmetic overflow at the extremes of the
/// supported year range.
fn calendar_months_expiry(from: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = from.year() * 12 + i32::try_from(from.month0()).ok()? + i32::try_from(months).ok()?;
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12);
    let (next_year, next_month0) = if month0 == 11 {
        (year + 1, 0)
    } else {
        (year, month0 + 1)
    };
    NaiveDate::from_ymd_opt(next_year, u32::try_from(next_month0).ok()? + 1, 1)?.pred_opt()
}
