//! Pilot currency and certificate status calculations.
//!
//! Computes FAR 61.57 passenger-carrying currency from the landing columns
//! of the logbook, and expiration status for medical certificates and
//! licenses. Everything here is pure: callers load the records, these
//! functions evaluate them against a reference date.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::model::{Flight, License, Medical, MedicalClass};

/// Landings required in the trailing window for passenger currency.
const REQUIRED_LANDINGS: u32 = 3;

/// Length of the currency window in days.
const CURRENCY_WINDOW_DAYS: u64 = 90;

/// Days of validity remaining below which a certificate is flagged critical.
const CRITICAL_DAYS: i64 = 30;

/// Days of validity remaining below which a certificate is flagged warning.
const WARNING_DAYS: i64 = 60;

/// Traffic-light status for a certificate or currency item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateState {
    /// No record on file.
    None,
    /// Past its expiration date.
    Expired,
    /// Fewer than 30 days remaining.
    Critical,
    /// Fewer than 60 days remaining.
    Warning,
    /// Valid with at least 60 days remaining.
    Current,
}

impl CertificateState {
    /// Classify a days-remaining figure. `None` means no record exists.
    #[must_use]
    pub fn from_days_remaining(days: Option<i64>) -> Self {
        match days {
            None => Self::None,
            Some(d) if d < 0 => Self::Expired,
            Some(d) if d < CRITICAL_DAYS => Self::Critical,
            Some(d) if d < WARNING_DAYS => Self::Warning,
            Some(_) => Self::Current,
        }
    }
}

/// Currency state for one landing category (day or night).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LandingCurrency {
    /// Whether the three-landing requirement is met as of the reference date.
    pub current: bool,
    /// Qualifying landings inside the trailing 90-day window.
    pub landings_in_window: u32,
    /// Date currency lapses (or lapsed). `None` when fewer than three
    /// qualifying landings have ever been logged.
    pub expires: Option<NaiveDate>,
}

/// FAR 61.57 passenger-carrying currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassengerCurrency {
    /// Day currency: any logged day landing qualifies.
    pub day: LandingCurrency,
    /// Night currency: only full-stop night landings qualify.
    pub night: LandingCurrency,
}

/// Compute passenger-carrying currency from the full flight history.
///
/// Day currency counts all day landings; night currency counts only
/// full-stop night landings. Currency expires 90 days after the flight
/// carrying the third-most-recent qualifying landing.
#[must_use]
pub fn passenger_currency(flights: &[Flight], as_of: NaiveDate) -> PassengerCurrency {
    PassengerCurrency {
        day: landing_currency(flights, as_of, |f| f.landings.day + f.landings.day_full_stop),
        night: landing_currency(flights, as_of, |f| f.landings.night_full_stop),
    }
}

/// Evaluate one landing category.
///
/// Walks flights newest-first accumulating qualifying landings; the flight
/// that brings the running total to three fixes the expiry date.
fn landing_currency(
    flights: &[Flight],
    as_of: NaiveDate,
    qualifying: impl Fn(&Flight) -> u32,
) -> LandingCurrency {
    let mut dated: Vec<(NaiveDate, u32)> = flights
        .iter()
        .filter(|f| f.date <= as_of)
        .map(|f| (f.date, qualifying(f)))
        .filter(|(_, count)| *count > 0)
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let window_start = as_of
        .checked_sub_days(Days::new(CURRENCY_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let landings_in_window = dated
        .iter()
        .filter(|(date, _)| *date > window_start)
        .map(|(_, count)| count)
        .sum();

    let mut accumulated = 0;
    let mut expires = None;
    for (date, count) in &dated {
        accumulated += count;
        if accumulated >= REQUIRED_LANDINGS {
            expires = date.checked_add_days(Days::new(CURRENCY_WINDOW_DAYS));
            break;
        }
    }

    LandingCurrency {
        current: expires.is_some_and(|date| date >= as_of),
        landings_in_window,
        expires,
    }
}

/// Medical certificate status for display and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicalStatus {
    /// Whether any medical certificate is on file.
    pub has_medical: bool,
    /// Class as issued at the most recent examination.
    pub issued_class: Option<MedicalClass>,
    /// Privilege level currently held, after any downgrade.
    pub current_class: Option<MedicalClass>,
    /// Date of the most recent examination.
    pub examination_date: Option<NaiveDate>,
    /// Expiry of the privileges currently held.
    pub expires: Option<NaiveDate>,
    /// Expiry of first-class privileges, if issued first class.
    pub first_class_expires: Option<NaiveDate>,
    /// Expiry of second-class privileges, if issued first or second class.
    pub second_class_expires: Option<NaiveDate>,
    /// Expiry of third-class privileges.
    pub third_class_expires: Option<NaiveDate>,
    /// Days until the current privileges expire; negative when expired.
    pub days_remaining: Option<i64>,
    /// Traffic-light classification.
    pub status: CertificateState,
}

/// Evaluate the most recent medical certificate against a reference date.
///
/// A first-class certificate steps down through second- and third-class
/// privileges before expiring entirely, so `current_class` can differ from
/// `issued_class`.
#[must_use]
pub fn medical_status(medicals: &[Medical], as_of: NaiveDate) -> MedicalStatus {
    let Some(medical) = medicals
        .iter()
        .max_by_key(|m| (m.examination_date, m.id.unwrap_or(0)))
    else {
        return MedicalStatus {
            has_medical: false,
            issued_class: None,
            current_class: None,
            examination_date: None,
            expires: None,
            first_class_expires: None,
            second_class_expires: None,
            third_class_expires: None,
            days_remaining: None,
            status: CertificateState::None,
        };
    };

    let current_class = medical.privilege_level(as_of);
    let expires = medical
        .next_expiration(as_of)
        .or_else(|| medical.third_class_expiry());
    let days_remaining = expires.map(|date| days_until(date, as_of));

    MedicalStatus {
        has_medical: true,
        issued_class: Some(medical.class),
        current_class,
        examination_date: Some(medical.examination_date),
        expires,
        first_class_expires: medical.first_class_expiry(),
        second_class_expires: medical.second_class_expiry(),
        third_class_expires: medical.third_class_expiry(),
        days_remaining,
        status: CertificateState::from_days_remaining(days_remaining),
    }
}

/// License status for display and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseStatus {
    /// Whether any license is on file.
    pub has_license: bool,
    /// License name, e.g. "Private Pilot".
    pub name: Option<String>,
    /// Certificate number.
    pub number: Option<i64>,
    /// Expiration date.
    pub expires: Option<NaiveDate>,
    /// Days until expiration; negative when expired.
    pub days_remaining: Option<i64>,
    /// Traffic-light classification.
    pub status: CertificateState,
}

/// Evaluate the license with the latest expiration against a reference date.
#[must_use]
pub fn license_status(licenses: &[License], as_of: NaiveDate) -> LicenseStatus {
    let Some(license) = licenses.iter().max_by_key(|l| (l.expiration, l.id.unwrap_or(0))) else {
        return LicenseStatus {
            has_license: false,
            name: None,
            number: None,
            expires: None,
            days_remaining: None,
            status: CertificateState::None,
        };
    };

    let days_remaining = days_until(license.expiration, as_of);
    LicenseStatus {
        has_license: true,
        name: Some(license.name.clone()),
        number: Some(license.number),
        expires: Some(license.expiration),
        days_remaining: Some(days_remaining),
        status: CertificateState::from_days_remaining(Some(days_remaining)),
    }
}

/// Signed day count from `as_of` to `expiry`.
fn days_until(expiry: NaiveDate, as_of: NaiveDate) -> i64 {
    (expiry - as_of).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aircraft, AircraftClass, FlightHours, Landings};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flight_with_landings(on: NaiveDate, landings: Landings) -> Flight {
        Flight {
            id: None,
            date: on,
            aircraft: Aircraft::new("N12345", "C172", AircraftClass::SingleEngineLand),
            route: String::new(),
            hours: FlightHours {
                total: 1.0,
                pic: 1.0,
                ..FlightHours::default()
            },
            landings,
            instructor: None,
            passengers: vec![],
            notes: String::new(),
        }
    }

    fn day_landing_flight(on: NaiveDate, day: u32) -> Flight {
        flight_with_landings(
            on,
            Landings {
                day,
                ..Landings::default()
            },
        )
    }

    #[test]
    fn test_no_flights_not_current() {
        let currency = passenger_currency(&[], date(2024, 6, 1));
        assert!(!currency.day.current);
        assert!(!currency.night.current);
        assert_eq!(currency.day.landings_in_window, 0);
        assert_eq!(currency.day.expires, None);
    }

    #[test]
    fn test_three_recent_landings_current() {
        let as_of = date(2024, 6, 1);
        let flights = vec![day_landing_flight(date(2024, 5, 15), 3)];

        let currency = passenger_currency(&flights, as_of);
        assert!(currency.day.current);
        assert_eq!(currency.day.landings_in_window, 3);
        assert_eq!(currency.day.expires, Some(date(2024, 8, 13)));
    }

    #[test]
    fn test_two_landings_not_current() {
        let as_of = date(2024, 6, 1);
        let flights = vec![day_landing_flight(date(2024, 5, 15), 2)];

        let currency = passenger_currency(&flights, as_of);
        assert!(!currency.day.current);
        assert_eq!(currency.day.landings_in_window, 2);
        assert_eq!(currency.day.expires, None);
    }

    #[test]
    fn test_expiry_fixed_by_third_most_recent_landing() {
        let as_of = date(2024, 6, 1);
        let flights = vec![
            day_landing_flight(date(2024, 5, 20), 1),
            day_landing_flight(date(2024, 5, 10), 1),
            day_landing_flight(date(2024, 4, 1), 1),
        ];

        let currency = passenger_currency(&flights, as_of);
        assert!(currency.day.current);
        // The third landing back is on April 1st; 90 days later is June 30th.
        assert_eq!(currency.day.expires, Some(date(2024, 6, 30)));
    }

    #[test]
    fn test_old_landings_expired() {
        let as_of = date(2024, 6, 1);
        let flights = vec![day_landing_flight(date(2024, 1, 10), 5)];

        let currency = passenger_currency(&flights, as_of);
        assert!(!currency.day.current);
        assert_eq!(currency.day.landings_in_window, 0);
        // The lapse date is still reported for display.
        assert_eq!(currency.day.expires, Some(date(2024, 4, 9)));
    }

    #[test]
    fn test_window_boundary_exclusive() {
        let as_of = date(2024, 6, 1);
        // Exactly 90 days before the reference date falls outside the window.
        let flights = vec![day_landing_flight(date(2024, 3, 3), 3)];

        let currency = passenger_currency(&flights, as_of);
        assert_eq!(currency.day.landings_in_window, 0);
        // Expiry lands on the reference date itself, so still current today.
        assert_eq!(currency.day.expires, Some(date(2024, 6, 1)));
        assert!(currency.day.current);
    }

    #[test]
    fn test_night_requires_full_stop() {
        let as_of = date(2024, 6, 1);
        let flights = vec![flight_with_landings(
            date(2024, 5, 20),
            Landings {
                night: 3,
                night_full_stop: 2,
                ..Landings::default()
            },
        )];

        let currency = passenger_currency(&flights, as_of);
        assert!(!currency.night.current);
        assert_eq!(currency.night.landings_in_window, 2);
    }

    #[test]
    fn test_future_flights_ignored() {
        let as_of = date(2024, 6, 1);
        let flights = vec![day_landing_flight(date(2024, 7, 1), 3)];

        let currency = passenger_currency(&flights, as_of);
        assert!(!currency.day.current);
        assert_eq!(currency.day.landings_in_window, 0);
    }

    #[test]
    fn test_day_full_stop_counts_toward_day() {
        let as_of = date(2024, 6, 1);
        let flights = vec![flight_with_landings(
            date(2024, 5, 20),
            Landings {
                day: 1,
                day_full_stop: 2,
                ..Landings::default()
            },
        )];

        let currency = passenger_currency(&flights, as_of);
        assert!(currency.day.current);
        assert_eq!(currency.day.landings_in_window, 3);
    }

    #[test]
    fn test_certificate_state_thresholds() {
        assert_eq!(
            CertificateState::from_days_remaining(None),
            CertificateState::None
        );
        assert_eq!(
            CertificateState::from_days_remaining(Some(-1)),
            CertificateState::Expired
        );
        assert_eq!(
            CertificateState::from_days_remaining(Some(0)),
            CertificateState::Critical
        );
        assert_eq!(
            CertificateState::from_days_remaining(Some(29)),
            CertificateState::Critical
        );
        assert_eq!(
            CertificateState::from_days_remaining(Some(30)),
            CertificateState::Warning
        );
        assert_eq!(
            CertificateState::from_days_remaining(Some(59)),
            CertificateState::Warning
        );
        assert_eq!(
            CertificateState::from_days_remaining(Some(60)),
            CertificateState::Current
        );
    }

    #[test]
    fn test_certificate_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CertificateState::None).unwrap(),
            "\"none\""
        );
        assert_eq!(
            serde_json::to_string(&CertificateState::Critical).unwrap(),
            "\"critical\""
        );
    }

    #[test]
    fn test_medical_status_none() {
        let status = medical_status(&[], date(2024, 6, 1));
        assert!(!status.has_medical);
        assert_eq!(status.status, CertificateState::None);
        assert_eq!(status.days_remaining, None);
    }

    #[test]
    fn test_medical_status_uses_latest_exam() {
        let medicals = vec![
            Medical {
                id: Some(1),
                class: MedicalClass::Third,
                examination_date: date(2019, 1, 15),
                examiner_name: "Dr. Old".to_string(),
            },
            Medical {
                id: Some(2),
                class: MedicalClass::First,
                examination_date: date(2024, 3, 10),
                examiner_name: "Dr. New".to_string(),
            },
        ];

        let status = medical_status(&medicals, date(2024, 6, 1));
        assert!(status.has_medical);
        assert_eq!(status.issued_class, Some(MedicalClass::First));
        assert_eq!(status.current_class, Some(MedicalClass::First));
        assert_eq!(status.examination_date, Some(date(2024, 3, 10)));
        assert_eq!(status.expires, Some(date(2025, 3, 31)));
        assert_eq!(status.status, CertificateState::Current);
    }

    #[test]
    fn test_medical_status_downgraded_privileges() {
        let medicals = vec![Medical {
            id: Some(1),
            class: MedicalClass::First,
            examination_date: date(2023, 3, 10),
            examiner_name: "Dr. Smith".to_string(),
        }];

        // First-class privileges lapsed March 31st 2024.
        let status = medical_status(&medicals, date(2024, 6, 1));
        assert_eq!(status.issued_class, Some(MedicalClass::First));
        assert_eq!(status.current_class, Some(MedicalClass::Third));
        assert_eq!(status.expires, Some(date(2028, 3, 31)));
        assert_eq!(status.status, CertificateState::Current);
    }

    #[test]
    fn test_medical_status_expired() {
        let medicals = vec![Medical {
            id: Some(1),
            class: MedicalClass::Third,
            examination_date: date(2018, 1, 10),
            examiner_name: "Dr. Smith".to_string(),
        }];

        let status = medical_status(&medicals, date(2024, 6, 1));
        assert!(status.has_medical);
        assert_eq!(status.current_class, None);
        assert_eq!(status.expires, Some(date(2023, 1, 31)));
        assert_eq!(status.status, CertificateState::Expired);
        assert!(status.days_remaining.unwrap() < 0);
    }

    #[test]
    fn test_medical_status_critical_window() {
        let medicals = vec![Medical {
            id: Some(1),
            class: MedicalClass::Second,
            examination_date: date(2023, 6, 20),
            examiner_name: "Dr. Smith".to_string(),
        }];

        // Second-class privileges expire June 30th 2024.
        let status = medical_status(&medicals, date(2024, 6, 15));
        assert_eq!(status.days_remaining, Some(15));
        assert_eq!(status.status, CertificateState::Critical);
    }

    #[test]
    fn test_license_status_none() {
        let status = license_status(&[], date(2024, 6, 1));
        assert!(!status.has_license);
        assert_eq!(status.status, CertificateState::None);
    }

    #[test]
    fn test_license_status_latest_expiration() {
        let licenses = vec![
            License {
                id: Some(1),
                name: "Student Pilot".to_string(),
                number: 111,
                expiration: date(2023, 5, 31),
            },
            License {
                id: Some(2),
                name: "Private Pilot".to_string(),
                number: 222,
                expiration: date(2026, 5, 31),
            },
        ];

        let status = license_status(&licenses, date(2024, 6, 1));
        assert_eq!(status.name.as_deref(), Some("Private Pilot"));
        assert_eq!(status.expires, Some(date(2026, 5, 31)));
        assert_eq!(status.status, CertificateState::Current);
    }

    #[test]
    fn test_license_status_expired() {
        let licenses = vec![License {
            id: Some(1),
            name: "Private Pilot".to_string(),
            number: 111,
            expiration: date(2024, 1, 31),
        }];

        let status = license_status(&licenses, date(2024, 6, 1));
        assert_eq!(status.status, CertificateState::Expired);
        assert!(status.days_remaining.unwrap() < 0);
    }
}
