//! HTML page rendering for the static site.
//!
//! Pages are assembled with plain string formatting. The generated markup is
//! deliberately simple: the JSON documents under `data/` carry the full
//! detail, the pages are a readable front for them.

use chrono::NaiveDate;

use crate::currency::{CertificateState, LicenseStatus, MedicalStatus, PassengerCurrency};
use crate::model::Flight;
use crate::stats::{
    CommercialProgress, InstrumentRatingProgress, LeaderboardEntry, RecentFlight, Totals,
};

/// Context for the dashboard page.
#[derive(Debug)]
pub struct DashboardContext<'a> {
    /// Site title from configuration.
    pub site_title: &'a str,
    /// Export reference date.
    pub as_of: NaiveDate,
    /// Column totals.
    pub totals: &'a Totals,
    /// Passenger-carrying currency.
    pub currency: &'a PassengerCurrency,
    /// Medical certificate status.
    pub medical: &'a MedicalStatus,
    /// License status.
    pub license: &'a LicenseStatus,
    /// Commercial certificate progress.
    pub commercial: &'a CommercialProgress,
    /// Instrument rating progress.
    pub instrument: &'a InstrumentRatingProgress,
    /// Days since the last flight.
    pub days_since_last_flight: Option<i64>,
    /// Recent flights table rows.
    pub recent_flights: &'a [RecentFlight],
    /// Passenger leaderboard rows.
    pub passengers: &'a [LeaderboardEntry],
    /// Instructor leaderboard rows.
    pub instructors: &'a [LeaderboardEntry],
}

/// Escape text for inclusion in HTML content or attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 60rem; padding: 0 1rem; color: #222; }}
table {{ border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; }}
th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }}
th {{ background: #f0f0f0; }}
h1, h2 {{ margin-top: 1.5rem; }}
nav a {{ margin-right: 1rem; }}
.status-current {{ color: #1a7f37; }}
.status-warning {{ color: #9a6700; }}
.status-critical {{ color: #bc4c00; }}
.status-expired, .status-none {{ color: #cf222e; }}
footer {{ margin-top: 2rem; font-size: 0.85rem; color: #666; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

fn nav() -> &'static str {
    r#"<nav><a href="index.html">Dashboard</a><a href="logbook.html">Logbook</a></nav>"#
}

fn status_cell(state: CertificateState) -> String {
    let (class, label) = match state {
        CertificateState::None => ("none", "none on file"),
        CertificateState::Expired => ("expired", "expired"),
        CertificateState::Critical => ("critical", "expiring soon"),
        CertificateState::Warning => ("warning", "expiring"),
        CertificateState::Current => ("current", "current"),
    };
    format!(r#"<span class="status-{class}">{label}</span>"#)
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

/// Render the dashboard page.
#[must_use]
pub fn render_dashboard(ctx: &DashboardContext) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>\n", escape(ctx.site_title)));
    body.push_str(nav());

    body.push_str("<h2>Totals</h2>\n<table>\n");
    body.push_str("<tr><th>Total</th><th>PIC</th><th>SIC</th><th>Dual</th><th>XC</th><th>Night</th><th>Instrument</th><th>Landings</th></tr>\n");
    body.push_str(&format!(
        "<tr><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{}</td></tr>\n</table>\n",
        ctx.totals.total_time,
        ctx.totals.pic_time,
        ctx.totals.sic_time,
        ctx.totals.dual_time,
        ctx.totals.xc_time,
        ctx.totals.night_time,
        ctx.totals.actual_instrument + ctx.totals.simulated_instrument,
        ctx.totals.total_landings,
    ));

    if let Some(days) = ctx.days_since_last_flight {
        body.push_str(&format!("<p>Last flight: {days} days ago.</p>\n"));
    } else {
        body.push_str("<p>No flights logged yet.</p>\n");
    }

    body.push_str("<h2>Passenger currency</h2>\n<table>\n");
    body.push_str("<tr><th></th><th>Current</th><th>Landings (90 days)</th><th>Expires</th></tr>\n");
    for (label, currency) in [("Day", &ctx.currency.day), ("Night", &ctx.currency.night)] {
        body.push_str(&format!(
            "<tr><td>{label}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            if currency.current { "yes" } else { "no" },
            currency.landings_in_window,
            fmt_date(currency.expires),
        ));
    }
    body.push_str("</table>\n");

    body.push_str("<h2>Certificates</h2>\n<table>\n");
    body.push_str("<tr><th></th><th>Status</th><th>Expires</th><th>Days remaining</th></tr>\n");
    let medical_label = ctx.medical.current_class.map_or_else(
        || "Medical".to_string(),
        |class| format!("Medical ({class})"),
    );
    body.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape(&medical_label),
        status_cell(ctx.medical.status),
        fmt_date(ctx.medical.expires),
        ctx.medical
            .days_remaining
            .map_or_else(|| "-".to_string(), |d| d.to_string()),
    ));
    body.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n</table>\n",
        escape(ctx.license.name.as_deref().unwrap_or("License")),
        status_cell(ctx.license.status),
        fmt_date(ctx.license.expires),
        ctx.license
            .days_remaining
            .map_or_else(|| "-".to_string(), |d| d.to_string()),
    ));

    body.push_str("<h2>Progress</h2>\n<table>\n");
    body.push_str("<tr><th>Requirement</th><th>Current</th><th>Required</th><th>Remaining</th><th>%</th></tr>\n");
    for (label, p) in [
        ("Commercial: total time", &ctx.commercial.total_time),
        ("Commercial: PIC", &ctx.commercial.pic_time),
        ("Commercial: XC PIC", &ctx.commercial.xc_pic_time),
        ("Instrument: XC PIC", &ctx.instrument.xc_pic),
    ] {
        body.push_str(&format!(
            "<tr><td>{label}</td><td>{:.1}</td><td>{:.0}</td><td>{:.1}</td><td>{:.1}</td></tr>\n",
            p.current, p.required, p.remaining, p.percentage,
        ));
    }
    body.push_str(&format!(
        "<tr><td>Instrument: hours (max 20 simulated)</td><td>{:.1}</td><td>40</td><td>{:.1}</td><td>{:.1}</td></tr>\n</table>\n",
        ctx.instrument.creditable_total, ctx.instrument.remaining, ctx.instrument.percentage,
    ));

    if !ctx.recent_flights.is_empty() {
        body.push_str("<h2>Recent flights</h2>\n<table>\n");
        body.push_str("<tr><th>Date</th><th>Aircraft</th><th>Route</th><th>Time</th><th>Day ldg</th><th>Night ldg</th></tr>\n");
        for flight in ctx.recent_flights {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td></tr>\n",
                flight.date,
                escape(&flight.tail_number),
                escape(&flight.route),
                flight.total_time,
                flight.day_landings,
                flight.night_landings,
            ));
        }
        body.push_str("</table>\n");
    }

    for (heading, entries) in [
        ("Passengers", ctx.passengers),
        ("Instructors", ctx.instructors),
    ] {
        if entries.is_empty() {
            continue;
        }
        body.push_str(&format!("<h2>{heading}</h2>\n<table>\n"));
        body.push_str("<tr><th>Name</th><th>Flights</th><th>Hours</th></tr>\n");
        for entry in entries {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}</td></tr>\n",
                escape(&entry.name),
                entry.flight_count,
                entry.total_time,
            ));
        }
        body.push_str("</table>\n");
    }

    body.push_str(&format!("<footer>Updated {}</footer>\n", ctx.as_of));
    page(ctx.site_title, &body)
}

/// Render the full logbook listing.
#[must_use]
pub fn render_logbook(site_title: &str, flights: &[Flight]) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>{} — Logbook</h1>\n", escape(site_title)));
    body.push_str(nav());

    body.push_str(&format!("<p>{} flights.</p>\n", flights.len()));
    body.push_str("<table>\n");
    body.push_str("<tr><th>Date</th><th>Aircraft</th><th>Route</th><th>Total</th><th>PIC</th><th>Dual</th><th>XC</th><th>Night</th><th>Landings</th><th>Instructor</th><th>Notes</th></tr>\n");
    for flight in flights {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            flight.date,
            escape(&flight.aircraft.tail_number),
            escape(&flight.route),
            flight.hours.total,
            flight.hours.pic,
            flight.hours.dual_received,
            flight.hours.cross_country,
            flight.hours.night,
            flight.landings.total(),
            escape(
                &flight
                    .instructor
                    .as_ref()
                    .map_or_else(String::new, crate::model::Pilot::full_name)
            ),
            escape(&flight.notes),
        ));
    }
    body.push_str("</table>\n");

    page(&format!("{site_title} — Logbook"), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{license_status, medical_status, passenger_currency};
    use crate::model::{Aircraft, AircraftClass, FlightHours, Landings};
    use crate::stats;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_flight() -> Flight {
        Flight {
            id: Some(1),
            date: date(2024, 5, 1),
            aircraft: Aircraft::new("N12345", "C172", AircraftClass::SingleEngineLand),
            route: "KBFI KRNT".to_string(),
            hours: FlightHours {
                total: 1.5,
                pic: 1.5,
                ..FlightHours::default()
            },
            landings: Landings {
                day: 3,
                ..Landings::default()
            },
            instructor: None,
            passengers: vec![],
            notes: "notes with <angle> & \"quotes\"".to_string(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_render_logbook_escapes_user_text() {
        let html = render_logbook("My Logbook", &[sample_flight()]);
        assert!(html.contains("&lt;angle&gt; &amp; &quot;quotes&quot;"));
        assert!(!html.contains("<angle>"));
        assert!(html.contains("N12345"));
        assert!(html.contains("1 flights"));
    }

    #[test]
    fn test_render_dashboard_contains_sections() {
        let as_of = date(2024, 6, 1);
        let flights = vec![sample_flight()];
        let totals = stats::totals(&flights);
        let currency = passenger_currency(&flights, as_of);
        let medical = medical_status(&[], as_of);
        let license = license_status(&[], as_of);
        let commercial = stats::commercial_progress(&flights);
        let instrument = stats::instrument_rating_progress(&flights);
        let recent = stats::recent_flights(&flights, 10);

        let html = render_dashboard(&DashboardContext {
            site_title: "My Logbook",
            as_of,
            totals: &totals,
            currency: &currency,
            medical: &medical,
            license: &license,
            commercial: &commercial,
            instrument: &instrument,
            days_since_last_flight: Some(31),
            recent_flights: &recent,
            passengers: &[],
            instructors: &[],
        });

        assert!(html.contains("<h1>My Logbook</h1>"));
        assert!(html.contains("Passenger currency"));
        assert!(html.contains("31 days ago"));
        assert!(html.contains("none on file"));
        assert!(html.contains("Updated 2024-06-01"));
        // Empty leaderboards are omitted entirely.
        assert!(!html.contains("<h2>Passengers</h2>"));
    }

    #[test]
    fn test_render_dashboard_deterministic() {
        let as_of = date(2024, 6, 1);
        let totals = stats::totals(&[]);
        let currency = passenger_currency(&[], as_of);
        let medical = medical_status(&[], as_of);
        let license = license_status(&[], as_of);
        let commercial = stats::commercial_progress(&[]);
        let instrument = stats::instrument_rating_progress(&[]);

        let ctx = DashboardContext {
            site_title: "T",
            as_of,
            totals: &totals,
            currency: &currency,
            medical: &medical,
            license: &license,
            commercial: &commercial,
            instrument: &instrument,
            days_since_last_flight: None,
            recent_flights: &[],
            passengers: &[],
            instructors: &[],
        };
        assert_eq!(render_dashboard(&ctx), render_dashboard(&ctx));
    }
}
