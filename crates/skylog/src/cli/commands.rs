//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Output directory for the static site (overrides configuration)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Publish command arguments.
#[derive(Debug, Args)]
pub struct PublishCommand {
    /// Output directory for the static site (overrides configuration)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Commit but do not push
    #[arg(long)]
    pub no_push: bool,
}

/// Flight management commands.
#[derive(Debug, Subcommand)]
pub enum FlightCommand {
    /// Record a flight
    Add(FlightAddCommand),

    /// List logged flights, newest first
    List {
        /// Show at most this many flights
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for recording a flight.
#[derive(Debug, Args)]
pub struct FlightAddCommand {
    /// Date of the flight (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: NaiveDate,

    /// Tail number of the aircraft flown
    #[arg(short, long, value_name = "TAIL")]
    pub aircraft: String,

    /// Route as space-separated airport codes, e.g. "KBFI KRNT KBFI"
    #[arg(short, long, default_value = "")]
    pub route: String,

    /// Total flight time in decimal hours
    #[arg(short, long)]
    pub total: f64,

    /// Pilot-in-command time
    #[arg(long, default_value_t = 0.0)]
    pub pic: f64,

    /// Second-in-command time
    #[arg(long, default_value_t = 0.0)]
    pub sic: f64,

    /// Dual instruction received
    #[arg(long, default_value_t = 0.0)]
    pub dual: f64,

    /// Cross-country time
    #[arg(long, default_value_t = 0.0)]
    pub xc: f64,

    /// Solo time
    #[arg(long, default_value_t = 0.0)]
    pub solo: f64,

    /// Day time
    #[arg(long, default_value_t = 0.0)]
    pub day: f64,

    /// Night time
    #[arg(long, default_value_t = 0.0)]
    pub night: f64,

    /// Actual instrument time
    #[arg(long, default_value_t = 0.0)]
    pub actual_instrument: f64,

    /// Simulated (hood) instrument time
    #[arg(long, default_value_t = 0.0)]
    pub simulated_instrument: f64,

    /// Day landings
    #[arg(long, default_value_t = 0)]
    pub day_landings: u32,

    /// Day full-stop landings
    #[arg(long, default_value_t = 0)]
    pub day_fullstop_landings: u32,

    /// Night landings
    #[arg(long, default_value_t = 0)]
    pub night_landings: u32,

    /// Night full-stop landings
    #[arg(long, default_value_t = 0)]
    pub night_fullstop_landings: u32,

    /// Instructor on board, as "First Last"
    #[arg(long, value_name = "NAME")]
    pub instructor: Option<String>,

    /// Passenger on board, as "First Last" (repeatable)
    #[arg(long = "passenger", value_name = "NAME")]
    pub passengers: Vec<String>,

    /// Free-text remarks
    #[arg(long, default_value = "")]
    pub notes: String,
}

/// Pilot management commands.
#[derive(Debug, Subcommand)]
pub enum PilotCommand {
    /// Add a person to the logbook
    Add {
        /// Given name
        first_name: String,

        /// Family name
        last_name: String,

        /// Role: pilot, instructor, examiner, or passenger
        #[arg(short, long, default_value = "passenger")]
        role: String,
    },
}

/// Aircraft management commands.
#[derive(Debug, Subcommand)]
pub enum AircraftCommand {
    /// Add an aircraft
    Add {
        /// Registration, e.g. "N12345"
        tail_number: String,

        /// Type designator, e.g. "C172"
        model: String,

        /// Class: SEL or MEL
        #[arg(long, default_value = "SEL")]
        class: String,
    },
}

/// Medical certificate commands.
#[derive(Debug, Subcommand)]
pub enum MedicalCommand {
    /// Record a medical examination
    Add {
        /// Certificate class: 1, 2, or 3
        #[arg(long)]
        class: u8,

        /// Examination date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Name of the aviation medical examiner
        #[arg(short, long)]
        examiner: String,
    },
}

/// License commands.
#[derive(Debug, Subcommand)]
pub enum LicenseCommand {
    /// Record a license or certificate
    Add {
        /// Name, e.g. "Private Pilot"
        name: String,

        /// Certificate number
        #[arg(short, long)]
        number: i64,

        /// Expiration date (YYYY-MM-DD)
        #[arg(short, long)]
        expiration: NaiveDate,
    },
}

/// Import-airports command arguments.
#[derive(Debug, Args)]
pub struct ImportAirportsCommand {
    /// Path to the ourairports.com airports.csv file
    #[arg(short, long, default_value = "airports.csv")]
    pub file: PathBuf,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the configuration file path
    Path,

    /// Validate a configuration file
    Validate {
        /// Configuration file to validate (defaults to the standard path)
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}
