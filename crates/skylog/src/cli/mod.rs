//! Command-line interface for skylog.
//!
//! This module provides the CLI structure and command handlers for the
//! `skylog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AircraftCommand, ConfigCommand, ExportCommand, FlightAddCommand, FlightCommand,
    ImportAirportsCommand, LicenseCommand, MedicalCommand, PilotCommand, PublishCommand,
    StatusCommand,
};

/// skylog - Personal flight logbook
///
/// Records flights, tracks currency and certificate expirations, and
/// publishes the logbook as a static site.
#[derive(Debug, Parser)]
#[command(name = "skylog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export the logbook as a static site
    Export(ExportCommand),

    /// Export and publish the static site via git
    Publish(PublishCommand),

    /// Record and list flights
    #[command(subcommand)]
    Flight(FlightCommand),

    /// Manage people
    #[command(subcommand)]
    Pilot(PilotCommand),

    /// Manage aircraft
    #[command(subcommand)]
    Aircraft(AircraftCommand),

    /// Record medical examinations
    #[command(subcommand)]
    Medical(MedicalCommand),

    /// Record licenses
    #[command(subcommand)]
    License(LicenseCommand),

    /// Import the airport database from a CSV file
    ImportAirports(ImportAirportsCommand),

    /// Show database and currency status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
