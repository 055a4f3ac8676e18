//! `skylog` - CLI for the personal flight logbook
//!
//! This binary records flights and supporting records, reports currency,
//! and exports/publishes the logbook as a static site.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use skylog::cli::{
    AircraftCommand, Cli, Command, ConfigCommand, FlightAddCommand, FlightCommand, LicenseCommand,
    MedicalCommand, PilotCommand,
};
use skylog::model::{Aircraft, AircraftClass, Flight, FlightHours, Landings, License, Medical,
    MedicalClass, Pilot, Role};
use skylog::{init_logging, Config, Error, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Export(cmd) => handle_export(&config, cmd.output_dir.as_deref()),
        Command::Publish(cmd) => {
            handle_publish(&config, cmd.output_dir.as_deref(), cmd.no_push)
        }
        Command::Flight(cmd) => handle_flight(&config, cmd),
        Command::Pilot(cmd) => handle_pilot(&config, cmd),
        Command::Aircraft(cmd) => handle_aircraft(&config, cmd),
        Command::Medical(cmd) => handle_medical(&config, cmd),
        Command::License(cmd) => handle_license(&config, cmd),
        Command::ImportAirports(cmd) => handle_import_airports(&config, &cmd.file),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    Ok(Storage::open(config.database_path())?)
}

fn handle_export(config: &Config, output_dir: Option<&std::path::Path>) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let report = skylog::export::export(&storage, config, output_dir, skylog::publish::today())?;
    println!(
        "Exported {} flights and {} routes to {}/",
        report.flight_count,
        report.route_count,
        report.output_dir.display()
    );
    Ok(())
}

fn handle_publish(
    config: &Config,
    output_dir: Option<&std::path::Path>,
    no_push: bool,
) -> anyhow::Result<()> {
    use skylog::publish::{publish, GitCli, PublishOutcome};

    let storage = open_storage(config)?;
    let vcs = GitCli::new(std::env::current_dir()?);
    let push = !no_push && config.publish.push;
    let now = chrono::Local::now().naive_local();

    let (report, outcome) = match publish(&storage, config, &vcs, output_dir, push, now) {
        Ok(result) => result,
        Err(e @ Error::Vcs { .. }) => return Err(e.into()),
        Err(e) => return Err(anyhow::Error::new(e).context("static site export failed")),
    };

    println!(
        "Exported {} flights to {}/",
        report.flight_count,
        report.output_dir.display()
    );
    match outcome {
        PublishOutcome::NoChanges => {
            println!("No changes detected in the exported site. Nothing to commit.");
        }
        PublishOutcome::Committed { message } => {
            println!("Committed: {message}");
            println!("Push skipped.");
        }
        PublishOutcome::Pushed { message } => {
            println!("Committed and pushed: {message}");
        }
    }
    Ok(())
}

fn handle_flight(config: &Config, cmd: FlightCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        FlightCommand::Add(cmd) => {
            let flight = build_flight(&cmd)?;
            flight.validate().map_err(|message| Error::InvalidRecord {
                date: flight.date,
                message,
            })?;
            let id = storage.insert_flight(config.pilot.primary_id, &flight)?;
            println!("Recorded flight {id} on {} in {}", flight.date, cmd.aircraft);
        }
        FlightCommand::List { limit, json } => {
            let mut flights = storage.flights_for_pilot(config.pilot.primary_id)?;
            if let Some(limit) = limit {
                flights.truncate(limit);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&flights)?);
            } else if flights.is_empty() {
                println!("No flights logged.");
            } else {
                for flight in &flights {
                    println!(
                        "{}  {:8}  {:5.1} h  {}",
                        flight.date, flight.aircraft.tail_number, flight.hours.total, flight.route
                    );
                }
                println!("{} flights.", flights.len());
            }
        }
    }
    Ok(())
}

fn build_flight(cmd: &FlightAddCommand) -> anyhow::Result<Flight> {
    let instructor = cmd.instructor.as_deref().map(named_pilot).transpose()?;
    let passengers = cmd
        .passengers
        .iter()
        .map(|name| named_pilot(name))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Flight {
        id: None,
        date: cmd.date,
        // Only the tail number matters here; the stored aircraft record is
        // resolved on insert.
        aircraft: Aircraft::new(&cmd.aircraft, "", AircraftClass::SingleEngineLand),
        route: cmd.route.clone(),
        hours: FlightHours {
            total: cmd.total,
            pic: cmd.pic,
            sic: cmd.sic,
            dual_received: cmd.dual,
            cross_country: cmd.xc,
            solo: cmd.solo,
            day: cmd.day,
            night: cmd.night,
            actual_instrument: cmd.actual_instrument,
            simulated_instrument: cmd.simulated_instrument,
        },
        landings: Landings {
            day: cmd.day_landings,
            day_full_stop: cmd.day_fullstop_landings,
            night: cmd.night_landings,
            night_full_stop: cmd.night_fullstop_landings,
        },
        instructor,
        passengers,
        notes: cmd.notes.clone(),
    })
}

/// Split a "First Last" display name into a pilot reference. The role here
/// is a placeholder; lookups go by name.
fn named_pilot(name: &str) -> anyhow::Result<Pilot> {
    let (first, last) = name
        .split_once(' ')
        .with_context(|| format!("expected \"First Last\", got '{name}'"))?;
    Ok(Pilot::new(first, last, Role::Passenger))
}

fn handle_pilot(config: &Config, cmd: PilotCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        PilotCommand::Add {
            first_name,
            last_name,
            role,
        } => {
            let role: Role = role
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let id = storage.insert_pilot(&Pilot::new(&first_name, &last_name, role))?;
            println!("Added {role} {first_name} {last_name} (id {id})");
        }
    }
    Ok(())
}

fn handle_aircraft(config: &Config, cmd: AircraftCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        AircraftCommand::Add {
            tail_number,
            model,
            class,
        } => {
            let class: AircraftClass = class
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let id = storage.insert_aircraft(&Aircraft::new(&tail_number, &model, class))?;
            println!("Added {tail_number} ({model}, {class}) (id {id})");
        }
    }
    Ok(())
}

fn handle_medical(config: &Config, cmd: MedicalCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        MedicalCommand::Add {
            class,
            date,
            examiner,
        } => {
            let class = MedicalClass::from_number(class)
                .with_context(|| format!("medical class must be 1, 2, or 3, got {class}"))?;
            let medical = Medical {
                id: None,
                class,
                examination_date: date,
                examiner_name: examiner,
            };
            storage.insert_medical(config.pilot.primary_id, &medical)?;
            match medical.next_expiration(date) {
                Some(expiry) => println!("Recorded {class} medical, valid through {expiry}"),
                None => println!("Recorded {class} medical"),
            }
        }
    }
    Ok(())
}

fn handle_license(config: &Config, cmd: LicenseCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        LicenseCommand::Add {
            name,
            number,
            expiration,
        } => {
            storage.insert_license(
                config.pilot.primary_id,
                &License {
                    id: None,
                    name: name.clone(),
                    number,
                    expiration,
                },
            )?;
            println!("Recorded license {name} (#{number}), expires {expiration}");
        }
    }
    Ok(())
}

fn handle_import_airports(config: &Config, file: &std::path::Path) -> anyhow::Result<()> {
    let mut storage = open_storage(config)?;
    let report = skylog::airports::import_airports(&mut storage, file)?;
    println!(
        "Imported {} airports ({} skipped, {} replaced)",
        report.imported, report.skipped, report.replaced
    );
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let pilot_id = config.pilot.primary_id;
    let as_of = skylog::publish::today();

    let flights = storage.flights_for_pilot(pilot_id)?;
    let currency = skylog::currency::passenger_currency(&flights, as_of);
    let medical = skylog::currency::medical_status(&storage.medicals_for_pilot(pilot_id)?, as_of);
    let license = skylog::currency::license_status(&storage.licenses_for_pilot(pilot_id)?, as_of);

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "pilots": storage.count_pilots()?,
            "aircraft": storage.count_aircraft()?,
            "flights": flights.len(),
            "airports": storage.count_airports()?,
            "currency": currency,
            "medical": medical,
            "license": license,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("skylog status");
        println!("-------------");
        println!("Database:   {}", storage.path().display());
        println!("Pilots:     {}", storage.count_pilots()?);
        println!("Aircraft:   {}", storage.count_aircraft()?);
        println!("Flights:    {}", flights.len());
        println!("Airports:   {}", storage.count_airports()?);
        println!();
        println!(
            "Day currency:   {}",
            if currency.day.current { "current" } else { "not current" }
        );
        println!(
            "Night currency: {}",
            if currency.night.current { "current" } else { "not current" }
        );
        match (medical.current_class, medical.expires) {
            (Some(class), Some(expiry)) => {
                println!("Medical:        {class} privileges through {expiry}");
            }
            _ => println!("Medical:        none on file or expired"),
        }
        match (license.name.as_deref(), license.expires) {
            (Some(name), Some(expiry)) => println!("License:        {name}, expires {expiry}"),
            _ => println!("License:        none on file"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!();
                println!("[Pilot]");
                println!("  Primary id:      {}", config.pilot.primary_id);
                println!();
                println!("[Export]");
                println!("  Output dir:      {}", config.export.output_dir.display());
                println!("  Site title:      {}", config.export.site_title);
                println!("  Chart months:    {}", config.export.chart_months);
                println!("  Leaderboards:    top {}", config.export.leaderboard_limit);
                println!();
                println!("[Publish]");
                println!("  Remote:          {}", config.publish.remote);
                println!("  Branch:          {}", config.publish.branch);
                println!("  Push:            {}", config.publish.push);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
