//! `vetslots` CLI: compute bookable dates and open appointment slots from the
//! command line.
//!
//! Rules and appointments are JSON arrays of store rows. Results are written as
//! JSON to stdout (or `-o FILE`); logs go to stderr.
//!
//! ## Usage
//!
//! ```sh
//! # Candidate dates for the next 14 days (rules from a file)
//! vetslots dates --rules rules.json --today 2026-03-02
//!
//! # Same, rules piped on stdin, 30-day horizon
//! cat rules.json | vetslots dates --rules - --horizon 30
//!
//! # Open slots on one date
//! vetslots slots --rules rules.json --appointments appts.json --date 2026-03-02
//!
//! # Dates that still have open slots, with their slots
//! vetslots calendar --rules rules.json --appointments appts.json
//!
//! # Validate a new rule against the stored ones
//! vetslots check-rule --rules rules.json --day 1 --start 09:30 --end 10:30
//!
//! # Validate a booking just before inserting it
//! vetslots check-booking --rules rules.json --appointments appts.json \
//!     --date 2026-03-02 --time 09:00
//! ```

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slot_engine::rules::weekday_from_index;
use slot_engine::{
    check_booking, open_calendar, open_slots_on, parse_stored_rules, resolve_stored_rules,
    scan_horizon, validate_rule, Appointment, BookingRequest, DayAvailability, ScheduleSource,
    StoredRule, TimeOfDay, WeeklyAvailabilityRule, WeeklySchedule, DEFAULT_HORIZON_DAYS,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "vetslots",
    version,
    about = "Bookable dates and open appointment slots for veterinary house calls"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output file (writes to stdout if omitted)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct ScheduleArgs {
    /// JSON array of availability rule rows ("-" reads stdin)
    #[arg(short, long)]
    rules: String,

    /// Veterinarian to compute for (defaults to the first rule row's owner)
    #[arg(long)]
    vet: Option<String>,
}

#[derive(Args)]
struct HorizonArgs {
    /// First day of the horizon (defaults to the local date)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Number of days to scan, today included
    #[arg(long, env = "VETSLOTS_HORIZON_DAYS", default_value_t = DEFAULT_HORIZON_DAYS)]
    horizon: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate booking dates within the horizon
    Dates {
        #[command(flatten)]
        schedule: ScheduleArgs,
        #[command(flatten)]
        horizon: HorizonArgs,
    },
    /// List open slots on one date
    Slots {
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// JSON array of appointment rows ("-" reads stdin)
        #[arg(short, long)]
        appointments: Option<String>,
        /// Date to list slots for (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// List dates that still have open slots, with their slots
    Calendar {
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// JSON array of appointment rows ("-" reads stdin)
        #[arg(short, long)]
        appointments: Option<String>,
        #[command(flatten)]
        horizon: HorizonArgs,
    },
    /// Validate a new or edited rule against the stored rules
    CheckRule {
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// Day of week, 0 = Sunday .. 6 = Saturday
        #[arg(long)]
        day: i64,
        /// Window start (HH:MM)
        #[arg(long)]
        start: TimeOfDay,
        /// Window end (HH:MM)
        #[arg(long)]
        end: TimeOfDay,
        /// Id of the rule being edited, so it is not compared with itself
        #[arg(long)]
        id: Option<String>,
    },
    /// Validate that a booking still lands on an open slot
    CheckBooking {
        #[command(flatten)]
        schedule: ScheduleArgs,
        /// JSON array of appointment rows ("-" reads stdin)
        #[arg(short, long)]
        appointments: Option<String>,
        /// Booking date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Booking time (HH:MM)
        #[arg(long)]
        time: TimeOfDay,
    },
}

#[derive(Serialize)]
struct DatesReport {
    veterinarian_id: String,
    source: ScheduleSource,
    today: NaiveDate,
    horizon_days: u32,
    dates: Vec<NaiveDate>,
}

#[derive(Serialize)]
struct SlotsReport {
    veterinarian_id: String,
    date: NaiveDate,
    slots: Vec<TimeOfDay>,
}

#[derive(Serialize)]
struct CalendarReport {
    veterinarian_id: String,
    today: NaiveDate,
    horizon_days: u32,
    days: Vec<DayAvailability>,
}

#[derive(Serialize)]
struct CheckReport {
    valid: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = match cli.command {
        Commands::Dates { schedule, horizon } => {
            let loaded = load_schedule(&schedule)?;
            let today = resolve_today(horizon.today);
            let dates = scan_horizon(&loaded, today, horizon.horizon);
            to_json(&DatesReport {
                veterinarian_id: loaded.veterinarian_id().to_string(),
                source: loaded.source(),
                today,
                horizon_days: horizon.horizon,
                dates,
            })?
        }
        Commands::Slots {
            schedule,
            appointments,
            date,
        } => {
            ensure_single_stdin(&schedule.rules, appointments.as_deref())?;
            let loaded = load_schedule(&schedule)?;
            let booked = load_appointments(appointments.as_deref())?;
            to_json(&SlotsReport {
                veterinarian_id: loaded.veterinarian_id().to_string(),
                date,
                slots: open_slots_on(&loaded, date, &booked),
            })?
        }
        Commands::Calendar {
            schedule,
            appointments,
            horizon,
        } => {
            ensure_single_stdin(&schedule.rules, appointments.as_deref())?;
            let loaded = load_schedule(&schedule)?;
            let booked = load_appointments(appointments.as_deref())?;
            let today = resolve_today(horizon.today);
            to_json(&CalendarReport {
                veterinarian_id: loaded.veterinarian_id().to_string(),
                today,
                horizon_days: horizon.horizon,
                days: open_calendar(&loaded, &booked, today, horizon.horizon),
            })?
        }
        Commands::CheckRule {
            schedule,
            day,
            start,
            end,
            id,
        } => {
            let rows = read_rows::<StoredRule>(&schedule.rules)?;
            let veterinarian_id = pick_veterinarian(schedule.vet.as_deref(), &rows)?;
            let existing = parse_stored_rules(&veterinarian_id, &rows);

            let day = weekday_from_index(day)?;
            let mut candidate = WeeklyAvailabilityRule::new(veterinarian_id, day, start, end)?;
            candidate.id = id;
            validate_rule(&existing, &candidate).context("Rule rejected")?;
            to_json(&CheckReport { valid: true })?
        }
        Commands::CheckBooking {
            schedule,
            appointments,
            date,
            time,
        } => {
            ensure_single_stdin(&schedule.rules, appointments.as_deref())?;
            let loaded = load_schedule(&schedule)?;
            let booked = load_appointments(appointments.as_deref())?;
            let request = BookingRequest {
                veterinarian_id: loaded.veterinarian_id().to_string(),
                date,
                time,
            };
            check_booking(&loaded, &booked, &request).context("Booking rejected")?;
            to_json(&CheckReport { valid: true })?
        }
    };

    write_output(cli.output.as_deref(), &json)
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` applies unless `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// The clock is only read here; the engine always receives an explicit date.
fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

/// Load rule rows and resolve the effective schedule for one veterinarian.
///
/// Rows belonging to other veterinarians are ignored.
fn load_schedule(args: &ScheduleArgs) -> Result<WeeklySchedule> {
    let rows = read_rows::<StoredRule>(&args.rules)?;
    let veterinarian_id = pick_veterinarian(args.vet.as_deref(), &rows)?;
    let schedule = resolve_stored_rules(&veterinarian_id, &rows);
    debug!(
        "Resolved {} rules ({:?}) for veterinarian {}",
        schedule.len(),
        schedule.source(),
        veterinarian_id
    );
    Ok(schedule)
}

fn pick_veterinarian(vet: Option<&str>, rows: &[StoredRule]) -> Result<String> {
    match (vet, rows.first()) {
        (Some(vet), _) => Ok(vet.to_string()),
        (None, Some(row)) => Ok(row.veterinarian_id.clone()),
        (None, None) => anyhow::bail!("--vet is required when the rules list is empty"),
    }
}

fn load_appointments(path: Option<&str>) -> Result<Vec<Appointment>> {
    match path {
        Some(path) => read_rows(path),
        None => Ok(Vec::new()),
    }
}

fn ensure_single_stdin(rules: &str, appointments: Option<&str>) -> Result<()> {
    if rules == "-" && appointments == Some("-") {
        anyhow::bail!("Only one of --rules and --appointments can read from stdin");
    }
    Ok(())
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let source = if path == "-" { None } else { Some(path) };
    let text = read_input(source)?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON rows from {}", path))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    json.push('\n');
    Ok(json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
