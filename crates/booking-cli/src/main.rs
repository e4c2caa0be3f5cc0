//! `booking` CLI — query opening hours, free slots and bookings held in a
//! JSON schedule file.
//!
//! ## Usage
//!
//! ```sh
//! # Effective opening hours of a date
//! booking -s schedule.json day 2025-06-02
//!
//! # Open/closed overview for a date range
//! booking -s schedule.json calendar 2025-06-01 2025-06-30
//!
//! # Free slots for service 1 on a 30-minute grid
//! booking -s schedule.json --step 30 slots 2025-06-02 --service 1
//!
//! # Validate a start time
//! booking -s schedule.json check 2025-06-02T10:30:00 --service 1
//!
//! # Book it and write the schedule back
//! booking -s schedule.json book 2025-06-02T11:00:00 --service 1 \
//!     --name "Aino Virtanen" --email aino@example.fi --save
//!
//! # Cancel booking 7
//! booking -s schedule.json cancel 7 --save
//! ```
//!
//! Results are printed as JSON on stdout. Logs go to stderr and follow
//! `RUST_LOG`, falling back to `--log-level`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use booking_engine::time::{format_timestamp, parse_date, parse_timestamp};
use booking_engine::{
    BookingEngine, Customer, EngineConfig, InMemoryStore, Schedule, SlotCheck, SlotStep,
};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use mockable::{Clock, DefaultClock};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "booking",
    version,
    about = "Appointment availability and bookings from a schedule file"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Schedule file (JSON)
    #[arg(short, long, env = "BOOKING_SCHEDULE")]
    schedule: PathBuf,

    /// Local timestamp to use as "now" instead of the system clock
    #[arg(long, env = "BOOKING_NOW")]
    now: Option<String>,

    /// Slot grid step in minutes (15 or 30)
    #[arg(long, env = "BOOKING_SLOT_STEP", default_value_t = 15)]
    step: u32,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective opening hours of a date
    Day {
        /// Date (YYYY-MM-DD)
        date: String,
    },
    /// Show open/closed status for every date in a range
    Calendar {
        /// First date (YYYY-MM-DD)
        from: String,
        /// Last date, inclusive (YYYY-MM-DD)
        to: String,
    },
    /// List free slots for a service on a date
    Slots {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Service id
        #[arg(long)]
        service: u64,
    },
    /// Check whether a service can start at a given time
    Check {
        /// Start time (ISO 8601)
        start: String,
        /// Service id
        #[arg(long)]
        service: u64,
    },
    /// Create a booking
    Book {
        /// Start time (ISO 8601)
        start: String,
        /// Service id
        #[arg(long)]
        service: u64,
        /// Customer name
        #[arg(long)]
        name: String,
        /// Customer e-mail
        #[arg(long)]
        email: String,
        /// Customer phone number
        #[arg(long)]
        phone: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Write the updated schedule back to the file
        #[arg(long)]
        save: bool,
    },
    /// Show a booking
    Show {
        /// Booking id
        id: u64,
    },
    /// Cancel a booking
    Cancel {
        /// Booking id
        id: u64,
        /// Write the updated schedule back to the file
        #[arg(long)]
        save: bool,
    },
    /// Mark a booking as completed
    Complete {
        /// Booking id
        id: u64,
        /// Write the updated schedule back to the file
        #[arg(long)]
        save: bool,
    },
}

/// Clock pinned to the `--now` timestamp.
struct FixedClock(DateTime<Local>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let step = SlotStep::try_from(cli.step)?;
    let clock = build_clock(cli.now.as_deref())?;
    let store = Arc::new(load_store(&cli.schedule)?);
    let engine = BookingEngine::new(store, clock, EngineConfig { slot_step: step });
    debug!(schedule = %cli.schedule.display(), now = %engine.now(), "engine ready");

    match cli.command {
        Commands::Day { date } => {
            let day = engine.resolve_day(parse_date(&date)?)?;
            print_json(&day)?;
        }
        Commands::Calendar { from, to } => {
            let days = engine.resolve_range(parse_date(&from)?, parse_date(&to)?)?;
            print_json(&days)?;
        }
        Commands::Slots { date, service } => {
            let slots = engine.list_slots(parse_date(&date)?, service)?;
            print_json(&slots)?;
        }
        Commands::Check { start, service } => {
            let start = parse_timestamp(&start)?;
            let outcome = match engine.check_slot(start, service)? {
                SlotCheck::Available { end_time } => json!({
                    "available": true,
                    "start_time": format_timestamp(start),
                    "end_time": format_timestamp(end_time),
                }),
                SlotCheck::Unavailable { reason } => json!({
                    "available": false,
                    "reason": reason.to_string(),
                }),
            };
            print_json(&outcome)?;
        }
        Commands::Book {
            start,
            service,
            name,
            email,
            phone,
            notes,
            save,
        } => {
            let customer = Customer {
                name,
                email,
                phone,
                notes,
            };
            let booking = engine.create_booking(parse_timestamp(&start)?, service, customer)?;
            if save {
                save_store(engine.store(), &cli.schedule)?;
            }
            print_json(&booking)?;
        }
        Commands::Show { id } => {
            print_json(&engine.get_booking(id)?)?;
        }
        Commands::Cancel { id, save } => {
            let booking = engine.cancel_booking(id)?;
            if save {
                save_store(engine.store(), &cli.schedule)?;
            }
            print_json(&booking)?;
        }
        Commands::Complete { id, save } => {
            let booking = engine.complete_booking(id)?;
            if save {
                save_store(engine.store(), &cli.schedule)?;
            }
            print_json(&booking)?;
        }
    }

    Ok(())
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_clock(now: Option<&str>) -> Result<Arc<dyn Clock>> {
    let Some(raw) = now else {
        return Ok(Arc::new(DefaultClock));
    };
    let naive: NaiveDateTime = parse_timestamp(raw)?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("'{}' does not exist in the local time zone", raw))?;
    Ok(Arc::new(FixedClock(local)))
}

fn load_store(path: &Path) -> Result<InMemoryStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schedule: {}", path.display()))?;
    let schedule = Schedule::from_json(&json)
        .with_context(|| format!("Failed to parse schedule: {}", path.display()))?;
    InMemoryStore::from_schedule(schedule)
        .with_context(|| format!("Invalid schedule: {}", path.display()))
}

fn save_store(store: &InMemoryStore, path: &Path) -> Result<()> {
    let json = store.snapshot()?.to_json_pretty()?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write schedule: {}", path.display()))?;
    info!(schedule = %path.display(), "schedule saved");
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
