pub mod deal;
pub mod drivers;
pub mod expense;
pub mod init;
pub mod load;
pub mod settle;
pub mod status;
pub mod vehicles;

use clap::{Parser, Subcommand};

/// Default the year to the current ISO-week year when not given.
pub(crate) fn resolve_year(year: Option<i32>) -> i32 {
    use chrono::Datelike;
    year.unwrap_or_else(|| chrono::Local::now().iso_week().year())
}

#[derive(Parser)]
#[command(
    name = "fleetbook",
    about = "Weekly driver settlement CLI for small vehicle-for-hire fleets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up fleetbook: choose a data directory and initialize the database.
    Init {
        /// Path for fleetbook data (default: ~/Documents/fleetbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage drivers.
    Drivers {
        #[command(subcommand)]
        command: DriversCommands,
    },
    /// Manage vehicles.
    Vehicles {
        #[command(subcommand)]
        command: VehiclesCommands,
    },
    /// Configure a driver's deal.
    Deal {
        #[command(subcommand)]
        command: DealCommands,
    },
    /// Manage pending expense entries.
    Expense {
        #[command(subcommand)]
        command: ExpenseCommands,
    },
    /// Stage pre-parsed revenue rows from a canonical CSV.
    Load {
        /// Path to CSV file with the source's canonical columns
        file: String,
        /// Source key: dispatch-a, dispatch-b, platform-a, platform-b
        #[arg(long)]
        source: String,
        /// ISO week number the rows belong to
        #[arg(long)]
        week: u32,
        /// ISO week year (default: current)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Evaluate a driver's weekly settlement.
    Settle {
        /// Driver display name
        driver: String,
        /// Vehicle plate
        #[arg(long)]
        vehicle: String,
        /// ISO week number
        #[arg(long)]
        week: u32,
        /// ISO week year (default: current)
        #[arg(long)]
        year: Option<i32>,
        /// Fuel spend for the week
        #[arg(long)]
        fuel: Option<String>,
        /// New-rider referral revenue for the week
        #[arg(long = "new-rider")]
        new_rider: Option<String>,
        /// Persist the settlement and clear the week's pending expenses
        #[arg(long)]
        save: bool,
        /// Overwrite an existing settlement for the same driver/vehicle/week
        #[arg(long)]
        replace: bool,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum DriversCommands {
    /// Add a driver.
    Add {
        /// Driver display name, e.g. 'Jose Garcia'
        name: String,
        /// Deal model: percentage, fixed_fee, custom (default: percentage)
        #[arg(long)]
        deal: Option<String>,
    },
    /// List all drivers.
    List,
}

#[derive(Subcommand)]
pub enum VehiclesCommands {
    /// Add a vehicle.
    Add {
        /// Plate, e.g. 'B-TX 1234'
        plate: String,
        /// Friendly label
        #[arg(long)]
        label: Option<String>,
    },
    /// List all vehicles.
    List,
}

#[derive(Subcommand)]
pub enum DealCommands {
    /// Update a driver's deal configuration.
    Set {
        /// Driver display name
        driver: String,
        /// Deal model: percentage, fixed_fee, custom. Switching the model
        /// resets the factors to its defaults before flags apply.
        #[arg(long = "type")]
        deal_type: Option<String>,
        /// Fixed weekly fee (fixed_fee deals)
        #[arg(long = "fee")]
        weekly_fee: Option<f64>,
        /// Revenue threshold above which the 10% bonus applies
        #[arg(long)]
        threshold: Option<f64>,
        /// Taxi revenue factor, 0.0-1.0
        #[arg(long = "factor-taxi")]
        factor_taxi: Option<f64>,
        /// Rideshare A revenue factor, 0.0-1.0
        #[arg(long = "factor-rideshare-a")]
        factor_rideshare_a: Option<f64>,
        /// Rideshare B revenue factor, 0.0-1.0
        #[arg(long = "factor-rideshare-b")]
        factor_rideshare_b: Option<f64>,
        /// New-rider referral factor, 0.0-1.0
        #[arg(long = "factor-new-rider")]
        factor_new_rider: Option<f64>,
        /// Fuel deduction factor, 0.0-1.0
        #[arg(long = "factor-fuel")]
        factor_fuel: Option<f64>,
        /// Garage deduction factor, 0.0-1.0
        #[arg(long = "factor-garage")]
        factor_garage: Option<f64>,
        /// Monthly garage cost, prorated per week
        #[arg(long = "garage-cost")]
        monthly_garage_cost: Option<f64>,
    },
    /// Show a driver's deal configuration.
    Show {
        /// Driver display name
        driver: String,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add a pending expense for a driver's week.
    Add {
        /// Driver display name
        driver: String,
        /// Amount, locale-tolerant (e.g. '12,50')
        #[arg(long)]
        amount: String,
        /// Category, e.g. wash, repair
        #[arg(long)]
        category: String,
        /// ISO week number
        #[arg(long)]
        week: u32,
        /// ISO week year (default: current)
        #[arg(long)]
        year: Option<i32>,
        /// Free-text detail
        #[arg(long)]
        detail: Option<String>,
    },
    /// List expenses, optionally scoped to a driver.
    List {
        /// Driver display name
        driver: Option<String>,
        /// Only this ISO week
        #[arg(long)]
        week: Option<u32>,
        /// ISO week year (default: current)
        #[arg(long)]
        year: Option<i32>,
    },
}
