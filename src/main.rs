mod aggregate;
mod cli;
mod db;
mod engine;
mod error;
mod fmt;
mod matcher;
mod models;
mod normalize;
mod present;
mod settings;
mod settle;

use clap::Parser;
use colored::Colorize;

use cli::{resolve_year, Cli, Commands, DriversCommands, ExpenseCommands, VehiclesCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Drivers { command } => match command {
            DriversCommands::Add { name, deal } => cli::drivers::add(&name, deal.as_deref()),
            DriversCommands::List => cli::drivers::list(),
        },
        Commands::Vehicles { command } => match command {
            VehiclesCommands::Add { plate, label } => cli::vehicles::add(&plate, label.as_deref()),
            VehiclesCommands::List => cli::vehicles::list(),
        },
        Commands::Deal { command } => cli::deal::dispatch(command),
        Commands::Expense { command } => match command {
            ExpenseCommands::Add {
                driver,
                amount,
                category,
                week,
                year,
                detail,
            } => cli::expense::add(
                &driver,
                &amount,
                &category,
                resolve_year(year),
                week,
                detail.as_deref(),
            ),
            ExpenseCommands::List { driver, week, year } => {
                cli::expense::list(driver.as_deref(), resolve_year(year), week)
            }
        },
        Commands::Load {
            file,
            source,
            week,
            year,
        } => cli::load::run(&file, &source, resolve_year(year), week),
        Commands::Settle {
            driver,
            vehicle,
            week,
            year,
            fuel,
            new_rider,
            save,
            replace,
        } => cli::settle::run(
            &driver,
            &vehicle,
            resolve_year(year),
            week,
            fuel.as_deref(),
            new_rider.as_deref(),
            save,
            replace,
        ),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("{}", format!("Error: {e}").red());
        std::process::exit(1);
    }
}
