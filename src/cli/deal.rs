use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::cli::DealCommands;
use crate::db::{get_connection, get_driver};
use crate::error::{FleetError, Result};
use crate::fmt::money;
use crate::models::{Deal, DealConfig};
use crate::settings::get_data_dir;

use super::drivers::parse_deal_key;

fn driver_id(conn: &Connection, name: &str) -> Result<i64> {
    conn.query_row("SELECT id FROM drivers WHERE name = ?1", [name], |row| {
        row.get(0)
    })
    .map_err(|_| FleetError::UnknownDriver(name.to_string()))
}

fn check_factor(label: &str, value: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        return Err(FleetError::Other(format!(
            "{label} must be between 0.0 and 1.0 (got {value})"
        )));
    }
    Ok(value)
}

pub fn dispatch(cmd: DealCommands) -> Result<()> {
    match cmd {
        DealCommands::Set {
            driver,
            deal_type,
            weekly_fee,
            threshold,
            factor_taxi,
            factor_rideshare_a,
            factor_rideshare_b,
            factor_new_rider,
            factor_fuel,
            factor_garage,
            monthly_garage_cost,
        } => set(
            &driver,
            deal_type.as_deref(),
            weekly_fee,
            threshold,
            [
                ("factor-taxi", "factor_taxi", factor_taxi),
                ("factor-rideshare-a", "factor_rideshare_a", factor_rideshare_a),
                ("factor-rideshare-b", "factor_rideshare_b", factor_rideshare_b),
                ("factor-new-rider", "factor_new_rider", factor_new_rider),
                ("factor-fuel", "factor_fuel", factor_fuel),
                ("factor-garage", "factor_garage", factor_garage),
            ],
            monthly_garage_cost,
        ),
        DealCommands::Show { driver } => show(&driver),
    }
}

#[allow(clippy::too_many_arguments)]
fn set(
    driver: &str,
    deal_type: Option<&str>,
    weekly_fee: Option<f64>,
    threshold: Option<f64>,
    factors: [(&str, &str, Option<f64>); 6],
    monthly_garage_cost: Option<f64>,
) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;
    let id = driver_id(&conn, driver)?;

    if let Some(key) = deal_type {
        let deal = parse_deal_key(key)?;
        let defaults = DealConfig::defaults_for(deal);
        // Switching the model resets factors to its defaults first.
        conn.execute(
            "UPDATE drivers SET deal_type = ?1, factor_taxi = ?2, factor_rideshare_a = ?3, \
             factor_rideshare_b = ?4, factor_new_rider = ?5, factor_fuel = ?6, factor_garage = ?7 \
             WHERE id = ?8",
            rusqlite::params![
                deal.key(),
                defaults.factors.taxi,
                defaults.factors.rideshare_a,
                defaults.factors.rideshare_b,
                defaults.factors.new_rider,
                defaults.factors.fuel,
                defaults.factors.garage,
                id,
            ],
        )?;
    }

    if let Some(fee) = weekly_fee {
        conn.execute(
            "UPDATE drivers SET weekly_fee = ?1 WHERE id = ?2",
            rusqlite::params![fee, id],
        )?;
    }
    if let Some(t) = threshold {
        conn.execute(
            "UPDATE drivers SET bonus_threshold = ?1 WHERE id = ?2",
            rusqlite::params![t, id],
        )?;
    }
    for (flag, column, value) in factors {
        if let Some(v) = value {
            let v = check_factor(flag, v)?;
            // Column names are fixed above, never user input.
            conn.execute(
                &format!("UPDATE drivers SET {column} = ?1 WHERE id = ?2"),
                rusqlite::params![v, id],
            )?;
        }
    }
    if let Some(g) = monthly_garage_cost {
        conn.execute(
            "UPDATE drivers SET monthly_garage_cost = ?1 WHERE id = ?2",
            rusqlite::params![g, id],
        )?;
    }

    println!("Updated deal for {driver}");
    Ok(())
}

fn show(driver: &str) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;
    let (d, fallback) =
        get_driver(&conn, driver)?.ok_or_else(|| FleetError::UnknownDriver(driver.to_string()))?;
    if fallback {
        eprintln!(
            "{} stored deal type was unrecognized; showing percentage defaults",
            "warning:".yellow()
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("Deal"), Cell::new(d.deal.deal.key())]);
    if let Deal::FixedFee {
        weekly_fee,
        bonus_threshold,
    } = d.deal.deal
    {
        table.add_row(vec![Cell::new("Weekly fee"), Cell::new(money(weekly_fee))]);
        table.add_row(vec![Cell::new("Threshold"), Cell::new(money(bonus_threshold))]);
    }
    let f = d.deal.factors;
    for (label, v) in [
        ("Factor taxi", f.taxi),
        ("Factor rideshare A", f.rideshare_a),
        ("Factor rideshare B", f.rideshare_b),
        ("Factor new rider", f.new_rider),
        ("Factor fuel", f.fuel),
        ("Factor garage", f.garage),
    ] {
        table.add_row(vec![Cell::new(label), Cell::new(format!("{v:.2}"))]);
    }
    table.add_row(vec![
        Cell::new("Garage/month"),
        Cell::new(money(d.deal.monthly_garage_cost)),
    ]);
    println!("Deal for {}\n{table}", d.name);
    Ok(())
}
