use colored::Colorize;
use comfy_table::{Cell, Table};
use regex::Regex;
use rusqlite::Connection;

use crate::aggregate::parse_amount;
use crate::db::{get_connection, get_driver, get_vehicle};
use crate::engine::{self, EngineInput, SourceRecords};
use crate::error::{FleetError, Result};
use crate::models::{
    DealConfig, DispatchRecord, ExpenseEntry, LineKind, PlatformARecord, PlatformBRecord,
    RawRecord, SourceKind, ALL_SOURCES,
};
use crate::settings::get_data_dir;

#[allow(clippy::too_many_arguments)]
pub fn run(
    driver_name: &str,
    vehicle_plate: &str,
    year: i32,
    week: u32,
    fuel: Option<&str>,
    new_rider: Option<&str>,
    save: bool,
    replace: bool,
) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;

    let (driver_id, config) = match get_driver(&conn, driver_name)? {
        Some((driver, fallback)) => {
            if fallback {
                println!(
                    "{}",
                    format!(
                        "Warning: unrecognized deal type for {driver_name}, using percentage defaults"
                    )
                    .yellow()
                );
            }
            (driver.id, driver.deal)
        }
        None => {
            println!(
                "Note: no driver record for {driver_name}, settling with percentage defaults"
            );
            (engine::pseudo_driver_id(driver_name), DealConfig::default())
        }
    };

    let vehicle = get_vehicle(&conn, vehicle_plate)?
        .ok_or_else(|| FleetError::UnknownVehicle(vehicle_plate.to_string()))?;
    let frag = plate_fragment(&vehicle.plate);

    let records = load_source_records(&conn, year, week, frag.as_deref())?;
    let expenses = load_pending_expenses(&conn, driver_id, year, week)?;

    let input = EngineInput {
        driver_name: driver_name.to_string(),
        vehicle: vehicle.plate.clone(),
        year,
        week,
        records,
        config,
        fuel_input: fuel.map(parse_amount).unwrap_or(0.0),
        new_rider_input: new_rider.map(parse_amount).unwrap_or(0.0),
        expenses,
    };
    let eval = engine::run(&input);

    print_line_items(&eval.line_items);

    if save {
        save_settlement(
            &conn,
            driver_id,
            driver_name,
            &vehicle,
            year,
            week,
            &eval.settlement,
            replace,
        )?;
        println!("Saved settlement for {driver_name}, week {week}/{year}");
    }
    Ok(())
}

/// Dispatch exports key rows by a bare digit fragment of the plate
/// ("B-TX 1234" rows carry just "1234"). Use the longest digit run.
pub(crate) fn plate_fragment(plate: &str) -> Option<String> {
    let re = Regex::new(r"\d+").ok()?;
    re.find_iter(plate)
        .max_by_key(|m| m.as_str().len())
        .map(|m| m.as_str().to_string())
}

fn load_source_records(
    conn: &Connection,
    year: i32,
    week: u32,
    plate_fragment: Option<&str>,
) -> Result<SourceRecords> {
    let mut records = SourceRecords::default();

    for &kind in ALL_SOURCES {
        let rows: Vec<RawRecord> = if kind.is_dispatch() {
            let frag = plate_fragment.unwrap_or("");
            let mut stmt = conn.prepare(
                "SELECT driver_name, plate, amount, tip, cash, payment_method \
                 FROM revenue_rows \
                 WHERE source = ?1 AND year = ?2 AND week = ?3 AND plate LIKE ?4",
            )?;
            let collected = stmt
                .query_map(
                    rusqlite::params![kind.key(), year, week, format!("%{frag}%")],
                    |row| {
                        Ok(RawRecord::Dispatch(DispatchRecord {
                            driver: row.get(0)?,
                            plate: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                            amount: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                            tip: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                            cash: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                            payment_method: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                        }))
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            collected
        } else if kind == SourceKind::PlatformA {
            let mut stmt = conn.prepare(
                "SELECT driver_name, gross, cash FROM revenue_rows \
                 WHERE source = ?1 AND year = ?2 AND week = ?3",
            )?;
            let collected = stmt
                .query_map(rusqlite::params![kind.key(), year, week], |row| {
                    Ok(RawRecord::PlatformA(PlatformARecord {
                        driver: row.get(0)?,
                        gross: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        cash: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    }))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            collected
        } else {
            let mut stmt = conn.prepare(
                "SELECT driver_name, net_earnings, rider_tips, cash FROM revenue_rows \
                 WHERE source = ?1 AND year = ?2 AND week = ?3",
            )?;
            let collected = stmt
                .query_map(rusqlite::params![kind.key(), year, week], |row| {
                    Ok(RawRecord::PlatformB(PlatformBRecord {
                        driver: row.get(0)?,
                        net_earnings: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        rider_tips: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        cash: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    }))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            collected
        };
        *records.get_mut(kind) = rows;
    }

    Ok(records)
}

fn load_pending_expenses(
    conn: &Connection,
    driver_id: i64,
    year: i32,
    week: u32,
) -> Result<Vec<ExpenseEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, amount, category, detail FROM expenses \
         WHERE driver_id = ?1 AND year = ?2 AND week = ?3 AND is_settled = 0 \
         ORDER BY id",
    )?;
    let entries = stmt
        .query_map(rusqlite::params![driver_id, year, week], |row| {
            Ok(ExpenseEntry {
                id: Some(row.get(0)?),
                amount: row.get(1)?,
                category: row.get(2)?,
                detail: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(entries)
}

fn print_line_items(items: &[crate::models::LineItem]) {
    let mut table = Table::new();
    let mut has_rows = false;

    for item in items {
        match item.kind {
            LineKind::Title => println!("{}\n", item.label.bold()),
            LineKind::Error => println!("{}", item.label.red()),
            LineKind::Summary | LineKind::Value => {
                table.add_row(vec![Cell::new(&item.label), Cell::new(&item.value)]);
                for (label, value) in &item.details {
                    table.add_row(vec![Cell::new(format!("  {label}")), Cell::new(value)]);
                }
                has_rows = true;
            }
        }
    }
    if has_rows {
        println!("{table}");
    }
}

#[allow(clippy::too_many_arguments)]
fn save_settlement(
    conn: &Connection,
    driver_id: i64,
    driver_name: &str,
    vehicle: &crate::models::Vehicle,
    year: i32,
    week: u32,
    settlement: &crate::models::SettlementResult,
    replace: bool,
) -> Result<()> {
    let exists: bool = conn
        .prepare(
            "SELECT 1 FROM settlements \
             WHERE driver_id = ?1 AND vehicle_id = ?2 AND year = ?3 AND week = ?4",
        )?
        .exists(rusqlite::params![driver_id, vehicle.id, year, week])?;
    if exists && !replace {
        return Err(FleetError::SettlementExists {
            driver: driver_name.to_string(),
            vehicle: vehicle.plate.clone(),
            week,
        });
    }

    conn.execute(
        "INSERT OR REPLACE INTO settlements \
         (driver_id, driver_name, vehicle_id, year, week, share, income, final_result) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            driver_id,
            driver_name,
            vehicle.id,
            year,
            week,
            settlement.share,
            settlement.income,
            settlement.final_result,
        ],
    )?;
    conn.execute(
        "UPDATE expenses SET is_settled = 1 \
         WHERE driver_id = ?1 AND year = ?2 AND week = ?3 AND is_settled = 0",
        rusqlite::params![driver_id, year, week],
    )?;
    Ok(())
}
