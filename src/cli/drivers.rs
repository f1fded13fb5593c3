use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{FleetError, Result};
use crate::fmt::money;
use crate::models::{Deal, DealConfig};
use crate::settings::get_data_dir;

pub(crate) fn parse_deal_key(key: &str) -> Result<Deal> {
    match key {
        "percentage" => Ok(Deal::Percentage),
        "fixed_fee" => Ok(Deal::FixedFee {
            weekly_fee: 0.0,
            bonus_threshold: 0.0,
        }),
        "custom" => Ok(Deal::Custom),
        other => Err(FleetError::Other(format!(
            "unknown deal type '{other}' (expected percentage, fixed_fee, or custom)"
        ))),
    }
}

pub fn add(name: &str, deal_key: Option<&str>) -> Result<()> {
    let deal = parse_deal_key(deal_key.unwrap_or("percentage"))?;
    let cfg = DealConfig::defaults_for(deal);

    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;
    conn.execute(
        "INSERT INTO drivers (name, deal_type, factor_taxi, factor_rideshare_a, \
         factor_rideshare_b, factor_new_rider, factor_fuel, factor_garage) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            name,
            deal.key(),
            cfg.factors.taxi,
            cfg.factors.rideshare_a,
            cfg.factors.rideshare_b,
            cfg.factors.new_rider,
            cfg.factors.fuel,
            cfg.factors.garage,
        ],
    )?;
    println!("Added driver: {name} ({})", deal.key());
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;
    let mut stmt = conn.prepare(
        "SELECT id, name, deal_type, weekly_fee, bonus_threshold, monthly_garage_cost \
         FROM drivers ORDER BY name",
    )?;
    let rows: Vec<(i64, String, String, f64, f64, f64)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Deal", "Weekly fee", "Threshold", "Garage/month"]);
    for (id, name, deal, fee, threshold, garage) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(deal),
            Cell::new(money(fee)),
            Cell::new(money(threshold)),
            Cell::new(money(garage)),
        ]);
    }
    println!("Drivers\n{table}");
    Ok(())
}
