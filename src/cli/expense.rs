use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::aggregate::parse_amount;
use crate::db::get_connection;
use crate::error::{FleetError, Result};
use crate::fmt::money;
use crate::settings::get_data_dir;

fn driver_id(conn: &Connection, name: &str) -> Result<i64> {
    conn.query_row("SELECT id FROM drivers WHERE name = ?1", [name], |row| {
        row.get(0)
    })
    .map_err(|_| FleetError::UnknownDriver(name.to_string()))
}

pub fn add(
    driver: &str,
    amount: &str,
    category: &str,
    year: i32,
    week: u32,
    detail: Option<&str>,
) -> Result<()> {
    let parsed = parse_amount(amount);
    if parsed < 0.0 {
        return Err(FleetError::Other(format!(
            "expense amount must not be negative (got {amount})"
        )));
    }

    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;
    let id = driver_id(&conn, driver)?;
    conn.execute(
        "INSERT INTO expenses (driver_id, year, week, amount, category, detail) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![id, year, week, parsed, category, detail],
    )?;
    println!(
        "Added expense for {driver}, week {week}/{year}: {} ({category})",
        money(parsed)
    );
    Ok(())
}

pub fn list(driver: Option<&str>, year: i32, week: Option<u32>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;

    let mut clauses = vec!["e.year = ?1".to_string()];
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(year)];
    if let Some(name) = driver {
        let id = driver_id(&conn, name)?;
        params.push(Box::new(id));
        clauses.push(format!("e.driver_id = ?{}", params.len()));
    }
    if let Some(w) = week {
        params.push(Box::new(w));
        clauses.push(format!("e.week = ?{}", params.len()));
    }

    let sql = format!(
        "SELECT d.name, e.week, e.amount, e.category, e.detail, e.is_settled \
         FROM expenses e JOIN drivers d ON e.driver_id = d.id \
         WHERE {} ORDER BY e.week, d.name",
        clauses.join(" AND ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p.as_ref()).collect();
    let rows: Vec<(String, u32, f64, String, Option<String>, bool)> = stmt
        .query_map(param_refs.as_slice(), |row| {
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
    table.set_header(vec!["Driver", "Week", "Amount", "Category", "Detail", "Settled"]);
    for (name, w, amount, category, detail, settled) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(w),
            Cell::new(money(amount)),
            Cell::new(category),
            Cell::new(detail.unwrap_or_default()),
            Cell::new(if settled { "yes" } else { "pending" }),
        ]);
    }
    println!("Expenses {year}\n{table}");
    Ok(())
}
