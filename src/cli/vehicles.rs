use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_data_dir;

pub fn add(plate: &str, label: Option<&str>) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;
    conn.execute(
        "INSERT INTO vehicles (plate, label) VALUES (?1, ?2)",
        rusqlite::params![plate, label],
    )?;
    println!("Added vehicle: {plate}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;
    let mut stmt = conn.prepare("SELECT id, plate, label FROM vehicles ORDER BY plate")?;
    let rows: Vec<(i64, String, Option<String>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Plate", "Label"]);
    for (id, plate, label) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(plate),
            Cell::new(label.unwrap_or_default()),
        ]);
    }
    println!("Vehicles\n{table}");
    Ok(())
}
