use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::get_data_dir;

pub fn run() -> Result<()> {
    let data_dir = get_data_dir();
    let db_path = data_dir.join("fleetbook.db");
    println!("Data directory: {}", data_dir.display());

    if !db_path.exists() {
        println!("Database not initialized. Run 'fleetbook init' first.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let mut table = Table::new();
    table.set_header(vec!["Table", "Rows"]);
    for name in ["drivers", "vehicles", "loads", "revenue_rows", "expenses", "settlements"] {
        let count: i64 = conn.query_row(&format!("SELECT count(*) FROM {name}"), [], |r| r.get(0))?;
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    println!("{table}");

    let pending: i64 = conn.query_row(
        "SELECT count(*) FROM expenses WHERE is_settled = 0",
        [],
        |r| r.get(0),
    )?;
    if pending > 0 {
        println!("Pending expenses: {pending}");
    }
    Ok(())
}
