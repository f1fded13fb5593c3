use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{DealConfig, Driver, Factors, Vehicle};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS drivers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    deal_type TEXT NOT NULL DEFAULT 'percentage',
    weekly_fee REAL DEFAULT 0,
    bonus_threshold REAL DEFAULT 0,
    factor_taxi REAL DEFAULT 0.5,
    factor_rideshare_a REAL DEFAULT 0.5,
    factor_rideshare_b REAL DEFAULT 0.5,
    factor_new_rider REAL DEFAULT 0.5,
    factor_fuel REAL DEFAULT 0.5,
    factor_garage REAL DEFAULT 0.5,
    monthly_garage_cost REAL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS vehicles (
    id INTEGER PRIMARY KEY,
    plate TEXT NOT NULL UNIQUE,
    label TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS loads (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    source TEXT NOT NULL,
    year INTEGER NOT NULL,
    week INTEGER NOT NULL,
    row_count INTEGER,
    checksum TEXT,
    loaded_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS revenue_rows (
    id INTEGER PRIMARY KEY,
    source TEXT NOT NULL,
    year INTEGER NOT NULL,
    week INTEGER NOT NULL,
    driver_name TEXT NOT NULL,
    plate TEXT,
    amount TEXT,
    tip TEXT,
    cash TEXT,
    payment_method TEXT,
    gross TEXT,
    net_earnings TEXT,
    rider_tips TEXT,
    load_id INTEGER,
    FOREIGN KEY (load_id) REFERENCES loads(id)
);

CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    driver_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    week INTEGER NOT NULL,
    amount REAL NOT NULL,
    category TEXT NOT NULL,
    detail TEXT,
    is_settled INTEGER DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS settlements (
    id INTEGER PRIMARY KEY,
    driver_id INTEGER NOT NULL,
    driver_name TEXT NOT NULL,
    vehicle_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    week INTEGER NOT NULL,
    share REAL NOT NULL,
    income REAL NOT NULL,
    final_result REAL NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE (driver_id, vehicle_id, year, week)
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Load a driver and their stored deal configuration.
///
/// Returns the driver plus a flag set when the stored deal type was
/// unrecognized and Percentage defaults were substituted — the caller
/// warns, the run proceeds.
pub fn get_driver(conn: &Connection, name: &str) -> Result<Option<(Driver, bool)>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, deal_type, weekly_fee, bonus_threshold, \
         factor_taxi, factor_rideshare_a, factor_rideshare_b, \
         factor_new_rider, factor_fuel, factor_garage, monthly_garage_cost \
         FROM drivers WHERE name = ?1",
    )?;
    let row = stmt.query_row([name], |row| {
        let factors = Factors {
            taxi: row.get(5)?,
            rideshare_a: row.get(6)?,
            rideshare_b: row.get(7)?,
            new_rider: row.get(8)?,
            fuel: row.get(9)?,
            garage: row.get(10)?,
        };
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, f64>(4)?,
            factors,
            row.get::<_, f64>(11)?,
        ))
    });
    match row {
        Ok((id, name, deal_key, fee, threshold, factors, garage)) => {
            let (deal, fallback) =
                match DealConfig::from_stored(&deal_key, fee, threshold, factors, garage) {
                    Some(cfg) => (cfg, false),
                    None => (DealConfig::default(), true),
                };
            Ok(Some((Driver { id, name, deal }, fallback)))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_vehicle(conn: &Connection, plate: &str) -> Result<Option<Vehicle>> {
    let mut stmt = conn.prepare("SELECT id, plate, label FROM vehicles WHERE plate = ?1")?;
    let row = stmt.query_row([plate], |row| {
        Ok(Vehicle {
            id: row.get(0)?,
            plate: row.get(1)?,
            label: row.get(2)?,
        })
    });
    match row {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Deal;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["drivers", "vehicles", "loads", "revenue_rows", "expenses", "settlements"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_get_driver_defaults_to_percentage() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO drivers (name) VALUES ('Jose Garcia')", [])
            .unwrap();
        let (driver, fallback) = get_driver(&conn, "Jose Garcia").unwrap().unwrap();
        assert!(!fallback);
        assert_eq!(driver.deal.deal, Deal::Percentage);
        assert_eq!(driver.deal.factors.taxi, 0.5);
    }

    #[test]
    fn test_get_driver_unknown_deal_falls_back() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO drivers (name, deal_type) VALUES ('Jose Garcia', 'P')",
            [],
        )
        .unwrap();
        let (driver, fallback) = get_driver(&conn, "Jose Garcia").unwrap().unwrap();
        assert!(fallback);
        assert_eq!(driver.deal, DealConfig::default());
    }

    #[test]
    fn test_get_driver_missing() {
        let (_dir, conn) = test_db();
        assert!(get_driver(&conn, "Nobody").unwrap().is_none());
    }

    #[test]
    fn test_settlement_unique_key() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO settlements (driver_id, driver_name, vehicle_id, year, week, share, income, final_result) \
             VALUES (1, 'Jose Garcia', 1, 2026, 34, 45.0, 45.0, 45.0)",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO settlements (driver_id, driver_name, vehicle_id, year, week, share, income, final_result) \
             VALUES (1, 'Jose Garcia', 1, 2026, 34, 50.0, 50.0, 40.0)",
            [],
        );
        assert!(dup.is_err());
    }
}
