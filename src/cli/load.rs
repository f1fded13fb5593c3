use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::db::get_connection;
use crate::error::{FleetError, Result};
use crate::models::{source_by_key, SourceKind};
use crate::settings::get_data_dir;

pub struct LoadResult {
    pub loaded: usize,
    pub duplicate_file: bool,
}

pub fn run(file: &str, source_key: &str, year: i32, week: u32) -> Result<()> {
    let source =
        source_by_key(source_key).ok_or_else(|| FleetError::UnknownSource(source_key.to_string()))?;
    let conn = get_connection(&get_data_dir().join("fleetbook.db"))?;
    let result = load_file(&conn, Path::new(file), source, year, week)?;

    if result.duplicate_file {
        println!("Skipped: this file was already loaded for {}", source.name());
    } else {
        println!(
            "Loaded {} rows into {} for week {week}/{year}",
            result.loaded,
            source.name()
        );
    }
    Ok(())
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Canonical column names per source schema. Only the driver column is
/// mandatory; missing monetary columns stage as empty strings and parse
/// to zero downstream.
fn columns_for(source: SourceKind) -> &'static [&'static str] {
    match source {
        SourceKind::DispatchA | SourceKind::DispatchB => {
            &["driver", "plate", "amount", "tip", "cash", "payment_method"]
        }
        SourceKind::PlatformA => &["driver", "gross", "cash"],
        SourceKind::PlatformB => &["driver", "net_earnings", "rider_tips", "cash"],
    }
}

pub fn load_file(
    conn: &Connection,
    file_path: &Path,
    source: SourceKind,
    year: i32,
    week: u32,
) -> Result<LoadResult> {
    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt =
            conn.prepare("SELECT 1 FROM loads WHERE checksum = ?1 AND source = ?2")?;
        if stmt.exists(rusqlite::params![checksum, source.key()])? {
            return Ok(LoadResult {
                loaded: 0,
                duplicate_file: true,
            });
        }
    }

    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file));

    let headers = rdr.headers()?.clone();
    let index_of = |name: &str| -> Option<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let wanted = columns_for(source);
    let driver_idx = index_of("driver").ok_or_else(|| {
        FleetError::Other(format!(
            "missing 'driver' column (expected columns: {})",
            wanted.join(", ")
        ))
    })?;
    let indices: Vec<Option<usize>> = wanted.iter().map(|c| index_of(c)).collect();

    conn.execute(
        "INSERT INTO loads (filename, source, year, week, checksum) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            source.key(),
            year,
            week,
            checksum,
        ],
    )?;
    let load_id = conn.last_insert_rowid();

    let mut loaded = 0usize;
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        let field = |idx: &Option<usize>| -> String {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };
        let driver = record.get(driver_idx).unwrap_or_default().trim().to_string();
        if driver.is_empty() {
            continue;
        }

        match source {
            SourceKind::DispatchA | SourceKind::DispatchB => {
                conn.execute(
                    "INSERT INTO revenue_rows (source, year, week, driver_name, plate, amount, tip, cash, payment_method, load_id) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    rusqlite::params![
                        source.key(),
                        year,
                        week,
                        driver,
                        field(&indices[1]),
                        field(&indices[2]),
                        field(&indices[3]),
                        field(&indices[4]),
                        field(&indices[5]),
                        load_id,
                    ],
                )?;
            }
            SourceKind::PlatformA => {
                conn.execute(
                    "INSERT INTO revenue_rows (source, year, week, driver_name, gross, cash, load_id) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![
                        source.key(),
                        year,
                        week,
                        driver,
                        field(&indices[1]),
                        field(&indices[2]),
                        load_id,
                    ],
                )?;
            }
            SourceKind::PlatformB => {
                conn.execute(
                    "INSERT INTO revenue_rows (source, year, week, driver_name, net_earnings, rider_tips, cash, load_id) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![
                        source.key(),
                        year,
                        week,
                        driver,
                        field(&indices[1]),
                        field(&indices[2]),
                        field(&indices[3]),
                        load_id,
                    ],
                )?;
            }
        }
        loaded += 1;
    }

    conn.execute(
        "UPDATE loads SET row_count = ?1 WHERE id = ?2",
        rusqlite::params![loaded as i64, load_id],
    )?;

    Ok(LoadResult {
        loaded,
        duplicate_file: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_dispatch_rows() {
        let (dir, conn) = test_db();
        let path = write_csv(
            dir.path(),
            "dispatch.csv",
            "driver,plate,amount,tip,cash,payment_method\n\
             Jose Garcia,1234,\"100,00\",\"10,00\",\"20,00\",Card\n\
             Maria Hernandez,5678,\"80,00\",0,0,Bar\n",
        );
        let r = load_file(&conn, &path, SourceKind::DispatchA, 2026, 34).unwrap();
        assert_eq!(r.loaded, 2);
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM revenue_rows WHERE source = 'dispatch-a' AND week = 34",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
        let amount: String = conn
            .query_row(
                "SELECT amount FROM revenue_rows WHERE driver_name = 'Jose Garcia'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(amount, "100,00");
    }

    #[test]
    fn test_load_duplicate_file_skipped() {
        let (dir, conn) = test_db();
        let path = write_csv(
            dir.path(),
            "b.csv",
            "driver,net_earnings,rider_tips,cash\nJose Garcia,\"150,00\",\"10,00\",0\n",
        );
        let r1 = load_file(&conn, &path, SourceKind::PlatformB, 2026, 34).unwrap();
        assert_eq!(r1.loaded, 1);
        let r2 = load_file(&conn, &path, SourceKind::PlatformB, 2026, 34).unwrap();
        assert!(r2.duplicate_file);
        assert_eq!(r2.loaded, 0);
    }

    #[test]
    fn test_load_same_file_different_source_allowed() {
        let (dir, conn) = test_db();
        let path = write_csv(
            dir.path(),
            "generic.csv",
            "driver,gross,cash\nJose Garcia,\"200,00\",0\n",
        );
        load_file(&conn, &path, SourceKind::PlatformA, 2026, 34).unwrap();
        let r = load_file(&conn, &path, SourceKind::DispatchA, 2026, 34).unwrap();
        assert!(!r.duplicate_file);
    }

    #[test]
    fn test_load_missing_driver_column_is_error() {
        let (dir, conn) = test_db();
        let path = write_csv(dir.path(), "bad.csv", "name,gross\nJose,100\n");
        let result = load_file(&conn, &path, SourceKind::PlatformA, 2026, 34);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_skips_blank_driver_rows() {
        let (dir, conn) = test_db();
        let path = write_csv(
            dir.path(),
            "blank.csv",
            "driver,gross,cash\nJose Garcia,\"200,00\",0\n,\"99,00\",0\n",
        );
        let r = load_file(&conn, &path, SourceKind::PlatformA, 2026, 34).unwrap();
        assert_eq!(r.loaded, 1);
    }

    #[test]
    fn test_load_missing_optional_columns_stage_empty() {
        let (dir, conn) = test_db();
        let path = write_csv(dir.path(), "thin.csv", "driver\nJose Garcia\n");
        let r = load_file(&conn, &path, SourceKind::PlatformA, 2026, 34).unwrap();
        assert_eq!(r.loaded, 1);
        let gross: String = conn
            .query_row("SELECT gross FROM revenue_rows LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(gross, "");
    }
}
