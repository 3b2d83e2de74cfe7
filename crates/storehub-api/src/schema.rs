//! Table definitions for the dashboard, per engine.
//!
//! MySQL refreshes `updated_at` through `ON UPDATE CURRENT_TIMESTAMP`; the
//! other engines rely on update handlers adding the assignment themselves.

use storehub_db::{execute_query, Database, DialectMode, LogicalQuery};
use tracing::info;

use crate::error::Result;

/// Tables in creation order; children follow the tables they reference.
pub const TABLES: [&str; 4] = ["stores", "menu_items", "menu_photos", "fare_rates"];

const MYSQL: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS stores (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        category VARCHAR(100) NOT NULL,
        email VARCHAR(255) NULL,
        phone_number VARCHAR(50) NULL,
        logo_url TEXT NOT NULL,
        location TEXT NOT NULL,
        longitude DECIMAL(11, 8) NOT NULL,
        latitude DECIMAL(10, 8) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS menu_items (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        price DECIMAL(10, 2) NOT NULL,
        store_id INT NOT NULL,
        image_url TEXT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        FOREIGN KEY (store_id) REFERENCES stores(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS menu_photos (
        id INT AUTO_INCREMENT PRIMARY KEY,
        photo_url TEXT NOT NULL,
        store_id INT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        FOREIGN KEY (store_id) REFERENCES stores(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS fare_rates (
        id INT AUTO_INCREMENT PRIMARY KEY,
        base_fare DECIMAL(10, 2) NOT NULL,
        rate_per_km DECIMAL(10, 2) NOT NULL,
        other_charges DECIMAL(10, 2) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
    )",
];

const POSTGRES: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS stores (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        category VARCHAR(100) NOT NULL,
        email VARCHAR(255),
        phone_number VARCHAR(50),
        logo_url TEXT NOT NULL,
        location TEXT NOT NULL,
        longitude DECIMAL(11, 8) NOT NULL,
        latitude DECIMAL(10, 8) NOT NULL,
        created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS menu_items (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        price DECIMAL(10, 2) NOT NULL,
        store_id INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
        image_url TEXT,
        created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS menu_photos (
        id SERIAL PRIMARY KEY,
        photo_url TEXT NOT NULL,
        store_id INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS fare_rates (
        id SERIAL PRIMARY KEY,
        base_fare DECIMAL(10, 2) NOT NULL,
        rate_per_km DECIMAL(10, 2) NOT NULL,
        other_charges DECIMAL(10, 2) NOT NULL,
        created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )",
];

// REAL rather than DECIMAL: NUMERIC affinity would store 120.0 as an integer.
const SQLITE: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS stores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        email TEXT,
        phone_number TEXT,
        logo_url TEXT NOT NULL,
        location TEXT NOT NULL,
        longitude REAL NOT NULL,
        latitude REAL NOT NULL,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS menu_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        price REAL NOT NULL,
        store_id INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
        image_url TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS menu_photos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        photo_url TEXT NOT NULL,
        store_id INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS fare_rates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        base_fare REAL NOT NULL,
        rate_per_km REAL NOT NULL,
        other_charges REAL NOT NULL,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    )",
];

/// Returns the `CREATE TABLE` statements for `dialect`, in [`TABLES`] order.
#[must_use]
pub fn ddl(dialect: DialectMode) -> &'static [&'static str; 4] {
    match dialect {
        DialectMode::MySql => &MYSQL,
        DialectMode::Postgres => &POSTGRES,
        DialectMode::Sqlite => &SQLITE,
    }
}

/// Creates any missing tables and the default fare rate row.
///
/// The dashboard edits a single fare rate with id 1, so it is inserted with
/// zero charges when absent. Safe to run repeatedly.
///
/// # Errors
///
/// Returns the first statement failure reported by the database.
pub async fn init_schema(db: &dyn Database) -> Result<()> {
    let dialect = db.dialect();
    let statements: Vec<LogicalQuery> = ddl(dialect)
        .iter()
        .map(|sql| LogicalQuery::new(*sql))
        .collect();

    // MySQL commits DDL implicitly, so the statements run one by one.
    for (table, statement) in TABLES.iter().zip(&statements) {
        execute_query(db, statement, None).await?;
        info!(table = %table, dialect = %dialect, "Table ready");
    }

    let existing = execute_query(
        db,
        &LogicalQuery::new("SELECT id FROM fare_rates WHERE id = ?").bind(1),
        None,
    )
    .await?;
    if existing.rows.is_empty() {
        execute_query(
            db,
            &LogicalQuery::new(
                "INSERT INTO fare_rates (id, base_fare, rate_per_km, other_charges) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(1)
            .bind(0.0)
            .bind(0.0)
            .bind(0.0),
            None,
        )
        .await?;
        info!("Default fare rate created");
    }

    Ok(())
}
