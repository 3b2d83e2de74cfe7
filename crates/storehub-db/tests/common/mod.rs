#![allow(dead_code)]

use storehub_db::{execute_query, LogicalQuery, SqliteDatabase};

pub const SCHEMA: &[&str] = &[
    "CREATE TABLE stores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT NOT NULL
    )",
    "CREATE TABLE menu_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        price REAL NOT NULL,
        store_id INTEGER NOT NULL REFERENCES stores(id),
        image_url TEXT
    )",
];

pub async fn setup() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .unwrap_or_else(|e| panic!("Failed to open in-memory database: {e}"));
    for ddl in SCHEMA {
        execute_query(&db, &LogicalQuery::new(*ddl), None)
            .await
            .unwrap_or_else(|e| panic!("Failed to create schema: {e}"));
    }
    db
}

pub async fn count(db: &SqliteDatabase, table: &str) -> i64 {
    let query = LogicalQuery::new(format!("SELECT COUNT(*) AS n FROM {table}"));
    let out = execute_query(db, &query, None)
        .await
        .unwrap_or_else(|e| panic!("Failed to count {table}: {e}"));
    out.rows[0].get_i64("n").unwrap_or_default()
}
