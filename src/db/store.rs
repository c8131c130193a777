//! Nyckel/värde-lagring per samling.
//!
//! Funktionerna med suffixet `_in` tar en godtycklig `Connection` så att
//! de kan köras inne i en transaktion; `Store` är samma operationer
//! över databasens delade anslutning.

use rusqlite::{params, Connection, OptionalExtension};

use super::Database;
use crate::models::{Collection, Record};
use crate::utils::error::AppResult;

pub struct Store {
    db: Database,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn get<T: Record>(&self, key: &str) -> AppResult<Option<T>> {
        self.db.with_connection(|conn| get_in(conn, key))
    }

    /// Alla poster i samlingen. Ordningen är inte garanterad; sortera själv.
    pub fn get_all<T: Record>(&self) -> AppResult<Vec<T>> {
        self.db.with_connection(|conn| get_all_in(conn))
    }

    /// Infoga eller ersätt på postens nyckel. Returnerar nyckeln.
    pub fn put<T: Record>(&self, record: &T) -> AppResult<String> {
        self.db.with_connection(|conn| put_in(conn, record))
    }

    /// Ta bort om posten finns. Returnerar om något togs bort.
    pub fn delete<T: Record>(&self, key: &str) -> AppResult<bool> {
        self.db.with_connection(|conn| delete_in::<T>(conn, key))
    }

    pub fn clear(&self, collection: Collection) -> AppResult<usize> {
        self.db.with_connection(|conn| clear_in(conn, collection))
    }

    pub fn count(&self, collection: Collection) -> AppResult<i64> {
        self.db.with_connection(|conn| count_in(conn, collection))
    }

    pub fn exists(&self, collection: Collection, key: &str) -> AppResult<bool> {
        self.db.with_connection(|conn| exists_in(conn, collection, key))
    }
}

pub fn get_in<T: Record>(conn: &Connection, key: &str) -> AppResult<Option<T>> {
    let sql = format!("SELECT body FROM {} WHERE key = ?", T::COLLECTION.table());
    let body: Option<String> = conn
        .query_row(&sql, [key], |row| row.get(0))
        .optional()?;

    match body {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}

pub fn get_all_in<T: Record>(conn: &Connection) -> AppResult<Vec<T>> {
    let sql = format!("SELECT body FROM {} ORDER BY key", T::COLLECTION.table());
    let mut stmt = conn.prepare(&sql)?;

    let bodies = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    bodies
        .iter()
        .map(|body| -> AppResult<T> { Ok(serde_json::from_str(body)?) })
        .collect()
}

pub fn put_in<T: Record>(conn: &Connection, record: &T) -> AppResult<String> {
    let key = record.key();
    let body = serde_json::to_string(record)?;
    let sql = format!(
        "INSERT OR REPLACE INTO {} (key, body, updated_at) VALUES (?1, ?2, datetime('now'))",
        T::COLLECTION.table()
    );
    conn.execute(&sql, params![key, body])?;
    Ok(key)
}

pub fn delete_in<T: Record>(conn: &Connection, key: &str) -> AppResult<bool> {
    let sql = format!("DELETE FROM {} WHERE key = ?", T::COLLECTION.table());
    let rows = conn.execute(&sql, [key])?;
    Ok(rows > 0)
}

pub fn clear_in(conn: &Connection, collection: Collection) -> AppResult<usize> {
    let sql = format!("DELETE FROM {}", collection.table());
    Ok(conn.execute(&sql, [])?)
}

pub fn count_in(conn: &Connection, collection: Collection) -> AppResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

pub fn exists_in(conn: &Connection, collection: Collection, key: &str) -> AppResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE key = ?)", collection.table());
    Ok(conn.query_row(&sql, [key], |row| row.get(0))?)
}
