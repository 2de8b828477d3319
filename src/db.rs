// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;

use crate::models::{Asset, Transaction, TransactionType};
use crate::utils::parse_date;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Avgcost", "avgcost"));

pub const DB_ENV: &str = "AVGCOST_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("avgcost.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn = Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS assets(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        currency TEXT NOT NULL,
        market_price TEXT
    );

    -- decimals are stored as exact text; total_amount is written once by the factory
    CREATE TABLE IF NOT EXISTS transactions(
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        asset_id TEXT NOT NULL,
        date TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('BUY','SELL')),
        quantity TEXT NOT NULL,
        price_per_unit TEXT NOT NULL,
        fees TEXT NOT NULL DEFAULT '0',
        total_amount TEXT NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_asset_date ON transactions(asset_id, date);
    "#,
    )?;
    Ok(())
}

fn stored_decimal(raw: &str, what: &str, tx_id: &str) -> Result<Decimal> {
    Decimal::from_str_exact(raw)
        .with_context(|| format!("Invalid stored {} '{}' for transaction {}", what, raw, tx_id))
}

pub fn insert_transaction(conn: &Connection, tx: &Transaction, note: Option<&str>) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, asset_id, date, type, quantity, price_per_unit, fees, total_amount, note)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            tx.id,
            tx.asset_id,
            tx.date.to_string(),
            tx.r#type.as_str(),
            tx.quantity.to_string(),
            tx.price_per_unit.to_string(),
            tx.fees.to_string(),
            tx.total_amount.to_string(),
            note
        ],
    )
    .with_context(|| format!("Insert transaction '{}'", tx.id))?;
    Ok(())
}

/// Transactions of one asset in entry order.
pub fn load_transactions(conn: &Connection, asset_id: &str) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, asset_id, date, type, quantity, price_per_unit, fees, total_amount
         FROM transactions WHERE asset_id=?1 ORDER BY seq",
    )?;
    let rows = stmt.query_map([asset_id], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, String>(7)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, asset_id, date_s, type_s, qty_s, price_s, fee_s, total_s) = row?;
        let date = parse_date(&date_s)
            .with_context(|| format!("Invalid stored date '{}' for transaction {}", date_s, id))?;
        let r#type: TransactionType = type_s
            .parse()
            .with_context(|| format!("Invalid stored type for transaction {}", id))?;
        out.push(Transaction {
            quantity: stored_decimal(&qty_s, "quantity", &id)?,
            price_per_unit: stored_decimal(&price_s, "price", &id)?,
            fees: stored_decimal(&fee_s, "fees", &id)?,
            total_amount: stored_decimal(&total_s, "total amount", &id)?,
            id,
            asset_id,
            date,
            r#type,
        });
    }
    Ok(out)
}

pub fn delete_transaction(conn: &Connection, id: &str) -> Result<()> {
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", [id])?;
    if n == 0 {
        return Err(anyhow!("Transaction '{}' not found", id));
    }
    Ok(())
}

/// Next free `<asset>-<n>` id.
pub fn next_transaction_id(conn: &Connection, asset_id: &str) -> Result<String> {
    let max_seq: Option<i64> = conn.query_row("SELECT MAX(seq) FROM transactions", [], |r| r.get(0))?;
    let mut n = max_seq.unwrap_or(0) + 1;
    loop {
        let candidate = format!("{}-{}", asset_id, n);
        let taken: Option<i64> = conn
            .query_row("SELECT 1 FROM transactions WHERE id=?1", [&candidate], |r| r.get(0))
            .optional()?;
        if taken.is_none() {
            return Ok(candidate);
        }
        n += 1;
    }
}

pub fn insert_asset(conn: &Connection, asset: &Asset) -> Result<()> {
    conn.execute(
        "INSERT INTO assets(id, name, currency, market_price) VALUES (?1,?2,?3,?4)",
        params![
            asset.id,
            asset.name,
            asset.currency,
            asset.market_price.map(|p| p.to_string())
        ],
    )
    .with_context(|| format!("Insert asset '{}'", asset.id))?;
    Ok(())
}

pub fn set_market_price(conn: &Connection, asset_id: &str, price: Decimal) -> Result<()> {
    let n = conn.execute(
        "UPDATE assets SET market_price=?1 WHERE id=?2",
        params![price.to_string(), asset_id],
    )?;
    if n == 0 {
        return Err(anyhow!("Asset '{}' not found", asset_id));
    }
    Ok(())
}

fn asset_from_row(id: String, name: String, currency: String, price: Option<String>) -> Result<Asset> {
    let market_price = match price {
        Some(p) => Some(
            Decimal::from_str_exact(&p)
                .with_context(|| format!("Invalid stored market price '{}' for asset {}", p, id))?,
        ),
        None => None,
    };
    Ok(Asset {
        id,
        name,
        currency,
        market_price,
    })
}

pub fn load_asset(conn: &Connection, asset_id: &str) -> Result<Asset> {
    let row: Option<(String, String, String, Option<String>)> = conn
        .query_row(
            "SELECT id, name, currency, market_price FROM assets WHERE id=?1",
            [asset_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?;
    let (id, name, currency, price) = row.with_context(|| format!("Asset '{}' not found", asset_id))?;
    asset_from_row(id, name, currency, price)
}

pub fn list_assets(conn: &Connection) -> Result<Vec<Asset>> {
    let mut stmt = conn.prepare("SELECT id, name, currency, market_price FROM assets ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, currency, price) = row?;
        out.push(asset_from_row(id, name, currency, price)?);
    }
    Ok(out)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", [key], |r| r.get(0))
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn stored_transactions_keep_their_total_and_order() {
        let conn = conn();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d = |s: &str| Decimal::from_str(s).unwrap();
        let sell = Transaction::sell("s", "gold", date, d("1"), d("10.005"), None).unwrap();
        let buy = Transaction::buy("b", "gold", date, d("2"), d("10"), Some(d("0.10"))).unwrap();
        insert_transaction(&conn, &sell, None).unwrap();
        insert_transaction(&conn, &buy, Some("top up")).unwrap();

        let loaded = load_transactions(&conn, "gold").unwrap();
        assert_eq!(loaded, vec![sell, buy]);
        assert_eq!(loaded[0].total_amount.to_string(), "10.01");
        assert!(load_transactions(&conn, "silver").unwrap().is_empty());
    }

    #[test]
    fn next_id_skips_taken_ids() {
        let conn = conn();
        assert_eq!(next_transaction_id(&conn, "gold").unwrap(), "gold-1");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let tx = Transaction::buy("gold-2", "gold", date, Decimal::ONE, Decimal::ONE, None).unwrap();
        insert_transaction(&conn, &tx, None).unwrap();
        assert_eq!(next_transaction_id(&conn, "gold").unwrap(), "gold-3");
    }

    #[test]
    fn settings_upsert() {
        let conn = conn();
        assert_eq!(get_setting(&conn, "k").unwrap(), None);
        set_setting(&conn, "k", "1").unwrap();
        set_setting(&conn, "k", "2").unwrap();
        assert_eq!(get_setting(&conn, "k").unwrap().as_deref(), Some("2"));
    }
}
