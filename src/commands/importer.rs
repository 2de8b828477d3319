// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{insert_transaction, load_asset};
use crate::models::RawTransaction;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use rusqlite::Connection;
use std::collections::HashSet;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("trades", sub)) => {
            let path = sub.get_one::<String>("path").map(|s| s.trim()).unwrap_or_default();
            let n = import_trades(conn, path)?;
            println!("Imported {} transactions from {}", n, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Every row goes through the factory; one bad row rejects the whole file.
pub fn import_trades(conn: &mut Connection, path: &str) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut known_assets: HashSet<String> = HashSet::new();
    let mut count = 0;

    for (idx, result) in rdr.deserialize::<RawTransaction>().enumerate() {
        // header is line 1
        let line = idx + 2;
        let raw = result.with_context(|| format!("Malformed CSV row at line {}", line))?;
        let note = raw.note.clone().filter(|n| !n.is_empty());
        let record = raw
            .into_transaction()
            .with_context(|| format!("Rejected transaction at line {}", line))?;

        if !known_assets.contains(&record.asset_id) {
            load_asset(&tx, &record.asset_id).with_context(|| format!("Line {}", line))?;
            known_assets.insert(record.asset_id.clone());
        }

        insert_transaction(&tx, &record, note.as_deref())
            .with_context(|| format!("Line {}", line))?;
        count += 1;
    }
    tx.commit()?;
    Ok(count)
}
