// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::audit::audit_asset;
use crate::config::load_engine_config;
use crate::db::list_assets;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = diagnose(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Transactions whose asset is not registered
    let mut stmt = conn.prepare(
        "SELECT id, asset_id FROM transactions
         WHERE asset_id NOT IN (SELECT id FROM assets) ORDER BY seq",
    )?;
    let orphans = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    for orphan in orphans {
        let (id, asset_id) = orphan?;
        rows.push(vec![
            "unknown_asset".into(),
            format!("{} references '{}'", id, asset_id),
        ]);
    }

    // 2) Oversold history per asset
    let cfg = load_engine_config(conn)?;
    for asset in list_assets(conn)? {
        let (report, _) = audit_asset(conn, &asset.id, cfg)?;
        for anomaly in &report.anomalies {
            rows.push(vec!["oversold".into(), format!("{}: {}", asset.id, anomaly.describe())]);
        }
    }
    Ok(rows)
}
