// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::audit::{audit_asset, engine_config};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("audit", sub)) => export_audit(conn, sub),
        _ => Ok(()),
    }
}

fn export_audit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let asset_id = sub.get_one::<String>("asset").map(|s| s.trim()).unwrap_or_default();
    let out = sub.get_one::<String>("out").map(|s| s.trim()).unwrap_or_default();

    let (report, _) = audit_asset(conn, asset_id, engine_config(conn, sub)?)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            for state in &report.states {
                wtr.serialize(state)?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&report)?)?;
        }
    }
    println!(
        "Exported {} snapshots of {} to {}",
        report.states.len(),
        asset_id,
        out
    );
    Ok(())
}
