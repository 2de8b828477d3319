// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::resolve;
use crate::db::{load_asset, load_transactions};
use crate::engine::{EngineConfig, ValuationEngine, ValuationReport};
use crate::trace::{TraceRecorder, TraceRow};
use crate::utils::{align_numeric, fmt_pnl, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asset_id = sub
        .get_one::<String>("asset")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let cfg = engine_config(conn, sub)?;
    let (report, trace) = audit_asset(conn, &asset_id, cfg)?;

    if sub.get_flag("jsonl") {
        maybe_print_json(false, true, &report.states)?;
        return Ok(());
    }
    if maybe_print_json(sub.get_flag("json"), false, &report)? {
        return Ok(());
    }

    println!("{}", trace_table(&trace.rows));
    if !report.anomalies.is_empty() {
        let rows = report
            .anomalies
            .iter()
            .map(|a| vec![a.transaction_id().to_string(), a.describe()])
            .collect();
        println!("{}", pretty_table(&["Anomaly", "Detail"], rows));
    }
    println!("Realized PnL: {:.2}", report.total_realized_pnl());
    Ok(())
}

/// Stored engine settings with `--precision` / `--same-day` applied.
pub fn engine_config(conn: &Connection, sub: &clap::ArgMatches) -> Result<EngineConfig> {
    resolve(
        conn,
        sub.get_one::<u32>("precision").copied(),
        sub.get_one::<String>("same-day").map(String::as_str),
    )
}

/// Run the engine over one stored asset.
pub fn audit_asset(
    conn: &Connection,
    asset_id: &str,
    cfg: EngineConfig,
) -> Result<(ValuationReport, TraceRecorder)> {
    load_asset(conn, asset_id)?;
    let txs = load_transactions(conn, asset_id)?;
    let engine = ValuationEngine::new(cfg)?;
    let mut trace = TraceRecorder::default();
    let report = engine.run_observed(&txs, &mut trace)?;
    Ok((report, trace))
}

pub fn trace_table(rows: &[TraceRow]) -> comfy_table::Table {
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                r.transaction_id.clone(),
                r.r#type.to_string(),
                format!("{:.4}", r.quantity),
                format!("{:.2}", r.price_per_unit),
                format!("{:.4}", r.avg_cost_after),
                format!("{:.2}", r.inventory_value_after),
                fmt_pnl(&r.realized_pnl),
            ]
        })
        .collect();
    let mut table = pretty_table(
        &["Date", "Id", "Type", "Qty", "Price", "Avg Cost", "Value", "PnL"],
        data,
    );
    align_numeric(&mut table, 3);
    table
}
