// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::audit::{audit_asset, engine_config};
use crate::db::load_asset;
use crate::position::PositionSummary;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asset_id = sub
        .get_one::<String>("asset")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let price_override = match sub.get_one::<String>("price") {
        Some(raw) => Some(parse_decimal("price", raw)?),
        None => None,
    };
    let summary = position_for(conn, sub, &asset_id, price_override)?;

    if !maybe_print_json(sub.get_flag("json"), false, &summary)? {
        let rows = vec![vec![
            summary.asset_id.clone(),
            format!("{:.4}", summary.units),
            format!("{:.4}", summary.avg_cost),
            format!("{:.2}", summary.investment_amount),
            format!("{:.2}", summary.market_price),
            format!("{:.2}", summary.market_value),
            format!("{:.2}", summary.unrealized_pnl),
            format!("{:.2}%", summary.return_ratio * Decimal::ONE_HUNDRED),
        ]];
        println!(
            "{}",
            pretty_table(
                &["Asset", "Units", "Avg Cost", "Invested", "Price", "Value", "Unrealized", "Return"],
                rows,
            )
        );
    }
    Ok(())
}

pub fn position_for(
    conn: &Connection,
    sub: &clap::ArgMatches,
    asset_id: &str,
    price_override: Option<Decimal>,
) -> Result<PositionSummary> {
    let asset = load_asset(conn, asset_id)?;
    let market_price = price_override.or(asset.market_price).ok_or_else(|| {
        anyhow!(
            "No market price for asset '{}'; set one with `asset price` or pass --price",
            asset_id
        )
    })?;
    let (report, _) = audit_asset(conn, asset_id, engine_config(conn, sub)?)?;
    PositionSummary::from_latest(asset_id, report.last(), market_price)
        .with_context(|| format!("Position of asset '{}'", asset_id))
}
