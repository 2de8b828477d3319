// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{insert_asset, list_assets, set_market_price};
use crate::models::Asset;
use crate::rounding::round_currency;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("price", sub)) => price(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn required<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("--{} is required", name))
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let name = required(sub, "name")?;
    let currency = required(sub, "currency")?.to_uppercase();
    let market_price = match sub.get_one::<String>("price") {
        Some(raw) => Some(round_currency(parse_decimal("price", raw)?)),
        None => None,
    };
    insert_asset(
        conn,
        &Asset {
            id: id.to_string(),
            name: name.to_string(),
            currency: currency.clone(),
            market_price,
        },
    )?;
    println!("Added asset {} ({}) {}", id, name, currency);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let assets = list_assets(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &assets)? {
        let rows = assets
            .into_iter()
            .map(|a| {
                vec![
                    a.id,
                    a.name,
                    a.currency,
                    a.market_price
                        .map(|p| format!("{:.2}", p))
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Id", "Name", "CCY", "Price"], rows));
    }
    Ok(())
}

fn price(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let px = round_currency(parse_decimal("price", required(sub, "price")?)?);
    set_market_price(conn, id, px)?;
    println!("Market price of {} set to {}", id, px);
    Ok(())
}
