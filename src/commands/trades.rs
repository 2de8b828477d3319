// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{delete_transaction, insert_transaction, load_asset, load_transactions, next_transaction_id};
use crate::models::{RawTransaction, Transaction, TransactionType};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("buy", sub)) => {
            record_trade(conn, sub, TransactionType::Buy)?;
        }
        Some(("sell", sub)) => {
            record_trade(conn, sub, TransactionType::Sell)?;
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("delete", sub)) => {
            let id = sub.get_one::<String>("id").map(|s| s.trim()).unwrap_or_default();
            delete_transaction(conn, id)?;
            println!("Deleted transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn arg_or_empty(sub: &clap::ArgMatches, name: &str) -> String {
    sub.get_one::<String>(name)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Build a transaction from CLI input through the factory and store it.
pub fn record_trade(
    conn: &Connection,
    sub: &clap::ArgMatches,
    side: TransactionType,
) -> Result<Transaction> {
    let asset_id = arg_or_empty(sub, "asset");
    load_asset(conn, &asset_id)?;
    let id = match sub.get_one::<String>("id").map(|s| s.trim()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => next_transaction_id(conn, &asset_id)?,
    };
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    let raw = RawTransaction {
        id,
        asset_id,
        date: arg_or_empty(sub, "date"),
        r#type: side.as_str().to_string(),
        quantity: arg_or_empty(sub, "quantity"),
        price_per_unit: arg_or_empty(sub, "price"),
        fees: sub.get_one::<String>("fees").cloned(),
        note: note.map(str::to_string),
    };
    let tx = raw.into_transaction().context("Rejected transaction")?;
    insert_transaction(conn, &tx, note)?;
    println!(
        "Recorded {} {} {} x {} @ {} (fees {}, total {})",
        tx.id, tx.r#type, tx.asset_id, tx.quantity, tx.price_per_unit, tx.fees, tx.total_amount
    );
    Ok(tx)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asset_id = arg_or_empty(sub, "asset");
    let txs = load_transactions(conn, &asset_id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &txs)? {
        let rows = txs
            .into_iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.id,
                    t.r#type.to_string(),
                    format!("{:.4}", t.quantity),
                    format!("{:.2}", t.price_per_unit),
                    format!("{:.2}", t.fees),
                    format!("{:.2}", t.total_amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Id", "Type", "Qty", "Price", "Fees", "Total"], rows)
        );
    }
    Ok(())
}
