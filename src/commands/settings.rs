// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{KEY_PRECISION, KEY_SAME_DAY, load_engine_config, save_precision, save_same_day_order};
use crate::engine::SameDayOrder;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let cfg = load_engine_config(conn)?;
            let rows = vec![
                vec![KEY_PRECISION.to_string(), cfg.working_precision.to_string()],
                vec![KEY_SAME_DAY.to_string(), cfg.same_day_order.to_string()],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set-precision", sub)) => {
            let digits = sub.get_one::<u32>("DIGITS").copied().unwrap_or_default();
            save_precision(conn, digits)?;
            println!("Working precision set to {} significant digits", digits);
        }
        Some(("set-same-day", sub)) => {
            let raw = sub.get_one::<String>("ORDER").map(String::as_str).unwrap_or_default();
            let order: SameDayOrder = raw.parse()?;
            save_same_day_order(conn, order)?;
            println!("Same-day order set to {}", order);
        }
        _ => {}
    }
    Ok(())
}
