// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::factory::{parse_exact_decimal, parse_iso_date};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    parse_iso_date(s).with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

pub fn parse_decimal(field: &'static str, s: &str) -> Result<Decimal> {
    Ok(parse_exact_decimal(field, s)?)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Right-align every column after the first `text_cols`.
pub fn align_numeric(table: &mut Table, text_cols: usize) {
    let count = table.column_count();
    for idx in text_cols..count {
        if let Some(col) = table.column_mut(idx) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Realized PnL cell: a dash when nothing was realized.
pub fn fmt_pnl(d: &Decimal) -> String {
    if d.is_zero() {
        "-".to_string()
    } else {
        format!("{:.2}", d)
    }
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pnl_dash_for_zero() {
        assert_eq!(fmt_pnl(&Decimal::from_str("0.00").unwrap()), "-");
        assert_eq!(fmt_pnl(&Decimal::from_str("-3.1").unwrap()), "-3.10");
    }

    #[test]
    fn decimal_errors_name_the_field() {
        let err = parse_decimal("price_per_unit", "12,5").unwrap_err();
        assert!(err.to_string().contains("Invalid price_per_unit '12,5'"));
    }
}
