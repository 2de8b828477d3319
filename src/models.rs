// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TransactionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            _ => Err(TransactionError::UnknownType(s.trim().to_string())),
        }
    }
}

/// One economic event for a single asset. Built through the factory in
/// `crate::factory`; `total_amount` is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub asset_id: String,
    pub date: NaiveDate,
    pub r#type: TransactionType,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub fees: Decimal,
    pub total_amount: Decimal,
}

/// Snapshot of the holding after one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryState {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub units_after: Decimal,
    pub avg_cost_after: Decimal,
    pub inventory_value_after: Decimal,
    pub realized_pnl: Decimal,
}

/// Unvalidated transaction fields as they arrive from a CSV row or the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    pub id: String,
    pub asset_id: String,
    pub date: String,
    pub r#type: String,
    pub quantity: String,
    pub price_per_unit: String,
    #[serde(default)]
    pub fees: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub market_price: Option<Decimal>,
}
