// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Diagnostic side channel for valuation runs.
//!
//! Observers see every processed row and every anomaly but cannot influence
//! the computation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::TransactionType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRow {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub r#type: TransactionType,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub avg_cost_after: Decimal,
    pub inventory_value_after: Decimal,
    pub realized_pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// A sell asked for more units than were held when it was applied.
    Oversold {
        transaction_id: String,
        date: NaiveDate,
        requested: Decimal,
        available: Decimal,
    },
}

impl Anomaly {
    pub fn transaction_id(&self) -> &str {
        match self {
            Anomaly::Oversold { transaction_id, .. } => transaction_id,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Anomaly::Oversold {
                transaction_id,
                date,
                requested,
                available,
            } => format!(
                "{} {}: selling {} but only {} held",
                date, transaction_id, requested, available
            ),
        }
    }
}

pub trait ValuationObserver {
    fn on_row(&mut self, _row: &TraceRow) {}
    fn on_anomaly(&mut self, _anomaly: &Anomaly) {}
}

impl ValuationObserver for () {}

/// Routes the trace to `tracing`: rows at debug, anomalies at warn.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ValuationObserver for TracingObserver {
    fn on_row(&mut self, row: &TraceRow) {
        tracing::debug!(
            transaction_id = %row.transaction_id,
            date = %row.date,
            side = %row.r#type,
            quantity = %row.quantity,
            price = %row.price_per_unit,
            avg_cost = %row.avg_cost_after,
            value = %row.inventory_value_after,
            pnl = %row.realized_pnl,
            "applied transaction"
        );
    }

    fn on_anomaly(&mut self, anomaly: &Anomaly) {
        match anomaly {
            Anomaly::Oversold {
                transaction_id,
                date,
                requested,
                available,
            } => tracing::warn!(
                transaction_id = %transaction_id,
                date = %date,
                requested = %requested,
                available = %available,
                "sell exceeds held units"
            ),
        }
    }
}

/// Keeps the full trace for rendering and forwards it to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct TraceRecorder {
    pub rows: Vec<TraceRow>,
    pub anomalies: Vec<Anomaly>,
}

impl ValuationObserver for TraceRecorder {
    fn on_row(&mut self, row: &TraceRow) {
        TracingObserver.on_row(row);
        self.rows.push(row.clone());
    }

    fn on_anomaly(&mut self, anomaly: &Anomaly) {
        TracingObserver.on_anomaly(anomaly);
        self.anomalies.push(anomaly.clone());
    }
}
