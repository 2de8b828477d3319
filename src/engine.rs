// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Weighted-average cost valuation.
//!
//! A run sorts one asset's transactions by date and folds a [`Holding`] over
//! them, emitting one [`InventoryState`] per transaction. Buys blend into the
//! average cost; sells realize PnL against it and leave it untouched. After a
//! sell the book value is recomputed as `avg_cost * units` rather than reduced
//! by the sold cost basis, so rounding never accumulates across partial sells.
//!
//! The fold never aborts on bad history: an oversell is applied (units go
//! negative), reported as an [`Anomaly`] and processing continues.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ArithmeticError, ConfigError, ValuationError};
use crate::models::{InventoryState, Transaction, TransactionType};
use crate::rounding::{DEFAULT_PRECISION, DecimalContext, round_currency, round_units};
use crate::trace::{Anomaly, TraceRow, TracingObserver, ValuationObserver};

/// Tie-break for transactions sharing a date. The date sort itself is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SameDayOrder {
    /// Keep the order the transactions were supplied in.
    #[default]
    Input,
    /// Buys before sells; input order within each type.
    BuysFirst,
    /// Lexicographic transaction id.
    Id,
}

impl SameDayOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameDayOrder::Input => "input",
            SameDayOrder::BuysFirst => "buys-first",
            SameDayOrder::Id => "id",
        }
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            SameDayOrder::Input => Ordering::Equal,
            SameDayOrder::BuysFirst => a.r#type.cmp(&b.r#type),
            SameDayOrder::Id => a.id.cmp(&b.id),
        }
    }
}

impl fmt::Display for SameDayOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameDayOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" => Ok(SameDayOrder::Input),
            "buys-first" => Ok(SameDayOrder::BuysFirst),
            "id" => Ok(SameDayOrder::Id),
            other => Err(ConfigError::UnknownSameDayOrder(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Significant digits kept by every intermediate operation.
    pub working_precision: u32,
    pub same_day_order: SameDayOrder,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            working_precision: DEFAULT_PRECISION,
            same_day_order: SameDayOrder::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<DecimalContext, ConfigError> {
        DecimalContext::new(self.working_precision)
    }
}

/// Running state of the fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    pub units: Decimal,
    pub inventory_value: Decimal,
    pub avg_cost: Decimal,
}

impl Default for Holding {
    fn default() -> Self {
        Self {
            units: round_units(Decimal::ZERO),
            inventory_value: round_currency(Decimal::ZERO),
            avg_cost: round_units(Decimal::ZERO),
        }
    }
}

/// Outcome of applying one transaction to a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub holding: Holding,
    pub realized_pnl: Decimal,
    pub oversold: bool,
}

impl Holding {
    pub fn apply(&self, tx: &Transaction, ctx: &DecimalContext) -> Result<Applied, ArithmeticError> {
        match tx.r#type {
            TransactionType::Buy => self.apply_buy(tx, ctx),
            TransactionType::Sell => self.apply_sell(tx, ctx),
        }
    }

    fn apply_buy(&self, tx: &Transaction, ctx: &DecimalContext) -> Result<Applied, ArithmeticError> {
        let inventory_value = round_currency(ctx.add(self.inventory_value, tx.total_amount)?);
        let units = round_units(ctx.add(self.units, tx.quantity)?);
        let avg_cost = if units > Decimal::ZERO {
            round_units(ctx.div(inventory_value, units)?)
        } else {
            round_units(Decimal::ZERO)
        };
        Ok(Applied {
            holding: Holding {
                units,
                inventory_value,
                avg_cost,
            },
            realized_pnl: round_currency(Decimal::ZERO),
            oversold: false,
        })
    }

    fn apply_sell(&self, tx: &Transaction, ctx: &DecimalContext) -> Result<Applied, ArithmeticError> {
        let oversold = tx.quantity > self.units;
        let cost_basis_of_sold = round_currency(ctx.mul(self.avg_cost, tx.quantity)?);
        let realized_pnl = round_currency(ctx.sub(tx.total_amount, cost_basis_of_sold)?);
        let units = round_units(ctx.sub(self.units, tx.quantity)?);
        let inventory_value = round_currency(ctx.mul(self.avg_cost, units)?);
        Ok(Applied {
            holding: Holding {
                units,
                inventory_value,
                avg_cost: self.avg_cost,
            },
            realized_pnl,
            oversold,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValuationReport {
    pub asset_id: Option<String>,
    pub states: Vec<InventoryState>,
    pub anomalies: Vec<Anomaly>,
}

impl ValuationReport {
    pub fn last(&self) -> Option<&InventoryState> {
        self.states.last()
    }

    pub fn total_realized_pnl(&self) -> Decimal {
        round_currency(self.states.iter().map(|s| s.realized_pnl).sum())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ValuationEngine {
    config: EngineConfig,
    ctx: DecimalContext,
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            ctx: DecimalContext::default(),
        }
    }
}

impl ValuationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let ctx = config.validate()?;
        Ok(Self { config, ctx })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Chronological processing order under the configured same-day policy.
    pub fn order<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        let policy = self.config.same_day_order;
        ordered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| policy.compare(a, b)));
        ordered
    }

    pub fn run(&self, transactions: &[Transaction]) -> Result<ValuationReport, ValuationError> {
        self.run_observed(transactions, &mut ())
    }

    pub fn run_observed(
        &self,
        transactions: &[Transaction],
        observer: &mut dyn ValuationObserver,
    ) -> Result<ValuationReport, ValuationError> {
        let asset_id = transactions.first().map(|t| t.asset_id.clone());
        if let Some(expected) = &asset_id {
            if let Some(stray) = transactions.iter().find(|t| &t.asset_id != expected) {
                return Err(ValuationError::MixedAssets {
                    transaction_id: stray.id.clone(),
                    expected: expected.clone(),
                    found: stray.asset_id.clone(),
                });
            }
        }

        let mut report = ValuationReport {
            asset_id,
            states: Vec::with_capacity(transactions.len()),
            anomalies: Vec::new(),
        };
        let mut holding = Holding::default();

        for tx in self.order(transactions) {
            let applied = holding
                .apply(tx, &self.ctx)
                .map_err(|source| ValuationError::Arithmetic {
                    transaction_id: tx.id.clone(),
                    source,
                })?;

            if applied.oversold {
                let anomaly = Anomaly::Oversold {
                    transaction_id: tx.id.clone(),
                    date: tx.date,
                    requested: tx.quantity,
                    available: holding.units,
                };
                observer.on_anomaly(&anomaly);
                report.anomalies.push(anomaly);
            }

            holding = applied.holding;
            let state = InventoryState {
                transaction_id: tx.id.clone(),
                date: tx.date,
                units_after: holding.units,
                avg_cost_after: holding.avg_cost,
                inventory_value_after: holding.inventory_value,
                realized_pnl: applied.realized_pnl,
            };
            observer.on_row(&TraceRow {
                transaction_id: state.transaction_id.clone(),
                date: state.date,
                r#type: tx.r#type,
                quantity: tx.quantity,
                price_per_unit: tx.price_per_unit,
                avg_cost_after: state.avg_cost_after,
                inventory_value_after: state.inventory_value_after,
                realized_pnl: state.realized_pnl,
            });
            report.states.push(state);
        }

        Ok(report)
    }
}

/// Default engine, diagnostics routed to `tracing`.
pub fn calculate_average_cost(
    transactions: &[Transaction],
) -> Result<Vec<InventoryState>, ValuationError> {
    ValuationEngine::default()
        .run_observed(transactions, &mut TracingObserver)
        .map(|report| report.states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn on(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn first_buy_sets_average() {
        let ctx = DecimalContext::default();
        let tx = Transaction::buy("t1", "a", on(1), d("3"), d("10"), Some(d("1"))).unwrap();
        let applied = Holding::default().apply(&tx, &ctx).unwrap();
        assert_eq!(applied.holding.units.to_string(), "3.0000");
        assert_eq!(applied.holding.inventory_value.to_string(), "31.00");
        assert_eq!(applied.holding.avg_cost.to_string(), "10.3333");
        assert_eq!(applied.realized_pnl.to_string(), "0.00");
        assert!(!applied.oversold);
    }

    #[test]
    fn sell_recomputes_value_from_average() {
        let ctx = DecimalContext::default();
        let start = Holding {
            units: d("3.0000"),
            inventory_value: d("31.00"),
            avg_cost: d("10.3333"),
        };
        let tx = Transaction::sell("t2", "a", on(2), d("1"), d("12"), None).unwrap();
        let applied = start.apply(&tx, &ctx).unwrap();
        assert_eq!(applied.holding.units.to_string(), "2.0000");
        assert_eq!(applied.holding.inventory_value.to_string(), "20.67");
        assert_eq!(applied.holding.avg_cost, start.avg_cost);
        assert_eq!(applied.realized_pnl.to_string(), "1.67");
    }

    #[test]
    fn selling_everything_leaves_zero_value_and_keeps_average() {
        let ctx = DecimalContext::default();
        let start = Holding {
            units: d("2.0000"),
            inventory_value: d("20.67"),
            avg_cost: d("10.3333"),
        };
        let tx = Transaction::sell("t3", "a", on(3), d("2"), d("9"), Some(d("0.5"))).unwrap();
        let applied = start.apply(&tx, &ctx).unwrap();
        assert!(applied.holding.units.is_zero());
        assert!(applied.holding.inventory_value.is_zero());
        assert_eq!(applied.holding.avg_cost.to_string(), "10.3333");
        // 17.50 - 20.67
        assert_eq!(applied.realized_pnl.to_string(), "-3.17");
    }

    #[test]
    fn buy_back_to_zero_units_guards_division() {
        let ctx = DecimalContext::default();
        let start = Holding {
            units: d("-1.0000"),
            inventory_value: d("-10.33"),
            avg_cost: d("10.3333"),
        };
        let tx = Transaction::buy("t4", "a", on(4), d("1"), d("10"), None).unwrap();
        let applied = start.apply(&tx, &ctx).unwrap();
        assert!(applied.holding.units.is_zero());
        assert_eq!(applied.holding.avg_cost.to_string(), "0.0000");
    }

    #[test]
    fn oversell_is_flagged_not_fatal() {
        let ctx = DecimalContext::default();
        let start = Holding {
            units: d("1.0000"),
            inventory_value: d("10.00"),
            avg_cost: d("10.0000"),
        };
        let tx = Transaction::sell("t5", "a", on(5), d("3"), d("11"), None).unwrap();
        let applied = start.apply(&tx, &ctx).unwrap();
        assert!(applied.oversold);
        assert_eq!(applied.holding.units.to_string(), "-2.0000");
        assert_eq!(applied.holding.inventory_value.to_string(), "-20.00");
        assert_eq!(applied.realized_pnl.to_string(), "3.00");
    }

    #[test]
    fn same_day_policies() {
        let txs = vec![
            Transaction::sell("b", "a", on(1), d("1"), d("10"), None).unwrap(),
            Transaction::buy("c", "a", on(1), d("1"), d("10"), None).unwrap(),
            Transaction::buy("a", "a", on(1), d("1"), d("10"), None).unwrap(),
        ];
        let ids = |order: SameDayOrder| {
            let engine = ValuationEngine::new(EngineConfig {
                same_day_order: order,
                ..EngineConfig::default()
            })
            .unwrap();
            engine
                .order(&txs)
                .into_iter()
                .map(|t| t.id.as_str())
                .collect::<Vec<_>>()
                .join(",")
        };
        assert_eq!(ids(SameDayOrder::Input), "b,c,a");
        assert_eq!(ids(SameDayOrder::BuysFirst), "c,a,b");
        assert_eq!(ids(SameDayOrder::Id), "a,b,c");
    }

    #[test]
    fn same_day_order_parses() {
        assert_eq!("Buys-First".parse::<SameDayOrder>().unwrap(), SameDayOrder::BuysFirst);
        assert_eq!(
            "random".parse::<SameDayOrder>(),
            Err(ConfigError::UnknownSameDayOrder("random".into()))
        );
    }

    #[test]
    fn engine_rejects_bad_precision() {
        let cfg = EngineConfig {
            working_precision: 40,
            ..EngineConfig::default()
        };
        assert_eq!(
            ValuationEngine::new(cfg).unwrap_err(),
            ConfigError::PrecisionOutOfRange(40)
        );
    }
}
