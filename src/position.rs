// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ArithmeticError;
use crate::models::InventoryState;
use crate::rounding::{DecimalContext, round_currency, round_units};

/// Current holding of one asset marked against a manually entered price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionSummary {
    pub asset_id: String,
    pub units: Decimal,
    pub avg_cost: Decimal,
    /// Book value of the units still held.
    pub investment_amount: Decimal,
    pub market_price: Decimal,
    pub market_value: Decimal,
    pub unrealized_pnl: Decimal,
    /// `unrealized_pnl / investment_amount`, zero without a positive book value.
    pub return_ratio: Decimal,
}

impl PositionSummary {
    pub fn from_latest(
        asset_id: &str,
        latest: Option<&InventoryState>,
        market_price: Decimal,
    ) -> Result<Self, ArithmeticError> {
        let ctx = DecimalContext::default();
        let (units, avg_cost, investment_amount) = match latest {
            Some(s) => (s.units_after, s.avg_cost_after, s.inventory_value_after),
            None => (
                round_units(Decimal::ZERO),
                round_units(Decimal::ZERO),
                round_currency(Decimal::ZERO),
            ),
        };
        let market_value = round_currency(ctx.mul(units, market_price)?);
        let unrealized_pnl = round_currency(ctx.sub(market_value, investment_amount)?);
        let return_ratio = if investment_amount > Decimal::ZERO {
            round_units(ctx.div(unrealized_pnl, investment_amount)?)
        } else {
            round_units(Decimal::ZERO)
        };
        Ok(Self {
            asset_id: asset_id.to_string(),
            units,
            avg_cost,
            investment_amount,
            market_price,
            market_value,
            unrealized_pnl,
            return_ratio,
        })
    }
}
