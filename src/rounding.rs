// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rounding primitives and the decimal working context.
//!
//! Every stored amount goes through one of two fixed-scale roundings:
//! currency (2 dp) for cash amounts and units (4 dp) for unit balances and
//! average costs. Both round half away from zero and always carry their full
//! scale, so `30000` is stored as `30000.00`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ArithmeticError, ConfigError};

pub const CURRENCY_DP: u32 = 2;
pub const UNIT_DP: u32 = 4;
pub const MAX_PRECISION: u32 = 28;
pub const DEFAULT_PRECISION: u32 = 28;

fn round_fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Round to cents, half-up.
pub fn round_currency(value: Decimal) -> Decimal {
    round_fixed(value, CURRENCY_DP)
}

/// Round to 4 decimal places, half-up. Used for unit counts and average cost.
pub fn round_units(value: Decimal) -> Decimal {
    round_fixed(value, UNIT_DP)
}

/// Significant-digit working precision applied to every intermediate result.
///
/// An engine owns its context; two engines with different precisions never
/// interfere with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    precision: u32,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl DecimalContext {
    pub fn new(precision: u32) -> Result<Self, ConfigError> {
        if precision == 0 || precision > MAX_PRECISION {
            return Err(ConfigError::PrecisionOutOfRange(precision));
        }
        Ok(Self { precision })
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    fn fit(&self, value: Decimal) -> Decimal {
        value
            .round_sf_with_strategy(self.precision, RoundingStrategy::MidpointNearestEven)
            .unwrap_or(value)
    }

    pub fn add(&self, a: Decimal, b: Decimal) -> Result<Decimal, ArithmeticError> {
        a.checked_add(b)
            .map(|v| self.fit(v))
            .ok_or(ArithmeticError::Overflow)
    }

    pub fn sub(&self, a: Decimal, b: Decimal) -> Result<Decimal, ArithmeticError> {
        a.checked_sub(b)
            .map(|v| self.fit(v))
            .ok_or(ArithmeticError::Overflow)
    }

    pub fn mul(&self, a: Decimal, b: Decimal) -> Result<Decimal, ArithmeticError> {
        a.checked_mul(b)
            .map(|v| self.fit(v))
            .ok_or(ArithmeticError::Overflow)
    }

    pub fn div(&self, a: Decimal, b: Decimal) -> Result<Decimal, ArithmeticError> {
        if b.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        a.checked_div(b)
            .map(|v| self.fit(v))
            .ok_or(ArithmeticError::Overflow)
    }
}
