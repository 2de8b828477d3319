// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction construction.
//!
//! `total_amount` is computed once here and is the cash impact every later
//! step trusts: gross plus fees for a buy, gross minus fees for a sell, rounded
//! to cents. Construction does not judge economic sanity; a zero or negative
//! quantity is accepted as given.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::TransactionError;
use crate::models::{RawTransaction, Transaction, TransactionType};
use crate::rounding::{DecimalContext, round_currency};

impl Transaction {
    pub fn buy(
        id: impl Into<String>,
        asset_id: impl Into<String>,
        date: NaiveDate,
        quantity: Decimal,
        price_per_unit: Decimal,
        fees: Option<Decimal>,
    ) -> Result<Self, TransactionError> {
        Self::new(
            TransactionType::Buy,
            id.into(),
            asset_id.into(),
            date,
            quantity,
            price_per_unit,
            fees.unwrap_or(Decimal::ZERO),
        )
    }

    pub fn sell(
        id: impl Into<String>,
        asset_id: impl Into<String>,
        date: NaiveDate,
        quantity: Decimal,
        price_per_unit: Decimal,
        fees: Option<Decimal>,
    ) -> Result<Self, TransactionError> {
        Self::new(
            TransactionType::Sell,
            id.into(),
            asset_id.into(),
            date,
            quantity,
            price_per_unit,
            fees.unwrap_or(Decimal::ZERO),
        )
    }

    fn new(
        r#type: TransactionType,
        id: String,
        asset_id: String,
        date: NaiveDate,
        quantity: Decimal,
        price_per_unit: Decimal,
        fees: Decimal,
    ) -> Result<Self, TransactionError> {
        let ctx = DecimalContext::default();
        let total = ctx.mul(quantity, price_per_unit).and_then(|gross| match r#type {
            TransactionType::Buy => ctx.add(gross, fees),
            TransactionType::Sell => ctx.sub(gross, fees),
        });
        let total_amount = match total {
            Ok(t) => round_currency(t),
            Err(source) => return Err(TransactionError::Arithmetic { id, source }),
        };
        Ok(Self {
            id,
            asset_id,
            date,
            r#type,
            quantity,
            price_per_unit,
            fees,
            total_amount,
        })
    }
}

/// Strict `YYYY-MM-DD`.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, TransactionError> {
    let s = raw.trim();
    if s.len() != 10 {
        return Err(TransactionError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TransactionError::InvalidDate(s.to_string()))
}

pub fn parse_exact_decimal(field: &'static str, raw: &str) -> Result<Decimal, TransactionError> {
    let s = raw.trim();
    Decimal::from_str_exact(s).map_err(|_| TransactionError::InvalidDecimal {
        field,
        value: s.to_string(),
    })
}

impl RawTransaction {
    /// Validate and coerce every field, then build through the typed factory.
    pub fn into_transaction(self) -> Result<Transaction, TransactionError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(TransactionError::MissingField("id"));
        }
        let asset_id = self.asset_id.trim().to_string();
        if asset_id.is_empty() {
            return Err(TransactionError::MissingField("asset_id"));
        }
        let r#type: TransactionType = self.r#type.parse()?;
        let date = parse_iso_date(&self.date)?;
        let quantity = parse_exact_decimal("quantity", &self.quantity)?;
        let price = parse_exact_decimal("price_per_unit", &self.price_per_unit)?;
        let fees = match self.fees.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_exact_decimal("fees", raw)?),
            _ => None,
        };
        match r#type {
            TransactionType::Buy => Transaction::buy(id, asset_id, date, quantity, price, fees),
            TransactionType::Sell => Transaction::sell(id, asset_id, date, quantity, price, fees),
        }
    }
}
