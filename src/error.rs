// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("decimal overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,
}

/// Raised while building a transaction from raw economic inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid {field} '{value}': not an exact decimal")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("Unknown transaction type '{0}', expected BUY or SELL")]
    UnknownType(String),

    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Total amount of transaction '{id}' cannot be computed: {source}")]
    Arithmetic {
        id: String,
        #[source]
        source: ArithmeticError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    #[error(
        "Transaction '{transaction_id}' belongs to asset '{found}', expected '{expected}'"
    )]
    MixedAssets {
        transaction_id: String,
        expected: String,
        found: String,
    },

    #[error("Applying transaction '{transaction_id}' failed: {source}")]
    Arithmetic {
        transaction_id: String,
        #[source]
        source: ArithmeticError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Working precision {0} out of range, expected 1..=28 significant digits")]
    PrecisionOutOfRange(u32),

    #[error("Unknown same-day order '{0}', expected input|buys-first|id")]
    UnknownSameDayOrder(String),
}
