// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod factory;
pub mod logging;
pub mod models;
pub mod position;
pub mod rounding;
pub mod trace;
pub mod utils;

pub use engine::{
    EngineConfig, Holding, SameDayOrder, ValuationEngine, ValuationReport, calculate_average_cost,
};
pub use error::{ArithmeticError, ConfigError, TransactionError, ValuationError};
pub use models::{InventoryState, Transaction, TransactionType};
pub use rounding::{DecimalContext, round_currency, round_units};
pub use trace::{Anomaly, TraceRow, ValuationObserver};
