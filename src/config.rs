// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::{get_setting, set_setting};
use crate::engine::{EngineConfig, SameDayOrder};

pub const KEY_PRECISION: &str = "working_precision";
pub const KEY_SAME_DAY: &str = "same_day_order";

/// Engine configuration persisted in the store, defaults for missing keys.
pub fn load_engine_config(conn: &Connection) -> Result<EngineConfig> {
    let mut cfg = EngineConfig::default();
    if let Some(raw) = get_setting(conn, KEY_PRECISION)? {
        cfg.working_precision = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid stored {} '{}'", KEY_PRECISION, raw))?;
    }
    if let Some(raw) = get_setting(conn, KEY_SAME_DAY)? {
        cfg.same_day_order = raw
            .parse()
            .with_context(|| format!("Invalid stored {} '{}'", KEY_SAME_DAY, raw))?;
    }
    cfg.validate()?;
    Ok(cfg)
}

pub fn save_precision(conn: &Connection, precision: u32) -> Result<()> {
    EngineConfig {
        working_precision: precision,
        ..EngineConfig::default()
    }
    .validate()?;
    set_setting(conn, KEY_PRECISION, &precision.to_string())
}

pub fn save_same_day_order(conn: &Connection, order: SameDayOrder) -> Result<()> {
    set_setting(conn, KEY_SAME_DAY, order.as_str())
}

/// Stored config with per-invocation overrides applied on top.
pub fn resolve(
    conn: &Connection,
    precision: Option<u32>,
    same_day: Option<&str>,
) -> Result<EngineConfig> {
    let mut cfg = load_engine_config(conn)?;
    if let Some(p) = precision {
        cfg.working_precision = p;
    }
    if let Some(s) = same_day {
        cfg.same_day_order = s.parse()?;
    }
    cfg.validate()?;
    Ok(cfg)
}
