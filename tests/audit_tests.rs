// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use avgcost::commands::{assets, audit, doctor, position, settings, trades};
use avgcost::{EngineConfig, SameDayOrder, cli, config, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn dispatch(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["avgcost"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("asset", sub)) => assets::handle(conn, sub),
        Some(("trade", sub)) => trades::handle(conn, sub),
        Some(("audit", sub)) => audit::handle(conn, sub),
        Some(("position", sub)) => position::handle(conn, sub),
        Some(("config", sub)) => settings::handle(conn, sub),
        Some(("doctor", _)) => doctor::handle(conn),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn golden_ledger() -> Connection {
    let conn = setup();
    dispatch(&conn, &["asset", "add", "--id", "gold", "--name", "Gold Passbook", "--currency", "twd"]).unwrap();
    for args in [
        ["buy", "t1", "2024-01-01", "10", "3000"],
        ["buy", "t2", "2024-02-01", "10", "3500"],
        ["sell", "t3", "2024-03-01", "5", "4000"],
        ["buy", "t4", "2024-04-01", "11.5", "3491.13043478"],
    ] {
        dispatch(
            &conn,
            &[
                "trade", args[0], "--asset", "gold", "--id", args[1], "--date", args[2],
                "--quantity", args[3], "--price", args[4],
            ],
        )
        .unwrap();
    }
    conn
}

#[test]
fn audit_of_stored_ledger_matches_golden_values() {
    let conn = golden_ledger();
    let (report, trace) = audit::audit_asset(&conn, "gold", EngineConfig::default()).unwrap();
    let last = report.last().unwrap();
    assert_eq!(last.units_after.to_string(), "26.5000");
    assert_eq!(last.inventory_value_after.to_string(), "88898.00");
    assert_eq!(last.avg_cost_after.to_string(), "3354.6415");
    assert_eq!(report.total_realized_pnl().to_string(), "3750.00");
    assert_eq!(trace.rows.len(), 4);
    assert!(trace.anomalies.is_empty());

    dispatch(&conn, &["audit", "--asset", "gold"]).unwrap();
    dispatch(&conn, &["audit", "--asset", "gold", "--json"]).unwrap();
}

#[test]
fn audit_of_unknown_asset_fails() {
    let conn = setup();
    let err = dispatch(&conn, &["audit", "--asset", "nope"]).unwrap_err();
    assert!(err.to_string().contains("Asset 'nope' not found"));
}

#[test]
fn audit_rejects_bad_overrides() {
    let conn = golden_ledger();
    assert!(dispatch(&conn, &["audit", "--asset", "gold", "--precision", "0"]).is_err());
    assert!(dispatch(&conn, &["audit", "--asset", "gold", "--same-day", "random"]).is_err());
}

#[test]
fn stored_same_day_order_drives_the_audit() {
    let conn = setup();
    dispatch(&conn, &["asset", "add", "--id", "etf", "--name", "ETF"]).unwrap();
    for (side, id, date, qty, price) in [
        ("buy", "a", "2024-07-01", "10", "100"),
        ("sell", "b", "2024-07-02", "5", "120"),
        ("buy", "c", "2024-07-02", "10", "130"),
    ] {
        dispatch(
            &conn,
            &[
                "trade", side, "--asset", "etf", "--id", id, "--date", date, "--quantity", qty,
                "--price", price,
            ],
        )
        .unwrap();
    }

    let cfg = config::load_engine_config(&conn).unwrap();
    let (report, _) = audit::audit_asset(&conn, "etf", cfg).unwrap();
    assert_eq!(report.last().unwrap().avg_cost_after, d("120"));

    dispatch(&conn, &["config", "set-same-day", "buys-first"]).unwrap();
    let cfg = config::load_engine_config(&conn).unwrap();
    assert_eq!(cfg.same_day_order, SameDayOrder::BuysFirst);
    let (report, _) = audit::audit_asset(&conn, "etf", cfg).unwrap();
    assert_eq!(report.last().unwrap().avg_cost_after, d("115"));
    assert_eq!(report.last().unwrap().realized_pnl, d("25"));

    dispatch(&conn, &["config", "set-precision", "20"]).unwrap();
    assert_eq!(config::load_engine_config(&conn).unwrap().working_precision, 20);
    assert!(dispatch(&conn, &["config", "set-precision", "30"]).is_err());
    assert!(dispatch(&conn, &["config", "set-same-day", "fifo"]).is_err());
    dispatch(&conn, &["config", "show"]).unwrap();
}

#[test]
fn position_marks_to_manual_price() {
    let conn = golden_ledger();
    let err = dispatch(&conn, &["position", "--asset", "gold"]).unwrap_err();
    assert!(err.to_string().contains("No market price for asset 'gold'"));

    dispatch(&conn, &["asset", "price", "--id", "gold", "--price", "2880.004"]).unwrap();
    let asset = db::load_asset(&conn, "gold").unwrap();
    assert_eq!(asset.market_price.unwrap().to_string(), "2880.00");
    assert_eq!(asset.currency, "TWD");

    let matches = cli::build_cli().get_matches_from(["avgcost", "position", "--asset", "gold"]);
    let (_, sub) = matches.subcommand().unwrap();
    let summary = position::position_for(&conn, sub, "gold", None).unwrap();
    assert_eq!(summary.investment_amount.to_string(), "88898.00");
    assert_eq!(summary.market_value.to_string(), "76320.00");
    assert_eq!(summary.unrealized_pnl.to_string(), "-12578.00");
    assert_eq!(summary.return_ratio.to_string(), "-0.1415");

    let summary = position::position_for(&conn, sub, "gold", Some(d("4000"))).unwrap();
    assert_eq!(summary.market_value.to_string(), "106000.00");
    assert_eq!(summary.unrealized_pnl.to_string(), "17102.00");

    dispatch(&conn, &["position", "--asset", "gold", "--json"]).unwrap();
}

#[test]
fn doctor_reports_oversells_and_orphans() {
    let conn = setup();
    dispatch(&conn, &["asset", "add", "--id", "gold", "--name", "Gold"]).unwrap();
    assert!(doctor::diagnose(&conn).unwrap().is_empty());

    dispatch(
        &conn,
        &["trade", "buy", "--asset", "gold", "--id", "b1", "--date", "2024-01-01", "--quantity", "1", "--price", "10"],
    )
    .unwrap();
    dispatch(
        &conn,
        &["trade", "sell", "--asset", "gold", "--id", "s1", "--date", "2024-01-02", "--quantity", "2", "--price", "12"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(id, asset_id, date, type, quantity, price_per_unit, fees, total_amount)
         VALUES ('x1', 'ghost', '2024-01-01', 'BUY', '1', '1', '0', '1.00')",
        [],
    )
    .unwrap();

    let rows = doctor::diagnose(&conn).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "unknown_asset");
    assert!(rows[0][1].contains("x1 references 'ghost'"));
    assert_eq!(rows[1][0], "oversold");
    assert!(rows[1][1].contains("s1: selling 2 but only 1.0000 held"));
    dispatch(&conn, &["doctor"]).unwrap();
}

#[test]
fn trade_list_and_delete() {
    let conn = golden_ledger();
    dispatch(&conn, &["trade", "list", "--asset", "gold"]).unwrap();
    dispatch(&conn, &["trade", "list", "--asset", "gold", "--jsonl"]).unwrap();
    dispatch(&conn, &["trade", "delete", "--id", "t3"]).unwrap();
    assert_eq!(db::load_transactions(&conn, "gold").unwrap().len(), 3);
    assert!(dispatch(&conn, &["trade", "delete", "--id", "t3"]).is_err());

    let (report, _) = audit::audit_asset(&conn, "gold", EngineConfig::default()).unwrap();
    let last = report.last().unwrap();
    // 65000.00 + 40148.00 over 31.5 units
    assert_eq!(last.inventory_value_after.to_string(), "105148.00");
    assert_eq!(last.avg_cost_after.to_string(), "3338.0317");
}
