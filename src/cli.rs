// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Command, arg, value_parser};

fn output_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON"))
        .arg(arg!(--jsonl "Print one JSON object per line"))
}

fn trade_side(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(arg!(--asset <ASSET> "Asset id").required(true))
        .arg(arg!(--date <DATE> "Trade date, YYYY-MM-DD").required(true))
        .arg(arg!(--quantity <QTY> "Units traded").required(true))
        .arg(arg!(--price <PRICE> "Price per unit").required(true))
        .arg(arg!(--fees <FEES> "Transaction costs, default 0").required(false))
        .arg(arg!(--id <ID> "Transaction id, generated when omitted").required(false))
        .arg(arg!(--note <NOTE> "Free text note").required(false))
}

fn engine_overrides(cmd: Command) -> Command {
    cmd.arg(
        arg!(--precision <DIGITS> "Working precision in significant digits")
            .required(false)
            .value_parser(value_parser!(u32)),
    )
    .arg(arg!(--"same-day" <ORDER> "Same-date ordering: input|buys-first|id").required(false))
}

pub fn build_cli() -> Command {
    Command::new("avgcost")
        .version(clap::crate_version!())
        .about("Weighted-average cost basis ledger with an auditable inventory trail")
        .arg(arg!(-v --verbose "Emit valuation diagnostics on stderr").global(true))
        .subcommand(Command::new("init").about("Create the ledger store"))
        .subcommand(
            Command::new("asset")
                .about("Manage assets")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--id <ID> "Asset id").required(true))
                        .arg(arg!(--name <NAME> "Display name").required(true))
                        .arg(
                            arg!(--currency <CCY> "Quote currency")
                                .required(false)
                                .default_value("USD"),
                        )
                        .arg(arg!(--price <PRICE> "Current market price").required(false)),
                )
                .subcommand(output_flags(Command::new("list")))
                .subcommand(
                    Command::new("price")
                        .about("Set the manual market price")
                        .arg(arg!(--id <ID> "Asset id").required(true))
                        .arg(arg!(--price <PRICE> "Market price").required(true)),
                ),
        )
        .subcommand(
            Command::new("trade")
                .about("Record and inspect transactions")
                .subcommand(trade_side("buy", "Record a purchase"))
                .subcommand(trade_side("sell", "Record a sale"))
                .subcommand(output_flags(
                    Command::new("list").arg(arg!(--asset <ASSET> "Asset id").required(true)),
                ))
                .subcommand(
                    Command::new("delete").arg(arg!(--id <ID> "Transaction id").required(true)),
                ),
        )
        .subcommand(engine_overrides(output_flags(
            Command::new("audit")
                .about("Print the inventory audit trail of one asset")
                .arg(arg!(--asset <ASSET> "Asset id").required(true)),
        )))
        .subcommand(engine_overrides(
            Command::new("position")
                .about("Current holding marked to the market price")
                .arg(arg!(--asset <ASSET> "Asset id").required(true))
                .arg(arg!(--price <PRICE> "Override the stored market price").required(false))
                .arg(arg!(--json "Print JSON")),
        ))
        .subcommand(
            Command::new("import").subcommand(
                Command::new("trades")
                    .about("Import transactions from CSV")
                    .arg(arg!(--path <PATH> "CSV file").required(true)),
            ),
        )
        .subcommand(
            Command::new("export").subcommand(engine_overrides(
                Command::new("audit")
                    .about("Write the audit trail of one asset")
                    .arg(arg!(--asset <ASSET> "Asset id").required(true))
                    .arg(
                        arg!(--format <FORMAT> "csv|json")
                            .required(false)
                            .default_value("csv"),
                    )
                    .arg(arg!(--out <PATH> "Output file").required(true)),
            )),
        )
        .subcommand(
            Command::new("config")
                .about("Persisted engine settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-precision").arg(
                        arg!(<DIGITS> "Significant digits, 1..=28")
                            .value_parser(value_parser!(u32)),
                    ),
                )
                .subcommand(
                    Command::new("set-same-day")
                        .arg(arg!(<ORDER> "input|buys-first|id")),
                ),
        )
        .subcommand(Command::new("doctor").about("Report ledger anomalies"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn same_day_override_is_read() {
        let m = build_cli().get_matches_from([
            "avgcost",
            "audit",
            "--asset",
            "gold",
            "--same-day",
            "buys-first",
            "--precision",
            "12",
        ]);
        let (_, sub) = m.subcommand().unwrap();
        assert_eq!(
            sub.get_one::<String>("same-day").map(String::as_str),
            Some("buys-first")
        );
        assert_eq!(sub.get_one::<u32>("precision"), Some(&12));
    }
}
