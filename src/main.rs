use anyhow::Result;
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Arg, Command};

use pulse::commands;

/// Mirrors `ALLOWED_INTERVALS_SECS`
const INTERVAL_CHOICES: [&str; 5] = ["1", "2", "5", "10", "30"];

fn main() -> Result<()> {
    pulse::init_logging();

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("monitor", sub_matches)) => commands::monitor(sub_matches)?,
        Some(("topology", sub_matches)) => commands::topology(sub_matches)?,
        Some(("config", sub_matches)) => commands::handle_config(sub_matches)?,
        _ => {
            println!("Use 'pulse --help' for more information.");
        }
    }

    Ok(())
}

fn build_cli() -> Command {
    Command::new("pulse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live system counter sampler")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("monitor")
                .about("Sample CPU, memory, network, processes, thermal and GPU")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECONDS")
                        .help("Sampling interval in seconds")
                        .value_parser(
                            PossibleValuesParser::new(INTERVAL_CHOICES)
                                .try_map(|s| s.parse::<u64>()),
                        ),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print one JSON snapshot per line")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_name("N")
                        .help("Stop after N snapshots")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("topology")
                .about("Show the efficiency/performance core split")
                .arg(
                    Arg::new("cores")
                        .short('c')
                        .long("cores")
                        .value_name("N")
                        .help("Classify N cores instead of the local count")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage settings (use 'pulse config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the current settings"))
                .subcommand(
                    Command::new("export")
                        .about("Export settings to a JSON file")
                        .arg(
                            Arg::new("file")
                                .help("Destination file")
                                .required(true)
                                .index(1),
                        ),
                )
                .subcommand(
                    Command::new("import")
                        .about("Import settings from a JSON file (unknown keys are ignored)")
                        .arg(
                            Arg::new("file")
                                .help("Source file")
                                .required(true)
                                .index(1),
                        ),
                )
                .subcommand(Command::new("reset").about("Restore default settings")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse::core::config::ALLOWED_INTERVALS_SECS;

    #[test]
    fn test_interval_choices_match_allowed_intervals() {
        let choices: Vec<u64> = INTERVAL_CHOICES.iter().map(|s| s.parse().unwrap()).collect();
        assert_eq!(choices, ALLOWED_INTERVALS_SECS.to_vec());
    }

    #[test]
    fn test_monitor_interval_accepts_only_allowed_values() {
        let matches = build_cli()
            .try_get_matches_from(["pulse", "monitor", "--interval", "5"])
            .unwrap();
        let (_, monitor) = matches.subcommand().unwrap();
        assert_eq!(monitor.get_one::<u64>("interval"), Some(&5));

        for rejected in ["3", "7", "0", "60", "fast"] {
            assert!(build_cli()
                .try_get_matches_from(["pulse", "monitor", "-i", rejected])
                .is_err());
        }
    }
}
