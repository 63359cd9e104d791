use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};

use crate::parser::parse;
use crate::solver::{KnownSet, Quantity};

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub mode: Mode,
    pub output_file: Option<String>,
    pub output_format: OutputFormat,
    pub verbose_level: u8,
    pub significant_digits: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Solve { known: KnownSet, branch: usize },
    Battery { capacity_mah: f64, draw_ma: f64, voltage: Option<f64> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Csv,
    Json,
}

const QUANTITY_ARGS: [(&str, Quantity); 4] = [
    ("voltage", Quantity::Voltage),
    ("current", Quantity::Current),
    ("resistance", Quantity::Resistance),
    ("power", Quantity::Power),
];

pub fn build_cli() -> Command {
    Command::new("ohmcalc")
        .version(crate::VERSION)
        .about("Solve V = I·R and P = V·I from any two known values")
        .arg(
            Arg::new("voltage")
                .long("voltage")
                .value_name("VOLTS")
                .allow_hyphen_values(true)
                .help("Known voltage, e.g. 12, 3.3V, 500m"),
        )
        .arg(
            Arg::new("current")
                .long("current")
                .value_name("AMPS")
                .allow_hyphen_values(true)
                .help("Known current, e.g. 0.5, 250mA, 20u"),
        )
        .arg(
            Arg::new("resistance")
                .long("resistance")
                .value_name("OHMS")
                .allow_hyphen_values(true)
                .help("Known resistance, e.g. 4K7, 4R7, 10k, 2.2 MΩ"),
        )
        .arg(
            Arg::new("power")
                .long("power")
                .value_name("WATTS")
                .allow_hyphen_values(true)
                .help("Known power, e.g. 2.5, 250mW"),
        )
        .arg(
            Arg::new("branch")
                .long("branch")
                .value_name("INDEX")
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("Solution branch to select when the result is not unique"),
        )
        .arg(
            Arg::new("battery")
                .long("battery")
                .value_names(["CAPACITY_MAH", "DRAW_MA"])
                .num_args(2)
                .conflicts_with_all(["voltage", "current", "resistance", "power"])
                .help("Battery runtime: capacity in mAh and load in mA"),
        )
        .arg(
            Arg::new("battery-voltage")
                .long("battery-voltage")
                .value_name("VOLTS")
                .requires("battery")
                .help("Nominal battery voltage, enables the Wh estimate"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output file for results"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .default_value("csv")
                .value_parser(["csv", "json"])
                .help("Output format"),
        )
        .arg(
            Arg::new("digits")
                .long("digits")
                .value_name("N")
                .value_parser(value_parser!(u8).range(1..=15))
                .default_value("4")
                .help("Significant digits in engineering notation"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("Increase verbosity level"),
        )
}

impl CliArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let output_file = matches.get_one::<String>("output").cloned();

        let verbose_level = matches.get_count("verbose");

        let significant_digits = matches.get_one::<u8>("digits").copied().unwrap_or(4) as usize;

        let output_format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("csv") | None => OutputFormat::Csv,
            Some("json") => OutputFormat::Json,
            Some(other) => return Err(anyhow!("Invalid output format '{}'", other)),
        };

        let mode = if let Some(battery_values) = matches.get_many::<String>("battery") {
            let values: Vec<&String> = battery_values.collect();
            if values.len() != 2 {
                return Err(anyhow!("Battery estimate requires exactly 2 parameters: capacity and draw"));
            }

            let capacity_mah = parse_value("capacity", values[0])?;
            let draw_ma = parse_value("draw", values[1])?;
            let voltage = matches
                .get_one::<String>("battery-voltage")
                .map(|text| parse_value("battery voltage", text))
                .transpose()?;

            Mode::Battery { capacity_mah, draw_ma, voltage }
        } else {
            let mut known = KnownSet::new();
            for (name, quantity) in QUANTITY_ARGS {
                if let Some(text) = matches.get_one::<String>(name) {
                    known.set(quantity, Some(parse_value(name, text)?));
                }
            }

            if known.count() < 2 {
                return Err(anyhow!(
                    "Give at least two of --voltage, --current, --resistance, --power (or use --battery)"
                ));
            }

            let branch = matches.get_one::<usize>("branch").copied().unwrap_or(0);
            Mode::Solve { known, branch }
        };

        Ok(CliArgs {
            mode,
            output_file,
            output_format,
            verbose_level,
            significant_digits,
        })
    }
}

fn parse_value(name: &str, text: &str) -> Result<f64> {
    parse(text).with_context(|| format!("Invalid {} '{}'", name, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Result<CliArgs> {
        let matches = build_cli().try_get_matches_from(argv)?;
        CliArgs::from_matches(&matches)
    }

    #[test]
    fn test_solve_mode() {
        let parsed = args(&["ohmcalc", "--voltage", "12V", "--resistance", "4K7"]).unwrap();
        match parsed.mode {
            Mode::Solve { known, branch } => {
                assert_eq!(known.voltage, Some(12.0));
                assert_eq!(known.resistance, Some(4700.0));
                assert_eq!(known.current, None);
                assert_eq!(branch, 0);
            }
            other => panic!("unexpected mode {:?}", other),
        }
        assert_eq!(parsed.output_format, OutputFormat::Csv);
        assert_eq!(parsed.significant_digits, 4);
    }

    #[test]
    fn test_negative_values_and_options() {
        let parsed = args(&[
            "ohmcalc", "--voltage", "-5", "--power", "2.5", "--branch", "1", "-f", "json", "-o", "out.json", "-vv",
        ])
        .unwrap();
        assert_eq!(
            parsed.mode,
            Mode::Solve { known: KnownSet::new().with(Quantity::Voltage, -5.0).with(Quantity::Power, 2.5), branch: 1 }
        );
        assert_eq!(parsed.output_format, OutputFormat::Json);
        assert_eq!(parsed.output_file.as_deref(), Some("out.json"));
        assert_eq!(parsed.verbose_level, 2);
    }

    #[test]
    fn test_battery_mode() {
        let parsed = args(&["ohmcalc", "--battery", "2000", "500", "--battery-voltage", "3.7"]).unwrap();
        assert_eq!(
            parsed.mode,
            Mode::Battery { capacity_mah: 2000.0, draw_ma: 500.0, voltage: Some(3.7) }
        );
    }

    #[test]
    fn test_rejects_single_value() {
        let err = args(&["ohmcalc", "--voltage", "5"]).unwrap_err();
        assert!(err.to_string().contains("at least two"));
    }

    #[test]
    fn test_rejects_unparsable_value() {
        let err = args(&["ohmcalc", "--voltage", "five", "--current", "1"]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid voltage 'five'");
    }

    #[test]
    fn test_negative_resistance_reaches_solver() {
        let parsed = args(&["ohmcalc", "--voltage", "5", "--resistance", "-10"]).unwrap();
        let Mode::Solve { known, .. } = parsed.mode else {
            panic!("unexpected mode {:?}", parsed.mode);
        };
        assert_eq!(known.resistance, Some(-10.0));
        let err = crate::solver::solve(&known).unwrap_err();
        assert_eq!(err.to_string(), "Resistance must be greater than zero");

        let parsed = args(&["ohmcalc", "--voltage", "5", "--power", "-1"]).unwrap();
        let Mode::Solve { known, .. } = parsed.mode else {
            panic!("unexpected mode {:?}", parsed.mode);
        };
        let err = crate::solver::solve(&known).unwrap_err();
        assert_eq!(err.to_string(), "Power cannot be negative");
    }

    #[test]
    fn test_battery_conflicts_with_solver_values() {
        assert!(args(&["ohmcalc", "--battery", "2000", "500", "--voltage", "5"]).is_err());
    }
}
