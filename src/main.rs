use clap::ArgMatches;
use colored::*;
use log::{error, info};

use ohmcalc::battery::{self, BatteryEstimate};
use ohmcalc::cli::{self, CliArgs, Mode, OutputFormat};
use ohmcalc::format::{format_engineering, format_watts_decimal};
use ohmcalc::session::{self, Session, SessionConfig};

fn main() {
    let matches = cli::build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    if let Err(e) = run_application(&matches) {
        error!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn init_logging(verbose_level: u8) {
    let default_level = match verbose_level {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn run_application(matches: &ArgMatches) -> anyhow::Result<()> {
    let args = CliArgs::from_matches(matches)?;

    match args.mode {
        Mode::Solve { known, branch } => {
            info!("{}", "Solving Ohm's law".green().bold());

            let mut session = Session::with_config(SessionConfig {
                significant_digits: args.significant_digits,
                ..SessionConfig::default()
            });
            session.solve(known)?;
            session.select_branch(branch)?;

            if let Some(output_file) = args.output_file {
                session.export_results(&output_file, args.output_format)?;
                info!("Results exported to: {}", output_file.bright_green());
            } else {
                session.print_summary();
            }
        }
        Mode::Battery { capacity_mah, draw_ma, voltage } => {
            info!("{}", "Estimating battery runtime".green().bold());

            let estimate = battery::estimate(capacity_mah, draw_ma, voltage)?;

            if let Some(output_file) = args.output_file {
                match args.output_format {
                    OutputFormat::Csv => session::write_csv(&output_file, &[estimate])?,
                    OutputFormat::Json => session::write_json(&output_file, &estimate)?,
                }
                info!("Results exported to: {}", output_file.bright_green());
            } else {
                print_battery_summary(&estimate, args.significant_digits);
            }
        }
    }

    Ok(())
}

fn print_battery_summary(estimate: &BatteryEstimate, significant_digits: usize) {
    println!("\n=== Battery Runtime ===");
    println!("Capacity: {}", format_engineering(estimate.capacity_ah, significant_digits).with_unit("Ah"));
    println!("Load: {}", format_engineering(estimate.draw_a, significant_digits).with_unit("A"));
    println!("Runtime: {:.2} h ({:.0} min)", estimate.hours, estimate.minutes());
    if let Some(watt_hours) = estimate.watt_hours {
        println!("Energy: {} Wh", format_watts_decimal(watt_hours));
    }
}
