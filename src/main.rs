use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use indoor_emission::{
    estimate_for, simulate, write_records_csv, AppConfig, EmissionEstimateInput, Removal, ABOUT,
    MASS_BALANCE_CAPTION,
};

/// Indoor emission calculator and single-zone mass-balance model
#[derive(Parser, Debug)]
#[command(name = "indoor-emission")]
#[command(about = "Estimate indoor pollutant emissions and room concentrations")]
struct Args {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emission-factor CSV (Activity,Pollutant,EF,Unit,Source); overrides config
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List activities in the reference table
    Activities,
    /// List pollutants recorded for an activity
    Pollutants { activity: String },
    /// E = Activity x EF, in grams
    Estimate {
        #[arg(short, long)]
        activity: String,
        #[arg(short, long)]
        pollutant: String,
        /// Activity amount (kg, J or h, matching the EF unit)
        #[arg(long, default_value_t = 0.0)]
        amount: f64,
    },
    /// Concentration over 8 h: dC/dt = E/V - (ACH + k)*C
    Simulate {
        /// Room volume, m3
        #[arg(long)]
        volume: Option<f64>,
        /// Air changes per hour
        #[arg(long)]
        ach: Option<f64>,
        /// Deposition/reaction constant, 1/h
        #[arg(long)]
        k: Option<f64>,
        /// Emission rate, g/h
        #[arg(long)]
        emission: Option<f64>,
        /// Initial concentration, ug/m3
        #[arg(long)]
        c0: Option<f64>,
        /// Write the full trajectory to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Search the reference table by activity, pollutant or source
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// About the tool and its data sources
    About,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut cfg = match &args.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };
    if args.data.is_some() {
        cfg.data_path = args.data.clone();
    }

    match args.command {
        Command::Activities => {
            let table = cfg.reference_table()?;
            for activity in table.activities() {
                println!("{}", activity);
            }
        }
        Command::Pollutants { activity } => {
            let table = cfg.reference_table()?;
            let pollutants = table.pollutants_for(&activity);
            if pollutants.is_empty() {
                eprintln!("Warning: no pollutants recorded for '{}'", activity);
            }
            for pollutant in pollutants {
                println!("{}", pollutant);
            }
        }
        Command::Estimate {
            activity,
            pollutant,
            amount,
        } => {
            let table = cfg.reference_table()?;
            let input = EmissionEstimateInput {
                activity,
                pollutant,
                amount,
            };
            match estimate_for(&table, &input) {
                Ok(report) => println!("{}", report),
                Err(e) if e.is_warning() => {
                    if let Ok(record) = table.lookup(&input.activity, &input.pollutant) {
                        println!("Emission Factor (EF): {} {}", record.ef, record.unit);
                    }
                    eprintln!("Warning: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Simulate {
            volume,
            ach,
            k,
            emission,
            c0,
            csv,
        } => {
            let mut input = cfg.mass_balance;
            if let Some(v) = volume {
                input.volume_m3 = v;
            }
            if let Some(v) = ach {
                input.ach_per_h = v;
            }
            if let Some(v) = k {
                input.k_per_h = v;
            }
            if let Some(v) = emission {
                input.emission_g_per_h = v;
            }
            if let Some(v) = c0 {
                input.c0_ug_m3 = v;
            }

            let trajectory = simulate(&input)?;

            match input.removal() {
                Removal::FirstOrder(lambda) => {
                    println!("lambda = ACH + k = {:.4} 1/h", lambda);
                    if let Some(css) = input.steady_state_ug_m3()? {
                        println!("Steady state: {:.3} ug/m3", css);
                    }
                }
                Removal::NoRemoval => {
                    println!("lambda = 0: no removal, concentration grows linearly");
                }
            }

            println!("Time_h,Concentration_ug_per_m3");
            let points = trajectory.points();
            for (i, p) in points.iter().enumerate() {
                if i % 25 == 0 || i + 1 == points.len() {
                    println!("{:.3},{:.3}", p.time_h, p.concentration_ug_m3);
                }
            }
            if let Some(peak) = trajectory.peak() {
                println!(
                    "Peak: {:.3} ug/m3 at {:.3} h",
                    peak.concentration_ug_m3, peak.time_h
                );
            }

            if let Some(path) = csv {
                let file = File::create(&path)?;
                trajectory.write_csv(BufWriter::new(file))?;
                println!("Trajectory written to {}", path.display());
            }
            println!("{}", MASS_BALANCE_CAPTION);
        }
        Command::Search { query } => {
            let table = cfg.reference_table()?;
            write_records_csv(&table.search(&query), io::stdout().lock())?;
        }
        Command::About => {
            println!("{}", ABOUT);
        }
    }

    Ok(())
}
