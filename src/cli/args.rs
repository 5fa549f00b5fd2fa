use crate::thresholds::Severity;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-extremes")]
#[command(about = "Extreme-weather event detection for daily station records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Engine configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = num_cpus::get())]
    pub max_workers: usize,

    /// CSV field delimiter
    #[arg(long, global = true, default_value_t = ',')]
    pub delimiter: char,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every reading of one variable
    Classify {
        #[arg(short, long, help = "Input station table (CSV)")]
        input: PathBuf,

        #[arg(long, help = "Variable code: TX, TN, TM, RR, FFM or FXY")]
        variable: String,
    },

    /// List readings at or beyond a severity tier, most extreme first
    Events {
        #[arg(short, long, help = "Input station table (CSV)")]
        input: PathBuf,

        #[arg(long)]
        variable: String,

        #[arg(long, value_enum, default_value_t = SeverityArg::Extreme)]
        floor: SeverityArg,

        /// Aggregate per station instead of listing readings
        #[arg(long, default_value = "false")]
        by_station: bool,
    },

    /// Segment runs of qualifying days into episodes
    Episodes {
        #[arg(short, long, help = "Input station table (CSV)")]
        input: PathBuf,

        #[arg(short, long, help = "Episode definition name [default: all]")]
        kind: Option<String>,

        /// Sort most extreme first instead of chronologically
        #[arg(long, default_value = "false")]
        rank: bool,

        /// Emit per-year counts instead of the episodes
        #[arg(long, default_value = "false")]
        yearly: bool,
    },

    /// Yearly count of readings per severity tier
    Frequency {
        #[arg(short, long, help = "Input station table (CSV)")]
        input: PathBuf,

        #[arg(long)]
        variable: String,

        /// Emit zero rows for years without readings
        #[arg(long, default_value = "false")]
        zero_fill: bool,

        #[arg(long, requires = "to_year")]
        from_year: Option<i32>,

        #[arg(long, requires = "from_year")]
        to_year: Option<i32>,
    },

    /// Percentile profile of one or every variable
    Percentiles {
        #[arg(short, long, help = "Input station table (CSV)")]
        input: PathBuf,

        #[arg(long, help = "Variable code [default: all present]")]
        variable: Option<String>,

        /// Comma-separated percentiles [default: from configuration]
        #[arg(short, long, value_delimiter = ',')]
        percentiles: Option<Vec<f64>>,
    },

    /// Check ordering, duplicates and value plausibility
    Integrity {
        #[arg(short, long, help = "Input station table (CSV)")]
        input: PathBuf,

        /// Violations listed in the text summary
        #[arg(long, default_value_t = 10)]
        max_reported: usize,
    },

    /// Full analysis: frequencies, percentiles, episodes and station extremes
    Report {
        #[arg(short, long, help = "Input station table (CSV)")]
        input: PathBuf,

        /// Print a text summary instead of JSON
        #[arg(long, default_value = "false")]
        summary: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Extreme,
    VerySevere,
    Severe,
    Moderate,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Extreme => Severity::Extreme,
            SeverityArg::VerySevere => Severity::VerySevere,
            SeverityArg::Severe => Severity::Severe,
            SeverityArg::Moderate => Severity::Moderate,
        }
    }
}
