use crate::analyzers::{
    extreme_events, rank_episodes, station_extremes, variable_profile, yearly_episode_stats,
    ExtremesAnalyzer, FrequencyOptions,
};
use crate::cli::args::{Cli, Commands};
use crate::config::EngineConfig;
use crate::error::{DetectionError, Result};
use crate::models::{Episode, StationSeries, Variable};
use crate::processors::{IntegrityChecker, ParallelDetector};
use crate::readers::TableReader;
use crate::utils::logging;
use crate::utils::progress::ProgressReporter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose);

    let config = EngineConfig::load(cli.config.as_deref())?;
    let detector = ParallelDetector::from_config(&config)?.with_max_workers(cli.max_workers);
    let reader = table_reader(cli.delimiter)?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Classify { input, variable } => {
            let variable: Variable = variable.parse()?;
            detector.registry().require(variable)?;
            let stations = load_stations(&reader, &input, quiet)?;
            emit(&detector.classify(&stations, variable)?)?;
        }

        Commands::Events {
            input,
            variable,
            floor,
            by_station,
        } => {
            let variable: Variable = variable.parse()?;
            detector.registry().require(variable)?;
            let stations = load_stations(&reader, &input, quiet)?;

            if by_station {
                emit(&station_extremes(detector.registry(), &stations, variable, floor.into()))?;
            } else {
                emit(&extreme_events(detector.registry(), &stations, variable, floor.into()))?;
            }
        }

        Commands::Episodes {
            input,
            kind,
            rank,
            yearly,
        } => {
            let stations = load_stations(&reader, &input, quiet)?;
            let progress = ProgressReporter::new(stations.len() as u64, "Detecting episodes...", quiet);

            let mut episodes = match kind.as_deref() {
                Some(name) => detector.detect_named(&stations, name, Some(&progress))?,
                None => detector.detect_episodes(&stations, Some(&progress))?,
            };

            if yearly {
                let mut by_kind: BTreeMap<String, _> = BTreeMap::new();
                for definition in detector.catalog().iter() {
                    if kind.as_deref().is_some_and(|k| k != definition.name) {
                        continue;
                    }
                    let stats =
                        yearly_episode_stats(episodes.iter().filter(|e| e.kind == definition.name));
                    by_kind.insert(definition.name.clone(), stats);
                }
                emit(&by_kind)?;
            } else {
                if rank {
                    episodes = ranked(&detector, episodes);
                }
                emit(&episodes)?;
            }
        }

        Commands::Frequency {
            input,
            variable,
            zero_fill,
            from_year,
            to_year,
        } => {
            let variable: Variable = variable.parse()?;
            detector.registry().require(variable)?;
            let stations = load_stations(&reader, &input, quiet)?;

            let mut options = FrequencyOptions {
                zero_fill,
                year_range: None,
            };
            if let (Some(first), Some(last)) = (from_year, to_year) {
                options = options.with_year_range(first, last);
            }

            let table = detector.yearly_frequency(&stations, variable, options)?;
            emit(&table.rows())?;
        }

        Commands::Percentiles {
            input,
            variable,
            percentiles,
        } => {
            let percentiles = percentiles.unwrap_or_else(|| config.percentiles.clone());
            let variables = match variable {
                Some(code) => vec![code.parse::<Variable>()?],
                None => Variable::ALL.to_vec(),
            };
            let stations = load_stations(&reader, &input, quiet)?;

            let mut profiles = BTreeMap::new();
            for variable in variables {
                let profile = variable_profile(&stations, variable, &percentiles)?;
                if profile.is_empty() {
                    warn!(variable = %variable, "no valid readings, profile skipped");
                    continue;
                }
                profiles.insert(variable, profile);
            }
            emit(&profiles)?;
        }

        Commands::Integrity {
            input,
            max_reported,
        } => {
            let stations = load_stations(&reader, &input, quiet)?;
            let checker = IntegrityChecker::with_max_reported(max_reported);
            let report = checker.check_integrity(&stations);

            eprintln!("{}", checker.generate_summary(&report));
            emit(&report)?;
        }

        Commands::Report { input, summary } => {
            let stations = load_stations(&reader, &input, quiet)?;
            let progress = ProgressReporter::new(stations.len() as u64, "Analyzing stations...", quiet);
            let report = ExtremesAnalyzer::new(&detector, config.percentiles.clone())
                .analyze(&stations, Some(&progress))?;

            if summary {
                println!("{}", report.summary());
            } else {
                emit(&report)?;
            }
        }
    }

    Ok(())
}

fn table_reader(delimiter: char) -> Result<TableReader> {
    if !delimiter.is_ascii() {
        return Err(DetectionError::Config(format!(
            "delimiter must be a single ASCII character, got '{}'",
            delimiter
        )));
    }
    Ok(TableReader::with_delimiter(delimiter as u8))
}

fn load_stations(reader: &TableReader, input: &Path, quiet: bool) -> Result<Vec<StationSeries>> {
    let progress = ProgressReporter::new_spinner(&format!("Reading {}...", input.display()), quiet);
    let stations = reader.read_stations(input)?;
    progress.finish_and_clear();

    info!(
        path = %input.display(),
        stations = stations.len(),
        records = stations.iter().map(StationSeries::len).sum::<usize>(),
        "station table loaded"
    );
    Ok(stations)
}

/// Most extreme first within each definition, definitions in catalog order
fn ranked(detector: &ParallelDetector, mut episodes: Vec<Episode>) -> Vec<Episode> {
    let mut ordered = Vec::with_capacity(episodes.len());
    for definition in detector.catalog().iter() {
        let (mut group, rest): (Vec<Episode>, Vec<Episode>) = episodes
            .into_iter()
            .partition(|e| e.kind == definition.name);
        rank_episodes(&mut group, definition.direction());
        ordered.extend(group);
        episodes = rest;
    }
    ordered.extend(episodes);
    ordered
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}
