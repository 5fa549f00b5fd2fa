use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use weather_extremes::analyzers::{percentile_profile, yearly_frequency, FrequencyOptions};
use weather_extremes::episodes::{extract_episodes, Comparison, EpisodeDefinition};
use weather_extremes::models::{StationSeries, Variable};
use weather_extremes::processors::{IntegrityChecker, ParallelDetector};
use weather_extremes::readers::TableReader;
use weather_extremes::thresholds::{Severity, ThresholdRegistry, ThresholdSpec};
use weather_extremes::{EngineConfig, ExtremesAnalyzer};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_table(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "station_id,station_name,date,TX,TN,RR").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

fn tx_rows(station_id: u32, start: NaiveDate, values: &[f64]) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let day = start + chrono::Duration::days(i as i64);
            format!("{},S{},{},{},,", station_id, station_id, day.format("%Y-%m-%d"), v)
        })
        .collect()
}

fn heatwave(min_duration_days: usize) -> EpisodeDefinition {
    EpisodeDefinition::new(
        "heatwave",
        Variable::MaxTemperature,
        Comparison::Gt,
        30.0,
        min_duration_days,
    )
}

#[test]
fn test_heatwave_episodes_from_csv() {
    let file = write_table(&tx_rows(
        1,
        date(2023, 7, 1),
        &[31.0, 31.0, 31.0, 29.0, 32.0, 32.0, 32.0, 32.0],
    ));
    let stations = TableReader::new().read_stations(file.path()).unwrap();
    assert_eq!(stations.len(), 1);

    let episodes = extract_episodes(&stations[0], &heatwave(3)).unwrap();

    assert_eq!(episodes.len(), 2);
    assert_eq!(
        (episodes[0].start_date, episodes[0].end_date),
        (date(2023, 7, 1), date(2023, 7, 3))
    );
    assert_eq!(episodes[0].duration_days, 3);
    assert_eq!(episodes[0].extremum_value, 31.0);
    assert_eq!(episodes[0].mean_value, 31.0);
    assert_eq!(
        (episodes[1].start_date, episodes[1].end_date),
        (date(2023, 7, 5), date(2023, 7, 8))
    );
    assert_eq!(episodes[1].duration_days, 4);
    assert_eq!(episodes[1].extremum_value, 32.0);
    assert_eq!(episodes[1].mean_value, 32.0);

    // Raising the minimum run length removes both
    assert!(extract_episodes(&stations[0], &heatwave(5)).unwrap().is_empty());
}

#[test]
fn test_tn_classification_boundaries() {
    let spec = ThresholdSpec::descending(
        Variable::MinTemperature,
        &[("extreme-cold", -15.0), ("very-cold", -5.0), ("frost", 0.0)],
    )
    .unwrap();
    let registry = ThresholdRegistry::new().with_spec(spec).unwrap();

    assert_eq!(registry.classify_label(Variable::MinTemperature, Some(-16.0)), "extreme-cold");
    assert_eq!(registry.classify_label(Variable::MinTemperature, Some(-15.0)), "extreme-cold");
    assert_eq!(registry.classify_label(Variable::MinTemperature, Some(1.0)), "normal");
    assert_eq!(
        registry.classify(Variable::MinTemperature, None),
        Severity::Unclassifiable
    );
}

#[test]
fn test_infinite_reading_is_unclassifiable() {
    let records = TableReader::new()
        .from_reader("station_id,date,TX\n1,2023-07-01,inf\n1,2023-07-02,1e400\n".as_bytes())
        .unwrap();
    let stations = StationSeries::group(records);
    let registry = ThresholdRegistry::builtin().unwrap();

    let severities: Vec<Severity> = registry
        .classify_series(&stations[0], Variable::MaxTemperature)
        .map(|r| r.severity)
        .collect();
    assert_eq!(severities, vec![Severity::Unclassifiable; 2]);
}

#[test]
fn test_median_profile() {
    let profile = percentile_profile(vec![10.0, 20.0, 30.0, 40.0, 50.0], &[50.0]).unwrap();
    assert_eq!(profile.get(50.0), Some(30.0));
}

#[test]
fn test_frequency_gap_year_only_when_zero_filled() {
    let mut rows = tx_rows(1, date(2020, 8, 1), &[39.0, 33.0]);
    rows.extend(tx_rows(1, date(2022, 8, 1), &[25.0, 38.0]));
    let file = write_table(&rows);

    let stations = TableReader::new().read_stations(file.path()).unwrap();
    let registry = ThresholdRegistry::builtin().unwrap();
    let readings: Vec<_> = registry
        .classify_series(&stations[0], Variable::MaxTemperature)
        .collect();

    let table = yearly_frequency(&readings, Variable::MaxTemperature, FrequencyOptions::default()).unwrap();
    assert_eq!(table.years(), vec![2020, 2022]);
    assert_eq!(table.counts(2020).unwrap().extreme, 1);
    assert_eq!(table.counts(2020).unwrap().very_severe, 1);
    assert_eq!(table.counts(2022).unwrap().extreme, 1);

    let filled = yearly_frequency(&readings, Variable::MaxTemperature, FrequencyOptions::zero_filled()).unwrap();
    assert_eq!(filled.years(), vec![2020, 2021, 2022]);
    assert_eq!(filled.counts(2021).unwrap().total(), 0);
    assert_eq!(filled.rows().len(), 12);
}

#[test]
fn test_out_of_order_input_is_not_an_error() {
    // Ascending: one three-day heatwave
    let sorted = StationSeries::group(
        TableReader::new()
            .from_reader(
                "station_id,date,TX\n1,2023-07-01,31\n1,2023-07-02,31\n1,2023-07-03,31\n".as_bytes(),
            )
            .unwrap(),
    );
    // Same rows shuffled: the ordering precondition is violated
    let shuffled = StationSeries::group(
        TableReader::new()
            .from_reader(
                "station_id,date,TX\n1,2023-07-03,31\n1,2023-07-01,31\n1,2023-07-02,31\n".as_bytes(),
            )
            .unwrap(),
    );

    let expected = extract_episodes(&sorted[0], &heatwave(3)).unwrap();
    let result = extract_episodes(&shuffled[0], &heatwave(3));

    // Undefined but non-crashing: a result, not an error, and not the sorted answer
    assert!(result.is_ok());
    assert_eq!(expected.len(), 1);
    assert_ne!(result.unwrap(), expected);

    // The integrity check is where the violation becomes visible
    let report = IntegrityChecker::new().check_integrity(&shuffled);
    assert!(!report.is_ordered());
}

#[test]
fn test_empty_table_produces_empty_outputs() {
    let file = write_table(&[]);
    let stations = TableReader::new().read_stations(file.path()).unwrap();
    assert!(stations.is_empty());

    let detector = ParallelDetector::from_config(&EngineConfig::default()).unwrap();
    assert!(detector.detect_episodes(&stations, None).unwrap().is_empty());
    assert!(detector
        .classify(&stations, Variable::Precipitation)
        .unwrap()
        .is_empty());

    let report = ExtremesAnalyzer::new(&detector, vec![50.0])
        .analyze(&stations, None)
        .unwrap();
    assert_eq!(report.total_records, 0);
}

#[test]
fn test_full_report_with_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("engine.toml");
    std::fs::write(
        &config_path,
        r#"
percentiles = [50.0, 90.0]

[[episodes]]
name = "hot_nights"
variable = "TN"
comparison = "gt"
threshold = 20.0
min_duration_days = 2
"#,
    )
    .unwrap();

    let rows = vec![
        "4,Perpignan,2022-07-10,35.0,21.5,0".to_string(),
        "4,Perpignan,2022-07-11,38.5,22.0,".to_string(),
        "4,Perpignan,2022-07-12,33.0,19.0,12.5".to_string(),
        "8,Brest,2022-07-10,24.0,15.0,3.0".to_string(),
        "8,Brest,2022-07-11,-9999,14.0,55.0".to_string(),
    ];
    let table = write_table(&rows);

    let config = EngineConfig::load(Some(&config_path)).unwrap();
    let detector = ParallelDetector::from_config(&config).unwrap().with_max_workers(2);
    let stations = TableReader::new().read_stations(table.path()).unwrap();

    let report = ExtremesAnalyzer::new(&detector, config.percentiles.clone())
        .analyze(&stations, None)
        .unwrap();

    assert_eq!(report.unique_stations, 2);
    assert_eq!(report.total_records, 5);
    assert_eq!(report.episodes.len(), 1);
    assert_eq!(report.episodes[0].kind, "hot_nights");
    assert_eq!(report.episodes[0].station_id, 4);
    assert_eq!(report.episodes[0].extremum_value, 22.0);

    let rr = report
        .frequencies
        .iter()
        .find(|t| t.variable == Variable::Precipitation)
        .unwrap();
    // 55 mm is heavy rain, 12.5 mm is rain
    assert_eq!(rr.counts(2022).unwrap().very_severe, 1);
    assert_eq!(rr.counts(2022).unwrap().severe, 1);

    // Missing TX at Brest is excluded from the sample
    assert_eq!(report.percentiles[&Variable::MaxTemperature].sample_size, 4);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"hot_nights\""));
}
