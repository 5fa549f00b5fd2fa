use crate::error::{DetectionError, Result};
use crate::models::{StationSeries, Variable, WeatherRecord};
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, MISSING_SENTINEL};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Column positions resolved from the header row
struct Columns {
    station_id: usize,
    date: usize,
    station_name: Option<usize>,
    variables: Vec<(Variable, usize)>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let station_id = find("station_id").ok_or_else(|| {
            DetectionError::InvalidFormat("missing required column 'station_id'".to_string())
        })?;
        let date = find("date").ok_or_else(|| {
            DetectionError::InvalidFormat("missing required column 'date'".to_string())
        })?;

        let variables = Variable::ALL
            .iter()
            .filter_map(|v| find(v.code()).map(|idx| (*v, idx)))
            .collect();

        Ok(Self {
            station_id,
            date,
            station_name: find("station_name"),
            variables,
        })
    }
}

/// Reads a daily station table from CSV.
///
/// Expected header: `station_id,date` plus any of
/// `station_name,TX,TN,TM,RR,FFM,FXY`. Rows are returned in file order.
pub struct TableReader {
    delimiter: u8,
}

impl TableReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn read_records(&self, path: &Path) -> Result<Vec<WeatherRecord>> {
        let file = File::open(path)?;
        let records = self.from_reader(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file))?;
        debug!(path = %path.display(), rows = records.len(), "station table read");
        Ok(records)
    }

    /// Read and split into one series per station (order of first
    /// appearance, rows unsorted)
    pub fn read_stations(&self, path: &Path) -> Result<Vec<StationSeries>> {
        Ok(StationSeries::group(self.read_records(path)?))
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Vec<WeatherRecord>> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(reader);

        let columns = Columns::from_header(csv_reader.headers()?)?;
        let mut records = Vec::new();

        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;
            // header is line 1
            let line = index + 2;
            records.push(self.parse_row(&row, &columns, line)?);
        }

        Ok(records)
    }

    fn parse_row(&self, row: &StringRecord, columns: &Columns, line: usize) -> Result<WeatherRecord> {
        let field = |idx: usize| row.get(idx).unwrap_or("");

        let raw_id = field(columns.station_id);
        let station_id = raw_id.parse::<u32>().map_err(|_| {
            DetectionError::InvalidFormat(format!("line {}: invalid station_id '{}'", line, raw_id))
        })?;

        let raw_date = field(columns.date);
        let date = parse_date(raw_date).ok_or_else(|| {
            DetectionError::InvalidFormat(format!("line {}: invalid date '{}'", line, raw_date))
        })?;

        let mut record = WeatherRecord::new(station_id, date);

        if let Some(idx) = columns.station_name {
            let name = field(idx);
            if !name.is_empty() {
                record.station_name = Some(name.to_string());
            }
        }

        for &(variable, idx) in &columns.variables {
            let value = parse_value(field(idx)).map_err(|raw| {
                DetectionError::InvalidFormat(format!(
                    "line {}: invalid {} value '{}'",
                    line, variable, raw
                ))
            })?;
            record.set_value(variable, value);
        }

        Ok(record)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}

/// Empty cells, the sentinel and non-finite numbers are missing; anything
/// else must be numeric
fn parse_value(raw: &str) -> std::result::Result<Option<f64>, &str> {
    if raw.is_empty() {
        return Ok(None);
    }
    let value = raw.parse::<f64>().map_err(|_| raw)?;
    if value == MISSING_SENTINEL || !value.is_finite() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_mixed_table() {
        let data = "\
station_id,station_name,date,TX,TN,RR
7,Lyon,2023-07-01,31.5,18.2,0
7,Lyon,2023-07-02,,19.0,-9999
9,Brest,20230701,22.0,14.1,3.4
";
        let records = TableReader::new().from_reader(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].station_name.as_deref(), Some("Lyon"));
        assert_eq!(records[0].value(Variable::MaxTemperature), Some(31.5));
        assert_eq!(records[1].value(Variable::MaxTemperature), None);
        assert_eq!(records[1].value(Variable::Precipitation), None);
        assert_eq!(records[2].date, NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        assert_eq!(records[2].value(Variable::WindSpeed), None);
    }

    #[test]
    fn test_header_is_case_insensitive_and_keeps_order() {
        let data = "DATE;Station_ID;tx\n2023-01-03;1;5\n2023-01-01;1;6\n";
        let records = TableReader::with_delimiter(b';')
            .from_reader(data.as_bytes())
            .unwrap();

        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert_eq!(records[1].value(Variable::MaxTemperature), Some(6.0));
    }

    #[test]
    fn test_missing_required_column() {
        let result = TableReader::new().from_reader("station_id,TX\n1,30\n".as_bytes());
        assert!(matches!(result, Err(DetectionError::InvalidFormat(msg)) if msg.contains("date")));
    }

    #[test]
    fn test_bad_value_reports_line() {
        let data = "station_id,date,TX\n1,2023-01-01,30\n1,2023-01-02,hot\n";
        let result = TableReader::new().from_reader(data.as_bytes());
        assert!(matches!(result, Err(DetectionError::InvalidFormat(msg)) if msg.starts_with("line 3")));
    }

    #[test]
    fn test_non_finite_values_read_as_missing() {
        let data = "station_id,date,TX,RR\n1,2023-07-01,inf,1e400\n1,2023-07-02,-inf,NaN\n";
        let records = TableReader::new().from_reader(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.max_temp, None);
            assert_eq!(record.precipitation, None);
        }
    }

    #[test]
    fn test_read_stations_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "station_id,date,TN").unwrap();
        writeln!(file, "2,2022-12-01,-3").unwrap();
        writeln!(file, "1,2022-12-01,-8").unwrap();
        writeln!(file, "2,2022-12-02,-4").unwrap();

        let stations = TableReader::new().read_stations(file.path()).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].station_id, 2);
        assert_eq!(stations[0].len(), 2);
        assert_eq!(stations[1].station_id, 1);
    }
}
