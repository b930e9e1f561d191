//! CSV ingest and normalization.
//!
//! This module is responsible for turning the scraped flight-price CSV into
//! clean `(FlightRecord, price)` pairs that are safe to encode and fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Dataset defaults**: missing stopover times become `"0"`, missing
//!   stopover airports and operating carriers become `"None"`
//! - **Separation of concerns**: no encoding or fitting here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::codec::{parse_arrival_clock, parse_clock_12h, parse_duration_minutes, parse_flight_date};
use crate::domain::FlightRecord;
use crate::error::AppError;

const COL_AIRLINE: &str = "Airline";
const COL_SOURCE: &str = "Source";
const COL_DESTINATION: &str = "Destination";
const COL_STOPS: &str = "Number of Stops";
const COL_CLASS: &str = "Class";
const COL_DEPARTURE: &str = "Departure";
const COL_ARRIVAL: &str = "Arrival";
/// Flight date. The scraped dataset also has a lowercase `date` (scrape date).
const COL_DATE: &str = "Date";
const COL_TOTAL_STOPOVER: &str = "Total_Stopover_Time";
const COL_DAYS_LEFT: &str = "Days Left";
const COL_PRICE: &str = "price in CAD";
const COL_OPERATED: &str = "Operated";

const REQUIRED_COLUMNS: [&str; 11] = [
    COL_AIRLINE,
    COL_SOURCE,
    COL_DESTINATION,
    COL_STOPS,
    COL_CLASS,
    COL_DEPARTURE,
    COL_ARRIVAL,
    COL_DATE,
    COL_TOTAL_STOPOVER,
    COL_DAYS_LEFT,
    COL_PRICE,
];

/// Stopover legs are numbered 1..=3 in the dataset.
pub const MAX_STOPOVER_LEGS: usize = 3;

/// Placeholder for a missing duration.
pub const MISSING_DURATION: &str = "0";
/// Placeholder for a missing airport or operating carrier.
pub const MISSING_NAME: &str = "None";

/// One connecting stop as recorded in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopoverLeg {
    pub airport: String,
    pub time: String,
    pub minutes: u32,
}

/// A normalized training row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub record: FlightRecord,
    pub price: f64,
    /// Individual stopover legs. Informational; the model only sees the total.
    pub stopovers: Vec<StopoverLeg>,
    pub operated: String,
}

/// Summary stats about the rows actually used for training.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub price_min: f64,
    pub price_max: f64,
    pub price_mean: f64,
    pub days_left_min: i64,
    pub days_left_max: i64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized rows + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub rows: Vec<TrainingRow>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedData {
    pub fn records(&self) -> Vec<FlightRecord> {
        self.rows.iter().map(|r| r.record.clone()).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.price).collect()
    }

    /// Rows per number of recorded stopover legs (index 0 = no legs).
    pub fn stopover_leg_counts(&self) -> [usize; MAX_STOPOVER_LEGS + 1] {
        let mut counts = [0; MAX_STOPOVER_LEGS + 1];
        for row in &self.rows {
            counts[row.stopovers.len().min(MAX_STOPOVER_LEGS)] += 1;
        }
        counts
    }

    /// Rows flown by an operating carrier other than the marketing airline.
    pub fn operated_by_partner(&self) -> usize {
        self.rows.iter().filter(|r| r.operated != MISSING_NAME).count()
    }
}

/// Load and normalize the training CSV at `path`.
pub fn load_training_rows(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    info!(path = %path.display(), "reading training data");
    read_training_rows(file)
}

/// Normalize training rows from any CSV source.
pub fn read_training_rows<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: one header line, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let outcome = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map));

        match outcome {
            Ok(row) => rows.push(row),
            Err(message) => {
                debug!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), rows_read, "some rows could not be used");
    }

    let rows_used = rows.len();
    let stats = compute_stats(&rows)
        .ok_or_else(|| AppError::new(3, "No valid rows remain after normalization."))?;

    Ok(IngestedData {
        rows,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Column lookup by header name.
///
/// An exact (case-sensitive) match always wins. Otherwise a case-insensitive
/// match is used, but only when exactly one header folds to the name.
#[derive(Debug, Clone, Default)]
struct HeaderMap {
    exact: HashMap<String, usize>,
    folded: HashMap<String, Vec<usize>>,
}

enum HeaderLookup {
    Found(usize),
    Missing,
    Ambiguous(usize),
}

impl HeaderMap {
    fn lookup(&self, name: &str) -> HeaderLookup {
        if let Some(&idx) = self.exact.get(name) {
            return HeaderLookup::Found(idx);
        }
        match self.folded.get(&name.to_ascii_lowercase()).map(Vec::as_slice) {
            Some([idx]) => HeaderLookup::Found(*idx),
            Some(candidates) if !candidates.is_empty() => HeaderLookup::Ambiguous(candidates.len()),
            _ => HeaderLookup::Missing,
        }
    }

    fn get(&self, name: &str) -> Option<usize> {
        match self.lookup(name) {
            HeaderLookup::Found(idx) => Some(idx),
            HeaderLookup::Missing | HeaderLookup::Ambiguous(_) => None,
        }
    }
}

fn build_header_map(headers: &StringRecord) -> HeaderMap {
    let mut map = HeaderMap::default();
    for (idx, name) in headers.iter().enumerate() {
        let name = normalize_header_name(name);
        map.folded.entry(name.to_ascii_lowercase()).or_default().push(idx);
        map.exact.entry(name).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn optional_columns() -> Vec<String> {
    let mut columns = vec![COL_OPERATED.to_string()];
    for leg in 1..=MAX_STOPOVER_LEGS {
        columns.push(stopover_airport_column(leg));
        columns.push(stopover_time_column(leg));
    }
    columns
}

fn stopover_airport_column(leg: usize) -> String {
    format!("Stopover_{leg}_Airport")
}

fn stopover_time_column(leg: usize) -> String {
    format!("Stopover_{leg}_Time")
}

fn ensure_required_columns_exist(header_map: &HeaderMap) -> Result<(), AppError> {
    let mut missing = Vec::new();
    let mut ambiguous = Vec::new();
    let optional = optional_columns();
    let required = REQUIRED_COLUMNS.iter().copied().map(|c| (c, true));
    for (name, is_required) in required.chain(optional.iter().map(|c| (c.as_str(), false))) {
        match header_map.lookup(name) {
            HeaderLookup::Found(_) => {}
            HeaderLookup::Missing => {
                if is_required {
                    missing.push(name.to_string());
                }
            }
            HeaderLookup::Ambiguous(n) => ambiguous.push(format!("{name} ({n} headers differ only in case)")),
        }
    }

    if !missing.is_empty() {
        return Err(AppError::new(
            2,
            format!("Missing required column(s): {}", missing.join(", ")),
        ));
    }
    if !ambiguous.is_empty() {
        return Err(AppError::new(
            2,
            format!("Ambiguous column(s): {}", ambiguous.join(", ")),
        ));
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HeaderMap) -> Result<TrainingRow, String> {
    let departure = parse_clock_12h(get_required(record, header_map, COL_DEPARTURE)?).map_err(|e| e.to_string())?;
    let arrival = parse_arrival_clock(get_required(record, header_map, COL_ARRIVAL)?).map_err(|e| e.to_string())?;
    let flight_date = parse_flight_date(get_required(record, header_map, COL_DATE)?).map_err(|e| e.to_string())?;

    let days_left_text = get_required(record, header_map, COL_DAYS_LEFT)?;
    let days_left = parse_days_left(days_left_text)
        .ok_or_else(|| format!("Invalid `Days Left` value '{days_left_text}'."))?;

    let price_text = get_required(record, header_map, COL_PRICE)?;
    let price = price_text
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid `price in CAD` value '{price_text}'."))?;

    let total_stopover = get_optional(record, header_map, COL_TOTAL_STOPOVER)
        .unwrap_or(MISSING_DURATION)
        .to_string();

    let stopovers = (1..=MAX_STOPOVER_LEGS)
        .filter_map(|leg| parse_stopover_leg(record, header_map, leg))
        .collect();

    let operated = get_optional(record, header_map, COL_OPERATED)
        .unwrap_or(MISSING_NAME)
        .to_string();

    Ok(TrainingRow {
        record: FlightRecord {
            airline: get_required(record, header_map, COL_AIRLINE)?.to_string(),
            source: get_required(record, header_map, COL_SOURCE)?.to_string(),
            destination: get_required(record, header_map, COL_DESTINATION)?.to_string(),
            number_of_stops: get_required(record, header_map, COL_STOPS)?.to_string(),
            class: get_required(record, header_map, COL_CLASS)?.to_string(),
            departure,
            arrival,
            flight_date,
            total_stopover,
            days_left,
        },
        price,
        stopovers,
        operated,
    })
}

/// A leg exists when either its airport or its time is filled in.
fn parse_stopover_leg(record: &StringRecord, header_map: &HeaderMap, leg: usize) -> Option<StopoverLeg> {
    let airport = get_optional(record, header_map, &stopover_airport_column(leg));
    let time = get_optional(record, header_map, &stopover_time_column(leg));
    if airport.is_none() && time.is_none() {
        return None;
    }
    let time = time.unwrap_or(MISSING_DURATION);
    Some(StopoverLeg {
        airport: airport.unwrap_or(MISSING_NAME).to_string(),
        time: time.to_string(),
        minutes: parse_duration_minutes(time),
    })
}

/// Accepts integers and integral floats (`"30"`, `"30.0"`).
fn parse_days_left(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

fn compute_stats(rows: &[TrainingRow]) -> Option<DatasetStats> {
    if rows.is_empty() {
        return None;
    }

    let mut price_min = f64::INFINITY;
    let mut price_max = f64::NEG_INFINITY;
    let mut price_sum = 0.0;
    let mut days_left_min = i64::MAX;
    let mut days_left_max = i64::MIN;

    for r in rows {
        price_min = price_min.min(r.price);
        price_max = price_max.max(r.price);
        price_sum += r.price;
        days_left_min = days_left_min.min(r.record.days_left);
        days_left_max = days_left_max.max(r.record.days_left);
    }

    Some(DatasetStats {
        n_rows: rows.len(),
        price_min,
        price_max,
        price_mean: price_sum / rows.len() as f64,
        days_left_min,
        days_left_max,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HeaderMap,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HeaderMap, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    const HEADER: &str = "Airline,Source,Destination,Number of Stops,Class,Departure,Arrival,Date,Stopover_1_Airport,Stopover_1_Time,Total_Stopover_Time,Operated,Days Left,price in CAD";

    fn ingest(body: &str) -> IngestedData {
        let csv = format!("{HEADER}\n{body}");
        read_training_rows(csv.as_bytes()).unwrap()
    }

    #[test]
    fn parses_a_full_row() {
        let data = ingest("AirCo,YYZ,YVR,1-stop,Economy,10:00 PM,1:05 AM+1,2024-06-15,YWG,1h 10m,1h 10m,Jazz,30,412.5\n");
        assert_eq!(data.rows_used, 1);
        let row = &data.rows[0];
        assert_eq!(row.record.departure, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(row.record.arrival, NaiveTime::from_hms_opt(1, 5, 0).unwrap());
        // The "+1" does not move the date.
        assert_eq!(row.record.flight_date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(row.record.total_stopover, "1h 10m");
        assert_eq!(row.record.days_left, 30);
        assert_eq!(row.price, 412.5);
        assert_eq!(row.operated, "Jazz");
        assert_eq!(
            row.stopovers,
            vec![StopoverLeg {
                airport: "YWG".into(),
                time: "1h 10m".into(),
                minutes: 70,
            }]
        );
    }

    #[test]
    fn missing_optional_values_get_dataset_defaults() {
        let data = ingest("AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,,,,30,250\n");
        let row = &data.rows[0];
        assert_eq!(row.record.total_stopover, MISSING_DURATION);
        assert_eq!(row.operated, MISSING_NAME);
        assert!(row.stopovers.is_empty());
    }

    #[test]
    fn leg_with_time_but_no_airport() {
        let data = ingest("AirCo,YYZ,YVR,1-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,45m,45m,,30,250\n");
        assert_eq!(data.rows[0].stopovers[0].airport, MISSING_NAME);
        assert_eq!(data.rows[0].stopovers[0].minutes, 45);
    }

    #[test]
    fn bad_rows_are_reported_with_line_numbers() {
        let data = ingest(concat!(
            "AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,,0,,30,250\n",
            "AirCo,YYZ,YVR,non-stop,Economy,25:00,1:00 PM,2024-06-15,,,0,,30,250\n",
            "AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,,0,,soon,250\n",
            ",YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,,0,,30,250\n",
            "AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,,0,,30,n/a\n",
        ));
        assert_eq!(data.rows_read, 5);
        assert_eq!(data.rows_used, 1);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6]);
        assert!(data.row_errors[0].message.contains("Invalid clock"));
        assert!(data.row_errors[2].message.contains("Airline"));
    }

    #[test]
    fn headers_are_case_and_bom_insensitive() {
        let csv = "\u{feff}AIRLINE,source,destination,number of stops,class,departure,arrival,date,total_stopover_time,days left,Price In CAD\n\
                   AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,0,12.0,99\n";
        let data = read_training_rows(csv.as_bytes()).unwrap();
        assert_eq!(data.rows[0].record.days_left, 12);
        assert_eq!(data.stats.price_mean, 99.0);
    }

    #[test]
    fn flight_date_wins_over_scrape_date_in_either_order() {
        let flight_date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        for csv in [
            "Airline,Source,Destination,Number of Stops,Class,Departure,Arrival,Date,Total_Stopover_Time,Days Left,price in CAD,date\n\
             AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,0,30,250,2024-05-16\n",
            "date,Airline,Source,Destination,Number of Stops,Class,Departure,Arrival,Date,Total_Stopover_Time,Days Left,price in CAD\n\
             2024-05-16,AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,0,30,250\n",
        ] {
            let data = read_training_rows(csv.as_bytes()).unwrap();
            assert_eq!(data.rows[0].record.flight_date, flight_date);
        }
    }

    #[test]
    fn case_only_duplicates_without_exact_match_are_rejected() {
        let csv = "Airline,Source,Destination,Number of Stops,Class,Departure,Arrival,DATE,date,Total_Stopover_Time,Days Left,price in CAD\n\
                   AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,2024-05-16,0,30,250\n";
        let err = read_training_rows(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Ambiguous column(s): Date"));
    }

    #[test]
    fn missing_columns_fail_fast() {
        let err = read_training_rows("Airline,Source\nAirCo,YYZ\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Number of Stops"));
    }

    #[test]
    fn no_usable_rows_is_exit_code_3() {
        let csv = format!("{HEADER}\nAirCo,YYZ,YVR,non-stop,Economy,bad,1:00 PM,2024-06-15,,,0,,30,250\n");
        let err = read_training_rows(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn stats_summarize_prices() {
        let data = ingest(concat!(
            "AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,,0,,3,100\n",
            "AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,,0,,400,300\n",
        ));
        assert_eq!(data.stats.price_min, 100.0);
        assert_eq!(data.stats.price_max, 300.0);
        assert_eq!(data.stats.price_mean, 200.0);
        assert_eq!(data.stats.days_left_max, 400);
        assert_eq!(data.records().len(), 2);
        assert_eq!(data.prices(), vec![100.0, 300.0]);
    }

    #[test]
    fn leg_and_partner_counts() {
        let data = ingest(concat!(
            "AirCo,YYZ,YVR,non-stop,Economy,10:00 AM,1:00 PM,2024-06-15,,,0,,3,100\n",
            "AirCo,YYZ,YVR,1-stop,Economy,10:00 AM,3:00 PM,2024-06-15,YWG,1h 10m,1h 10m,Jazz,3,100\n",
            "AirCo,YYZ,YVR,1-stop,Economy,10:00 AM,3:00 PM,2024-06-15,YWG,50m,50m,,3,100\n",
        ));
        assert_eq!(data.stopover_leg_counts(), [1, 2, 0, 0]);
        assert_eq!(data.operated_by_partner(), 1);
    }
}
