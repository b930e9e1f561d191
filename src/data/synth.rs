//! Synthetic flight-price dataset generation.
//!
//! Produces rows in the same textual layout as the scraped dataset (12-hour
//! clocks, `+1` arrival markers, `"3h 25m"` stopovers, blank cells for absent
//! legs), so generated files exercise the full ingest path.
//!
//! Prices follow a simple, explainable structure:
//! `distance fare × airline factor × class factor × booking-window surge
//!  − connection discount`, with multiplicative log-normal noise.

use std::io::Write;

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::codec::format_duration_minutes;
use crate::error::AppError;

/// `(airline, price factor, operated-by partner)`
const AIRLINES: [(&str, f64, Option<&str>); 4] = [
    ("AirCo", 1.0, None),
    ("Aeroplan", 1.15, Some("Jazz")),
    ("BlueSky", 0.85, None),
    ("Northern", 0.95, Some("Pacific Coastal")),
];

/// `(code, longitude-ish position in km)`; distance is the absolute difference.
const AIRPORTS: [(&str, f64); 6] = [
    ("YVR", 0.0),
    ("YYC", 680.0),
    ("YYZ", 3350.0),
    ("YOW", 3700.0),
    ("YUL", 3900.0),
    ("YHZ", 4650.0),
];

const HUBS: [&str; 3] = ["YWG", "YEG", "YQB"];

/// `(class, price factor)`
const CLASSES: [(&str, f64); 3] = [("Economy", 1.0), ("Premium Economy", 1.6), ("Business", 3.2)];

const STOPS: [&str; 3] = ["non-stop", "1-stop", "2+-stops"];

const FARE_PER_KM: f64 = 0.09;
const BASE_FARE: f64 = 80.0;
const CONNECTION_DISCOUNT: f64 = 35.0;
const CRUISE_KMH: f64 = 800.0;
const NOISE_SIGMA: f64 = 0.05;

const CSV_HEADER: [&str; 18] = [
    "Airline",
    "Source",
    "Destination",
    "Number of Stops",
    "Class",
    "Departure",
    "Arrival",
    "Date",
    "Stopover_1_Airport",
    "Stopover_1_Time",
    "Stopover_2_Airport",
    "Stopover_2_Time",
    "Stopover_3_Airport",
    "Stopover_3_Time",
    "Total_Stopover_Time",
    "Operated",
    "Days Left",
    "price in CAD",
];

#[derive(Debug, Clone, Copy)]
pub struct SynthConfig {
    pub rows: usize,
    pub seed: u64,
    /// First possible flight date.
    pub start_date: NaiveDate,
    /// Flight dates are drawn from `start_date .. start_date + date_span_days`.
    pub date_span_days: i64,
}

impl SynthConfig {
    pub fn new(rows: usize, seed: u64) -> Self {
        Self {
            rows,
            seed,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
            date_span_days: 120,
        }
    }
}

/// One generated connection.
#[derive(Debug, Clone, PartialEq)]
pub struct StopoverSpec {
    pub airport: String,
    pub minutes: u32,
}

/// One generated flight with its price.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticFlight {
    pub airline: String,
    pub source: String,
    pub destination: String,
    pub number_of_stops: String,
    pub class: String,
    pub departure: NaiveTime,
    pub arrival: NaiveTime,
    /// Days between departure and arrival dates (0 for same-day).
    pub arrival_day_offset: i64,
    pub flight_date: NaiveDate,
    pub stopovers: Vec<StopoverSpec>,
    pub operated: Option<String>,
    pub days_left: i64,
    pub price: f64,
}

impl SyntheticFlight {
    pub fn total_stopover_minutes(&self) -> u32 {
        self.stopovers.iter().map(|s| s.minutes).sum()
    }
}

/// Generate `config.rows` flights deterministically from `config.seed`.
pub fn generate_flights(config: &SynthConfig) -> Result<Vec<SyntheticFlight>, AppError> {
    if config.rows == 0 {
        return Err(AppError::new(2, "Row count must be > 0."));
    }
    if config.date_span_days <= 0 {
        return Err(AppError::new(2, "Date span must be > 0 days."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, NOISE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut flights = Vec::with_capacity(config.rows);
    for _ in 0..config.rows {
        let (airline, airline_factor, partner) = AIRLINES[rng.gen_range(0..AIRLINES.len())];
        let src = rng.gen_range(0..AIRPORTS.len());
        // Pick a different destination by offsetting from the source.
        let dst = (src + rng.gen_range(1..AIRPORTS.len())) % AIRPORTS.len();
        let (source, src_km) = AIRPORTS[src];
        let (destination, dst_km) = AIRPORTS[dst];
        let distance = (src_km - dst_km).abs();

        let (class, class_factor) = CLASSES[rng.gen_range(0..CLASSES.len())];

        // Long routes connect more often.
        let connect_prob = (distance / 6000.0).clamp(0.1, 0.7);
        let n_stops = if rng.gen_bool(connect_prob) {
            if rng.gen_bool(0.2) { 2 } else { 1 }
        } else {
            0
        };
        let stopovers: Vec<StopoverSpec> = (0..n_stops)
            .map(|_| StopoverSpec {
                airport: HUBS[rng.gen_range(0..HUBS.len())].to_string(),
                minutes: rng.gen_range(6..=48) * 5,
            })
            .collect();
        let stopover_minutes: u32 = stopovers.iter().map(|s| s.minutes).sum();

        let departure = NaiveTime::from_hms_opt(rng.gen_range(5..=23), rng.gen_range(0..12) * 5, 0)
            .ok_or_else(|| AppError::new(4, "Generated an invalid departure time."))?;
        let air_minutes = (distance / CRUISE_KMH * 60.0).round() as i64 + 30;
        let (arrival, overflow_secs) =
            departure.overflowing_add_signed(Duration::minutes(air_minutes + i64::from(stopover_minutes)));
        let arrival_day_offset = overflow_secs.div_euclid(86_400);

        let flight_date = config.start_date + Duration::days(rng.gen_range(0..config.date_span_days));
        let days_left: i64 = rng.gen_range(1..=90);

        // Prices climb steeply inside the last couple of weeks.
        let surge = 1.0 + 0.8 * (-(days_left as f64) / 10.0).exp();
        let fare = (BASE_FARE + FARE_PER_KM * distance) * airline_factor * class_factor * surge
            - CONNECTION_DISCOUNT * n_stops as f64;
        let price = (fare * noise.sample(&mut rng).exp()).max(25.0);

        flights.push(SyntheticFlight {
            airline: airline.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            number_of_stops: STOPS[n_stops].to_string(),
            class: class.to_string(),
            departure,
            arrival,
            arrival_day_offset,
            flight_date,
            stopovers,
            operated: partner.filter(|_| rng.gen_bool(0.5)).map(str::to_string),
            days_left,
            price: (price * 100.0).round() / 100.0,
        });
    }

    Ok(flights)
}

/// Write flights as a dataset-style CSV.
pub fn write_flights_csv<W: Write>(writer: W, flights: &[SyntheticFlight]) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| AppError::new(2, format!("Failed to write synthetic CSV: {e}"));

    out.write_record(CSV_HEADER).map_err(csv_err)?;
    for f in flights {
        let mut legs: Vec<String> = Vec::with_capacity(6);
        for leg in 0..3 {
            match f.stopovers.get(leg) {
                Some(s) => {
                    legs.push(s.airport.clone());
                    legs.push(format_duration_minutes(s.minutes));
                }
                None => {
                    legs.push(String::new());
                    legs.push(String::new());
                }
            }
        }

        let arrival = match f.arrival_day_offset {
            0 => clock_12h(f.arrival),
            n => format!("{}+{n}", clock_12h(f.arrival)),
        };
        let total_stopover = if f.stopovers.is_empty() {
            String::new()
        } else {
            format_duration_minutes(f.total_stopover_minutes())
        };

        let mut record = vec![
            f.airline.clone(),
            f.source.clone(),
            f.destination.clone(),
            f.number_of_stops.clone(),
            f.class.clone(),
            clock_12h(f.departure),
            arrival,
            f.flight_date.format("%Y-%m-%d").to_string(),
        ];
        record.extend(legs);
        record.push(total_stopover);
        record.push(f.operated.clone().unwrap_or_default());
        record.push(f.days_left.to_string());
        record.push(format!("{:.2}", f.price));

        out.write_record(&record).map_err(csv_err)?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush synthetic CSV: {e}")))?;
    Ok(())
}

fn clock_12h(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}
