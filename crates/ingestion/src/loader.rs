//! Price file loading.
//!
//! Accepts either an ISO month mapping (`{"2000-01": 140.2, ...}`) or a Yahoo
//! Finance chart response. Null closes are skipped and every timestamp is
//! normalized to the first day of its month.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use rollover_core::{
    format_month, month_from_unix, parse_month, Error, Instrument, PricePoint, PriceSeries,
    Result,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Yahoo chart response, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct ChartFile {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Vec<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Vec<Option<f64>>,
}

/// Load a price series from a JSON file.
///
/// Data before `start_month` is dropped. Missing or malformed files are fatal.
pub fn load_series(
    path: impl AsRef<Path>,
    instrument: Instrument,
    start_month: Option<NaiveDate>,
) -> Result<PriceSeries> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let series = parse_series(&text, instrument, start_month)?;
    info!(
        symbol = instrument.symbol(),
        path = %path.display(),
        months = series.len(),
        "Loaded price series"
    );
    Ok(series)
}

/// Parse a price series from JSON text.
pub fn parse_series(
    text: &str,
    instrument: Instrument,
    start_month: Option<NaiveDate>,
) -> Result<PriceSeries> {
    let value: Value = serde_json::from_str(text)?;
    let raw = if value.get("chart").is_some() {
        let chart = ChartFile::deserialize(value)
            .map_err(|e| Error::data(format!("malformed chart response: {e}")))?;
        chart_points(chart)?
    } else {
        let mapping = BTreeMap::<String, Option<f64>>::deserialize(value)
            .map_err(|e| Error::data(format!("malformed month mapping: {e}")))?;
        mapping_points(mapping)?
    };

    let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (month, price) in raw {
        if let Some(prev) = by_month.insert(month, price) {
            debug!(
                symbol = instrument.symbol(),
                month = %format_month(month),
                replaced = prev,
                "Duplicate month, keeping latest close"
            );
        }
    }

    let points: Vec<PricePoint> = by_month
        .into_iter()
        .filter(|(month, _)| start_month.map_or(true, |start| *month >= start))
        .map(|(month, price)| PricePoint { month, price })
        .collect();

    if points.is_empty() {
        return Err(Error::data(format!("{}: no usable prices", instrument.symbol())));
    }

    PriceSeries::new(instrument, points)
}

fn chart_points(file: ChartFile) -> Result<Vec<(NaiveDate, f64)>> {
    let result = file
        .chart
        .result
        .into_iter()
        .next()
        .ok_or_else(|| Error::data("chart response has no result"))?;
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| Error::data("chart response has no quote block"))?
        .close;

    if closes.len() != result.timestamp.len() {
        return Err(Error::data(format!(
            "chart has {} timestamps but {} closes",
            result.timestamp.len(),
            closes.len()
        )));
    }

    let mut points = Vec::with_capacity(closes.len());
    for (ts, close) in result.timestamp.into_iter().zip(closes) {
        let Some(close) = close else { continue };
        let month = month_from_unix(ts)
            .ok_or_else(|| Error::data(format!("timestamp {ts} out of range")))?;
        points.push((month, close));
    }
    Ok(points)
}

fn mapping_points(mapping: BTreeMap<String, Option<f64>>) -> Result<Vec<(NaiveDate, f64)>> {
    mapping
        .into_iter()
        .filter_map(|(key, price)| price.map(|p| (key, p)))
        .map(|(key, price)| Ok((parse_month(&key)?, price)))
        .collect()
}
