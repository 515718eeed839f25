// Core types: Query, PriceSeries, AnalyzedSeries, CombinedView and the error enums
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::utils::format_timestamp;

/// Granularity of the requested price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Timespan {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Intraday,
}

impl Timespan {
    /// Provider function code for this timespan.
    pub fn function(self) -> &'static str {
        match self {
            Timespan::Daily => "TIME_SERIES_DAILY",
            Timespan::Weekly => "TIME_SERIES_WEEKLY",
            Timespan::Monthly => "TIME_SERIES_MONTHLY",
            Timespan::Intraday => "TIME_SERIES_INTRADAY",
        }
    }
}

/// Sampling period for intraday series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize)]
pub enum Interval {
    #[strum(serialize = "1min")]
    #[serde(rename = "1min")]
    OneMinute,
    #[default]
    #[strum(serialize = "5min")]
    #[serde(rename = "5min")]
    FiveMinutes,
    #[strum(serialize = "15min")]
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[strum(serialize = "30min")]
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[strum(serialize = "60min")]
    #[serde(rename = "60min")]
    SixtyMinutes,
}

/// One request for one symbol. The interval is only carried for intraday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    symbol: String,
    timespan: Timespan,
    interval: Option<Interval>,
}

impl Query {
    pub fn new(symbol: impl Into<String>, timespan: Timespan, interval: Option<Interval>) -> Self {
        let interval = match timespan {
            Timespan::Intraday => Some(interval.unwrap_or_default()),
            _ => None,
        };
        Self {
            symbol: symbol.into(),
            timespan,
            interval,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timespan(&self) -> Timespan {
        self.timespan
    }

    pub fn interval(&self) -> Option<Interval> {
        self.interval
    }
}

/// Moving average window size, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MovingAverageWindow(usize);

impl MovingAverageWindow {
    pub const MIN: usize = 1;
    pub const MAX: usize = 200;
    pub const DEFAULT: usize = 20;

    pub fn new(size: usize) -> Result<Self, InputError> {
        if (Self::MIN..=Self::MAX).contains(&size) {
            Ok(Self(size))
        } else {
            Err(InputError::Window(size.to_string()))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for MovingAverageWindow {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Price rows keyed by date (or date-time for intraday), iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: BTreeMap<NaiveDateTime, PriceBar>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timestamp: NaiveDateTime, bar: PriceBar) {
        self.bars.insert(timestamp, bar);
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, timestamp: &NaiveDateTime) -> Option<&PriceBar> {
        self.bars.get(timestamp)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDateTime, &PriceBar)> {
        self.bars.iter()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.values().map(|bar| bar.close).collect()
    }
}

impl FromIterator<(NaiveDateTime, PriceBar)> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDateTime, PriceBar)>>(iter: I) -> Self {
        Self {
            bars: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedRow {
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub bar: PriceBar,
    pub moving_average: Option<f64>,
}

/// A fetched series plus its moving average column, in ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedSeries {
    pub symbol: String,
    pub window: usize,
    pub rows: Vec<AnalyzedRow>,
}

/// Outer join of every symbol's (close, MA) pair on date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedView {
    pub columns: Vec<String>,
    pub rows: BTreeMap<NaiveDateTime, Vec<Option<f64>>>,
}

impl CombinedView {
    #[cfg(test)]
    pub fn value(&self, timestamp: &NaiveDateTime, column: &str) -> Option<f64> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(timestamp).and_then(|cells| cells[index])
    }

    /// Line chart payload: one label per row and one dataset per column.
    pub fn chart_data(&self) -> ChartData {
        let labels = self.rows.keys().map(format_timestamp).collect();
        let datasets = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, label)| ChartDataset {
                label: label.clone(),
                data: self.rows.values().map(|cells| cells[index]).collect(),
            })
            .collect();
        ChartData { labels, datasets }
    }
}

impl Serialize for CombinedView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.chart_data().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Provider(String),
    #[error("unexpected API response format: {payload}")]
    UnexpectedFormat { payload: String },
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("response body is not valid JSON: {0}")]
    Decode(String),
    #[error("invalid value {value:?} for '{field}' at {timestamp}")]
    InvalidField {
        timestamp: String,
        field: String,
        value: String,
    },
    #[error("missing '{field}' at {timestamp}")]
    MissingField { timestamp: String, field: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown time span '{0}', expected daily, weekly, monthly or intraday")]
    Timespan(String),
    #[error("unknown interval '{0}', expected 1min, 5min, 15min, 30min or 60min")]
    Interval(String),
    #[error("moving average window must be an integer between 1 and 200, got '{0}'")]
    Window(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn intraday_query_defaults_to_five_minutes() {
        let query = Query::new("IBM", Timespan::Intraday, None);
        assert_eq!(query.interval(), Some(Interval::FiveMinutes));
    }

    #[test]
    fn non_intraday_query_drops_interval() {
        let query = Query::new("IBM", Timespan::Weekly, Some(Interval::OneMinute));
        assert_eq!(query.interval(), None);
        assert_eq!(query.timespan().function(), "TIME_SERIES_WEEKLY");
    }

    #[test]
    fn timespan_and_interval_parse_from_form_values() {
        assert_eq!(Timespan::from_str("Intraday").unwrap(), Timespan::Intraday);
        assert_eq!(Interval::from_str("15min").unwrap(), Interval::FifteenMinutes);
        assert_eq!(Interval::SixtyMinutes.to_string(), "60min");
        assert!(Interval::from_str("2min").is_err());
    }

    #[test]
    fn window_bounds() {
        assert!(MovingAverageWindow::new(0).is_err());
        assert_eq!(MovingAverageWindow::new(1).unwrap().get(), 1);
        assert_eq!(MovingAverageWindow::new(200).unwrap().get(), 200);
        assert_eq!(
            MovingAverageWindow::new(201),
            Err(InputError::Window("201".into()))
        );
        assert_eq!(MovingAverageWindow::default().get(), 20);
    }

    #[test]
    fn chart_data_keeps_gaps_as_null() {
        let mut rows = BTreeMap::new();
        rows.insert(day(1), vec![Some(1.0), None]);
        rows.insert(day(2), vec![None, Some(2.0)]);
        let view = CombinedView {
            columns: vec!["A close".into(), "B close".into()],
            rows,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "labels": ["2024-03-01", "2024-03-02"],
                "datasets": [
                    { "label": "A close", "data": [1.0, null] },
                    { "label": "B close", "data": [null, 2.0] }
                ]
            })
        );
        assert_eq!(view.value(&day(2), "B close"), Some(2.0));
        assert_eq!(view.value(&day(1), "B close"), None);
        assert_eq!(view.value(&day(1), "C close"), None);
    }
}
