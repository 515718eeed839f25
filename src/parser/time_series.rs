// Provider JSON -> PriceSeries
use crate::model::{FetchError, PriceBar, PriceSeries};
use crate::normalizer::normalize_label;
use crate::utils::parse_timestamp;
use serde_json::{Map, Value};

const ERROR_KEY: &str = "Error Message";
const SERIES_MARKER: &str = "Time Series";

pub trait Parser {
    fn parse(&self, body: &str) -> Result<PriceSeries, FetchError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TimeSeriesParser;

impl TimeSeriesParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_value(&self, payload: &Value) -> Result<PriceSeries, FetchError> {
        let object = payload.as_object().ok_or_else(|| unexpected(payload))?;

        if let Some(message) = object.get(ERROR_KEY) {
            let text = match message {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(FetchError::Provider(text));
        }

        let rows = object
            .iter()
            .find(|(key, _)| key.contains(SERIES_MARKER))
            .and_then(|(_, rows)| rows.as_object())
            .ok_or_else(|| unexpected(payload))?;

        let mut series = PriceSeries::new();
        for (date, fields) in rows {
            let timestamp = parse_timestamp(date).ok_or_else(|| FetchError::InvalidField {
                timestamp: date.clone(),
                field: "date".into(),
                value: date.clone(),
            })?;
            let fields = fields.as_object().ok_or_else(|| unexpected(payload))?;
            series.insert(timestamp, parse_bar(date, fields)?);
        }
        Ok(series)
    }
}

impl Parser for TimeSeriesParser {
    fn parse(&self, body: &str) -> Result<PriceSeries, FetchError> {
        let payload: Value = serde_json::from_str(body)?;
        self.parse_value(&payload)
    }
}

fn unexpected(payload: &Value) -> FetchError {
    FetchError::UnexpectedFormat {
        payload: payload.to_string(),
    }
}

fn parse_bar(date: &str, fields: &Map<String, Value>) -> Result<PriceBar, FetchError> {
    let (mut open, mut high, mut low, mut close, mut volume) = (None, None, None, None, None);

    for (label, raw) in fields {
        let slot = match normalize_label(label) {
            "open" => &mut open,
            "high" => &mut high,
            "low" => &mut low,
            "close" => &mut close,
            "volume" => &mut volume,
            _ => continue,
        };
        *slot = Some(parse_number(date, label, raw)?);
    }

    let require = |field: &str, value: Option<f64>| {
        value.ok_or_else(|| FetchError::MissingField {
            timestamp: date.to_string(),
            field: field.to_string(),
        })
    };

    Ok(PriceBar {
        open: require("open", open)?,
        high: require("high", high)?,
        low: require("low", low)?,
        close: require("close", close)?,
        volume: require("volume", volume)?,
    })
}

fn parse_number(date: &str, label: &str, raw: &Value) -> Result<f64, FetchError> {
    let parsed = match raw {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| FetchError::InvalidField {
        timestamp: date.to_string(),
        field: label.to_string(),
        value: raw.to_string(),
    })
}
