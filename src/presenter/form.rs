// Dashboard form: raw query-string values and their validated form
use crate::model::{InputError, Interval, MovingAverageWindow, Timespan};
use crate::normalizer::normalize_symbols;
use serde::Deserialize;
use std::str::FromStr;

/// Values used when the form omits a field.
#[derive(Debug, Clone)]
pub struct FormDefaults {
    pub symbols: String,
    pub window: MovingAverageWindow,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            symbols: "IBM".to_string(),
            window: MovingAverageWindow::default(),
        }
    }
}

/// Raw form fields as submitted. Kept as strings so invalid input can be echoed back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardForm {
    pub symbols: Option<String>,
    pub timespan: Option<String>,
    pub interval: Option<String>,
    pub window: Option<String>,
}

/// A validated render-cycle request.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub symbols: Vec<String>,
    pub timespan: Timespan,
    pub interval: Option<Interval>,
    pub window: MovingAverageWindow,
}

impl DashboardForm {
    /// Symbol text shown in the input box.
    pub fn symbols_text<'a>(&'a self, defaults: &'a FormDefaults) -> &'a str {
        self.symbols.as_deref().unwrap_or(&defaults.symbols)
    }

    /// Timespan to preselect when redisplaying the form; unknown values fall back to daily.
    pub fn selected_timespan(&self) -> Timespan {
        non_blank(&self.timespan)
            .and_then(|raw| Timespan::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn selected_interval(&self) -> Interval {
        non_blank(&self.interval)
            .and_then(|raw| Interval::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn parse(&self, defaults: &FormDefaults) -> Result<DashboardRequest, InputError> {
        let timespan = match non_blank(&self.timespan) {
            Some(raw) => Timespan::from_str(raw).map_err(|_| InputError::Timespan(raw.into()))?,
            None => Timespan::default(),
        };

        let interval = match (timespan, non_blank(&self.interval)) {
            (Timespan::Intraday, Some(raw)) => {
                Some(Interval::from_str(raw).map_err(|_| InputError::Interval(raw.into()))?)
            }
            (Timespan::Intraday, None) => Some(Interval::default()),
            _ => None,
        };

        let window = match non_blank(&self.window) {
            Some(raw) => {
                let size = raw
                    .parse::<usize>()
                    .map_err(|_| InputError::Window(raw.into()))?;
                MovingAverageWindow::new(size)?
            }
            None => defaults.window,
        };

        Ok(DashboardRequest {
            symbols: normalize_symbols(self.symbols_text(defaults)),
            timespan,
            interval,
            window,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
