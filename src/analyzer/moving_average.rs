use crate::model::{AnalyzedRow, AnalyzedSeries, MovingAverageWindow, PriceSeries};
use chrono::NaiveDateTime;

/// Trait defining the interface for a series analyzer.
pub trait Analyzer {
    fn analyze(&self, symbol: &str, series: PriceSeries) -> AnalyzedSeries;
}

/// Attaches a trailing simple moving average of `close` to every row.
pub struct MovingAverageAnalyzer {
    window: MovingAverageWindow,
}

impl MovingAverageAnalyzer {
    pub fn new(window: MovingAverageWindow) -> Self {
        Self { window }
    }
}

impl Analyzer for MovingAverageAnalyzer {
    fn analyze(&self, symbol: &str, series: PriceSeries) -> AnalyzedSeries {
        let window = self.window.get();
        let averages = moving_average(&series, window);
        let rows = series
            .iter()
            .zip(averages)
            .map(|((timestamp, bar), (_, moving_average))| AnalyzedRow {
                timestamp: *timestamp,
                bar: *bar,
                moving_average,
            })
            .collect();

        AnalyzedSeries {
            symbol: symbol.to_string(),
            window,
            rows,
        }
    }
}

/// Trailing moving average of `close`, one entry per row in ascending date order.
pub fn moving_average(series: &PriceSeries, window: usize) -> Vec<(NaiveDateTime, Option<f64>)> {
    let averages = simple_moving_average(&series.closes(), window);
    series.iter().map(|(ts, _)| *ts).zip(averages).collect()
}

/// `out[i]` is the mean of `data[i + 1 - window ..= i]`, or `None` for the
/// first `window - 1` positions. A zero window yields no values.
pub fn simple_moving_average(data: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || data.len() < window {
        return vec![None; data.len()];
    }
    let mut out = vec![None; window - 1];
    out.extend(
        data.windows(window)
            .map(|w| Some(w.iter().sum::<f64>() / window as f64)),
    );
    out
}
