use crate::model::{AnalyzedSeries, CombinedView};
use std::collections::BTreeMap;
use tracing::debug;

/// Outer-joins every symbol's close and moving average columns on date.
/// Cells for dates a symbol has no row for stay `None`.
pub fn combine<'a>(series: impl IntoIterator<Item = &'a AnalyzedSeries>) -> CombinedView {
    let series: Vec<&AnalyzedSeries> = series.into_iter().collect();
    let width = series.len() * 2;
    let mut columns = Vec::with_capacity(width);
    let mut rows = BTreeMap::new();

    for (index, analyzed) in series.iter().enumerate() {
        columns.push(format!("{} close", analyzed.symbol));
        columns.push(format!("{} MA", analyzed.symbol));

        for row in &analyzed.rows {
            let cells = rows
                .entry(row.timestamp)
                .or_insert_with(|| vec![None; width]);
            cells[index * 2] = Some(row.bar.close);
            cells[index * 2 + 1] = row.moving_average;
        }
    }

    debug!("Combined {} series into {} rows", series.len(), rows.len());
    CombinedView { columns, rows }
}
