// Presenter: drives one render cycle (fetch -> analyze -> merge) and serves it over HTTP.

pub mod form;
pub mod page;
pub mod routes;

use crate::analyzer::{combine, Analyzer, MovingAverageAnalyzer};
use crate::fetcher::MarketDataSource;
use crate::model::{AnalyzedSeries, CombinedView, FetchError, Query};
use form::DashboardRequest;
use serde::Serialize;
use tracing::{info, warn};

/// Per-symbol result of a render cycle, in input order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolSection {
    Loaded { series: AnalyzedSeries },
    Failed { symbol: String, notices: Vec<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub sections: Vec<SymbolSection>,
    /// Present only when at least one symbol produced data.
    pub combined: Option<CombinedView>,
}

impl DashboardReport {
    pub fn loaded(&self) -> impl Iterator<Item = &AnalyzedSeries> {
        self.sections.iter().filter_map(|section| match section {
            SymbolSection::Loaded { series } => Some(series),
            SymbolSection::Failed { .. } => None,
        })
    }
}

pub struct Dashboard {
    source: Box<dyn MarketDataSource>,
}

impl Dashboard {
    pub fn new(source: Box<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Fetches and analyzes every requested symbol one after another, then merges
    /// the successful ones. A failing symbol never stops the others.
    pub async fn run(&self, request: &DashboardRequest) -> DashboardReport {
        info!(
            "Render cycle: {} symbol(s), timespan {}, window {}",
            request.symbols.len(),
            request.timespan,
            request.window.get()
        );
        let analyzer = MovingAverageAnalyzer::new(request.window);
        let mut sections = Vec::with_capacity(request.symbols.len());

        for symbol in &request.symbols {
            let query = Query::new(symbol.as_str(), request.timespan, request.interval);
            match self.source.fetch(&query).await {
                Ok(series) if !series.is_empty() => {
                    let analyzed = analyzer.analyze(symbol, series);
                    sections.push(SymbolSection::Loaded { series: analyzed });
                }
                Ok(_) => {
                    warn!("Empty series for {}", symbol);
                    sections.push(SymbolSection::Failed {
                        symbol: symbol.clone(),
                        notices: vec![no_data_notice(symbol)],
                    });
                }
                Err(e) => {
                    warn!("Fetch failed for {}: {}", symbol, e);
                    sections.push(SymbolSection::Failed {
                        symbol: symbol.clone(),
                        notices: vec![fetch_error_notice(symbol, &e), no_data_notice(symbol)],
                    });
                }
            }
        }

        let mut report = DashboardReport {
            sections,
            combined: None,
        };
        let charted = report.loaded().count();
        if charted > 0 {
            report.combined = Some(combine(report.loaded()));
        }
        info!(
            "Render cycle done: {} of {} symbol(s) charted",
            charted,
            request.symbols.len()
        );
        report
    }
}

fn fetch_error_notice(symbol: &str, error: &FetchError) -> String {
    match error {
        FetchError::UnexpectedFormat { payload } => {
            format!("Unexpected API response format for {}: {}", symbol, payload)
        }
        other => format!("Error fetching data for {}: {}", symbol, other),
    }
}

fn no_data_notice(symbol: &str) -> String {
    format!(
        "No data found for {}. Please check the symbol or try again later.",
        symbol
    )
}
