// HTML rendering of the dashboard page
use crate::model::{AnalyzedSeries, CombinedView, Interval, MovingAverageWindow, Timespan};
use crate::presenter::{DashboardReport, SymbolSection};
use crate::utils::{escape_html, format_timestamp};
use std::fmt::Write;
use strum::IntoEnumIterator;

const PAGE_TITLE: &str = "Stock Data Visualization";
const TITLE: &str = "Stock Data Visualization and Analysis";
const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";
const MA_NOTE: &str = "The moving averages are shown in the chart as 'MA', which can help identify trends over the specified window size.";

/// Current state of the sidebar controls.
#[derive(Debug, Clone)]
pub struct FormState {
    pub symbols: String,
    pub timespan: Timespan,
    pub interval: Interval,
    pub window: String,
}

pub struct PageContext<'a> {
    pub form: FormState,
    pub error: Option<String>,
    pub report: Option<&'a DashboardReport>,
    pub refresh_seconds: Option<u64>,
}

pub fn render_page(ctx: &PageContext<'_>) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    if let Some(seconds) = ctx.refresh_seconds {
        let _ = writeln!(html, "<meta http-equiv=\"refresh\" content=\"{}\">", seconds);
    }
    let _ = writeln!(html, "<title>{}</title>", PAGE_TITLE);
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");

    render_sidebar(&mut html, &ctx.form);

    html.push_str("<main>\n");
    let _ = writeln!(html, "<h1>{}</h1>", TITLE);
    if let Some(error) = &ctx.error {
        let _ = writeln!(html, "<div class=\"error\">{}</div>", escape_html(error));
    }
    if let Some(report) = ctx.report {
        render_report(&mut html, report);
    }
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_sidebar(html: &mut String, form: &FormState) {
    html.push_str("<aside>\n<form method=\"get\" action=\"/\">\n");
    let _ = writeln!(
        html,
        "<label>Enter Stock Symbols (comma-separated)<input type=\"text\" name=\"symbols\" value=\"{}\"></label>",
        escape_html(&form.symbols)
    );

    html.push_str("<label>Choose Time Span<select name=\"timespan\" onchange=\"this.form.submit()\">");
    for timespan in Timespan::iter() {
        push_option(html, &timespan.to_string(), timespan == form.timespan);
    }
    html.push_str("</select></label>\n");

    if form.timespan == Timespan::Intraday {
        html.push_str("<label>Select Interval<select name=\"interval\">");
        for interval in Interval::iter() {
            push_option(html, &interval.to_string(), interval == form.interval);
        }
        html.push_str("</select></label>\n");
    }

    let _ = writeln!(
        html,
        "<label>Moving Average Window Size<input type=\"number\" name=\"window\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\"></label>",
        MovingAverageWindow::MIN,
        MovingAverageWindow::MAX,
        escape_html(&form.window)
    );
    html.push_str("<button type=\"submit\">Run</button>\n</form>\n</aside>\n");
}

fn push_option(html: &mut String, value: &str, selected: bool) {
    let _ = write!(
        html,
        "<option value=\"{0}\"{1}>{0}</option>",
        value,
        if selected { " selected" } else { "" }
    );
}

fn render_report(html: &mut String, report: &DashboardReport) {
    for section in &report.sections {
        match section {
            SymbolSection::Loaded { series } => render_ohlc_table(html, series),
            SymbolSection::Failed { notices, .. } => {
                for notice in notices {
                    let _ = writeln!(html, "<div class=\"error\">{}</div>", escape_html(notice));
                }
            }
        }
    }

    if let Some(combined) = &report.combined {
        render_chart(html, combined);
        let _ = writeln!(html, "<p>{}</p>", MA_NOTE);
    }
}

fn render_ohlc_table(html: &mut String, series: &AnalyzedSeries) {
    let _ = writeln!(html, "<h3>Data for {}</h3>", escape_html(&series.symbol));
    html.push_str("<div class=\"table\"><table>\n<thead><tr><th></th><th>open</th><th>high</th><th>low</th><th>close</th></tr></thead>\n<tbody>\n");
    for row in &series.rows {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{:.4}</td><td>{:.4}</td><td>{:.4}</td><td>{:.4}</td></tr>",
            format_timestamp(&row.timestamp),
            row.bar.open,
            row.bar.high,
            row.bar.low,
            row.bar.close
        );
    }
    html.push_str("</tbody>\n</table></div>\n");
}

fn render_chart(html: &mut String, combined: &CombinedView) {
    let data = match serde_json::to_string(&combined.chart_data()) {
        Ok(json) => json.replace("</", "<\\/"),
        Err(e) => {
            tracing::warn!("Chart serialization failed: {}", e);
            return;
        }
    };
    html.push_str("<div class=\"chart\"><canvas id=\"chart\"></canvas></div>\n");
    let _ = writeln!(html, "<script src=\"{}\"></script>", CHART_JS);
    let _ = writeln!(
        html,
        "<script>\nnew Chart(document.getElementById('chart'), {{ type: 'line', data: {}, options: {{ animation: false, spanGaps: false, elements: {{ point: {{ radius: 0 }} }}, interaction: {{ mode: 'index', intersect: false }} }} }});\n</script>",
        data
    );
}

const STYLE: &str = "<style>
body { margin: 0; display: flex; font-family: sans-serif; }
aside { width: 18rem; padding: 1.5rem; background: #f0f2f6; min-height: 100vh; }
aside label { display: block; margin-bottom: 1rem; font-size: 0.9rem; }
aside input, aside select { display: block; width: 100%; margin-top: 0.3rem; }
main { flex: 1; padding: 1.5rem 3rem; min-width: 0; }
.error { background: #ffe5e5; color: #8a1c1c; padding: 0.75rem; margin: 0.5rem 0; border-radius: 0.4rem; word-break: break-all; }
.table { max-height: 22rem; overflow-y: auto; margin-bottom: 1.5rem; }
table { border-collapse: collapse; font-size: 0.85rem; }
th, td { border: 1px solid #ddd; padding: 0.2rem 0.6rem; text-align: right; }
.chart { position: relative; height: 28rem; }
</style>
";
