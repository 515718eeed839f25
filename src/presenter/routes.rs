use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::model::InputError;
use crate::presenter::form::{DashboardForm, DashboardRequest, FormDefaults};
use crate::presenter::page::{render_page, FormState, PageContext};
use crate::presenter::{Dashboard, DashboardReport};

pub struct AppState {
    pub dashboard: Dashboard,
    pub defaults: FormDefaults,
    pub refresh_seconds: Option<u64>,
}

/// Error type for the JSON endpoint.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/dashboard", get(api_dashboard))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn index(State(state): State<Arc<AppState>>, Query(form): Query<DashboardForm>) -> Response {
    let form_state = FormState {
        symbols: form.symbols_text(&state.defaults).to_string(),
        timespan: form.selected_timespan(),
        interval: form.selected_interval(),
        window: form
            .window
            .clone()
            .unwrap_or_else(|| state.defaults.window.get().to_string()),
    };

    let request = match form.parse(&state.defaults) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected form input: {}", e);
            let page = render_page(&PageContext {
                form: form_state,
                error: Some(e.to_string()),
                report: None,
                refresh_seconds: None,
            });
            return (StatusCode::BAD_REQUEST, Html(page)).into_response();
        }
    };

    let report = run_if_any(&state, &request).await;
    Html(render_page(&PageContext {
        form: form_state,
        error: None,
        report: report.as_ref(),
        refresh_seconds: state.refresh_seconds,
    }))
    .into_response()
}

async fn api_dashboard(
    State(state): State<Arc<AppState>>,
    Query(form): Query<DashboardForm>,
) -> Result<Json<DashboardReport>, ApiError> {
    let request = form.parse(&state.defaults)?;
    let report = state.dashboard.run(&request).await;
    Ok(Json(report))
}

async fn run_if_any(state: &AppState, request: &DashboardRequest) -> Option<DashboardReport> {
    if request.symbols.is_empty() {
        info!("No symbols entered, rendering form only");
        return None;
    }
    Some(state.dashboard.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::tests::StubSource;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            dashboard: Dashboard::new(Box::new(StubSource::default().with("IBM", 25, 0))),
            defaults: FormDefaults::default(),
            refresh_seconds: None,
        })
    }

    fn form(pairs: &[(&str, &str)]) -> DashboardForm {
        let mut form = DashboardForm::default();
        for &(key, value) in pairs {
            let value = Some(value.to_string());
            match key {
                "symbols" => form.symbols = value,
                "timespan" => form.timespan = value,
                "interval" => form.interval = value,
                "window" => form.window = value,
                _ => {}
            }
        }
        form
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn index_renders_default_symbol() {
        let response = index(State(state()), Query(DashboardForm::default())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(html.contains("<h3>Data for IBM</h3>"));
        assert!(html.contains("<canvas id=\"chart\">"));
    }

    #[tokio::test]
    async fn index_rejects_out_of_range_window() {
        let response = index(
            State(state()),
            Query(form(&[("symbols", "IBM"), ("window", "500")])),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body(response).await;
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("value=\"500\""));
        assert!(!html.contains("<canvas"));
    }

    #[tokio::test]
    async fn rejected_form_keeps_chosen_timespan() {
        let response = index(
            State(state()),
            Query(form(&[
                ("symbols", "IBM"),
                ("timespan", "intraday"),
                ("interval", "15min"),
                ("window", "0"),
            ])),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body(response).await;
        assert!(html.contains("<option value=\"intraday\" selected>intraday</option>"));
        assert!(html.contains("<option value=\"15min\" selected>15min</option>"));
        assert!(!html.contains("<option value=\"daily\" selected>"));
    }

    #[tokio::test]
    async fn blank_symbols_render_form_only() {
        let response = index(State(state()), Query(form(&[("symbols", " , ")]))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(!html.contains("Data for"));
        assert!(!html.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn api_reports_sections_and_chart() {
        let Json(report) = api_dashboard(
            State(state()),
            Query(form(&[("symbols", "ibm, nope")])),
        )
        .await
        .unwrap();

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["sections"][0]["status"], "loaded");
        assert_eq!(value["sections"][0]["series"]["symbol"], "IBM");
        assert_eq!(value["sections"][1]["status"], "failed");
        assert_eq!(value["sections"][1]["symbol"], "NOPE");
        assert_eq!(value["combined"]["datasets"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn api_rejects_bad_timespan() {
        let result = api_dashboard(State(state()), Query(form(&[("timespan", "hourly")]))).await;
        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body(response).await.contains("unknown time span 'hourly'"));
    }
}
