use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, OffsetDateTime, UtcOffset};
use usage_core::{
    build_report, narrative::compose_prompt, normalize, DashboardReport, PeriodSelection,
    RowMeanPolicy,
};

use crate::{
    config::{AppConfig, MetricsConfig},
    error::DashboardError,
    metrics_server,
    sources::{self, SnapshotCache},
    summarizer::{OpenAiSummarizer, Summarizer},
};

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SnapshotCache>,
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub utc_offset: UtcOffset,
    pub default_period: PeriodSelection,
    pub row_mean_policy: RowMeanPolicy,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let source = sources::from_config(&cfg.source)?;
        let cache = SnapshotCache::new(source, Duration::from_secs(cfg.source.cache_ttl_secs));

        let summarizer: Option<Arc<dyn Summarizer>> = match &cfg.summarizer {
            Some(s) => Some(Arc::new(OpenAiSummarizer::from_config(s)?)),
            None => None,
        };

        let utc_offset = UtcOffset::from_hms(cfg.dashboard.utc_offset_hours, 0, 0)
            .map_err(|e| anyhow::anyhow!("invalid dashboard.utc_offset_hours: {e}"))?;

        let default_period = cfg.dashboard.default_period.parse::<PeriodSelection>()?;

        Ok(Self {
            cache: Arc::new(cache),
            summarizer,
            utc_offset,
            default_period,
            row_mean_policy: cfg.dashboard.row_mean_policy,
        })
    }

    /// A missing period means the default one. An unknown label resolves to
    /// `None`, which serves the unfiltered table.
    fn resolve_period(&self, query: &DashboardQuery) -> Option<PeriodSelection> {
        match query.period.as_deref().map(str::trim) {
            None | Some("") => Some(self.default_period),
            Some(label) => {
                let period = PeriodSelection::parse(label);
                if period.is_none() {
                    tracing::warn!(period = label, "unrecognized period, serving unfiltered table");
                }
                period
            }
        }
    }

    fn resolve_today(&self, query: &DashboardQuery) -> Result<Date, DashboardError> {
        match query.today.as_deref() {
            Some(s) => Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
                .map_err(|e| DashboardError::InvalidQuery(format!("today '{s}': {e}"))),
            None => Ok(OffsetDateTime::now_utc().to_offset(self.utc_offset).date()),
        }
    }

    async fn report(&self, query: &DashboardQuery) -> Result<DashboardReport, DashboardError> {
        let period = self.resolve_period(query);
        let today = self.resolve_today(query)?;

        let raw = self.cache.get().await?;
        let (table, norm) = normalize(&raw);
        if norm.dropped_rows > 0 || !norm.missing_columns.is_empty() {
            tracing::debug!(
                total = norm.total_rows,
                dropped = norm.dropped_rows,
                missing_columns = ?norm.missing_columns,
                "normalized with losses"
            );
        }

        metrics::counter!(
            "dashboard_requests_total",
            "period" => period.map(PeriodSelection::id).unwrap_or("all")
        )
        .increment(1);

        Ok(build_report(&table, period, today, self.row_mean_policy))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
    /// `YYYY-MM-DD`; defaults to the current date at the configured offset.
    pub today: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PeriodOption {
    pub id: &'static str,
    pub label: &'static str,
    pub is_default: bool,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub period_label: String,
    pub today: Date,
    pub prompt: String,
    pub summary: String,
}

pub fn router(state: AppState, metrics: Option<&MetricsConfig>) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/periods", get(list_periods))
        .route("/api/dashboard", get(dashboard))
        .route("/api/summary", get(summary))
        .route("/api/refresh", post(refresh))
        .with_state(state);

    match metrics {
        Some(m) => app.merge(metrics_server::router::<()>(&m.route)),
        None => app,
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn list_periods(State(state): State<AppState>) -> Json<Vec<PeriodOption>> {
    let options = PeriodSelection::ALL
        .into_iter()
        .map(|p| PeriodOption {
            id: p.id(),
            label: p.label(),
            is_default: p == state.default_period,
        })
        .collect();
    Json(options)
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardReport>, DashboardError> {
    Ok(Json(state.report(&query).await?))
}

async fn summary(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<SummaryResponse>, DashboardError> {
    let summarizer = state
        .summarizer
        .clone()
        .ok_or(DashboardError::SummarizerDisabled)?;

    let report = state.report(&query).await?;
    let prompt = compose_prompt(&report);
    let summary = summarizer.summarize(&prompt).await?;

    Ok(Json(SummaryResponse {
        period_label: report.period_label,
        today: report.today,
        prompt,
        summary,
    }))
}

async fn refresh(State(state): State<AppState>) -> StatusCode {
    state.cache.invalidate().await;
    StatusCode::NO_CONTENT
}
