use serde::Deserialize;
use std::fs;
use usage_core::RowMeanPolicy;

/// Google Sheets xlsx export of the daily usage workbook.
pub const DEFAULT_SOURCE_URL: &str =
    "https://docs.google.com/spreadsheets/d/1RgWa7PSEVr-rmftl1KmYrpH_04yERQ-ANNJJJBhlVLc/export?format=xlsx";
pub const DEFAULT_SHEET_NAME: &str = "PLTU ANGGREK";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    XlsxUrl,
    CsvFile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_source_url")]
    pub url: String,
    /// Local CSV export, used when `kind = "csv_file"`.
    pub path: Option<String>,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Fixed offset used to decide what "today" is. Asia/Jakarta by default.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,
    #[serde(default = "default_period")]
    pub default_period: String,
    #[serde(default)]
    pub row_mean_policy: RowMeanPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            default_period: default_period(),
            row_mean_policy: RowMeanPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    /// Base of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_summarizer_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Filled from `api_key_env` at load time, never from the file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_route")]
    pub route: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    pub summarizer: Option<SummarizerConfig>,
    pub metrics: Option<MetricsConfig>,
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_utc_offset_hours() -> i8 {
    7
}

fn default_period() -> String {
    "this_month".to_string()
}

fn default_api_key_env() -> String {
    "SUMMARIZER_API_KEY".to_string()
}

fn default_summarizer_timeout_secs() -> u64 {
    60
}

fn default_metrics_route() -> String {
    "/metrics".to_string()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("DASHBOARD_CONFIG")
            .unwrap_or_else(|_| "dashboard-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config '{path}': {e}"))?;
        let mut cfg = Self::from_toml_str(&contents)?;
        cfg.apply_env(|key| env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Source URL and summarizer credential may come from the environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DASHBOARD_SOURCE_URL").filter(|u| !u.trim().is_empty()) {
            self.source.url = url;
        }
        if let Some(s) = self.summarizer.as_mut() {
            s.api_key = lookup(&s.api_key_env).filter(|k| !k.trim().is_empty());
        }
    }
}
