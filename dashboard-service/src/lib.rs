pub mod config;
pub mod error;
pub mod metrics_server;
pub mod observability;
pub mod routes;
pub mod sources;
pub mod summarizer;

pub use error::DashboardError;
pub use routes::{router, AppState};
