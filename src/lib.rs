pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CountingSource, JsonPlaceholderClient};
pub use app::{build_router, serve, AppState};
pub use config::ServiceConfig;
pub use crate::core::{Aggregation, AggregationMode, CommentAggregator};
pub use domain::ports::PostSource;
pub use utils::error::{ProxyError, Result};
