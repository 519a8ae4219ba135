use crate::config::ServiceConfig;
use crate::core::aggregate::CommentAggregator;
use crate::domain::ports::PostSource;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn PostSource>,
    pub config: Arc<ServiceConfig>,
    pub aggregator: CommentAggregator,
}

impl AppState {
    pub fn new(source: Arc<dyn PostSource>, config: ServiceConfig) -> Self {
        let aggregator = CommentAggregator::new(Arc::clone(&source), config.aggregate_limit);

        Self {
            source,
            config: Arc::new(config),
            aggregator,
        }
    }
}
