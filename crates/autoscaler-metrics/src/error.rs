//! Metrics backend error taxonomy.

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("metrics backend transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("metrics backend returned an unparseable or missing scalar: {0}")]
    Shape(String),
    #[error("metrics query timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<MetricsError> for autoscaler_core::latency::ReadingError {
    fn from(err: MetricsError) -> Self {
        use autoscaler_core::latency::ReadingError;
        match err {
            MetricsError::Transport(e) => ReadingError::Transport(e.to_string()),
            MetricsError::Shape(msg) => ReadingError::Shape(msg),
            MetricsError::Timeout(_) => ReadingError::Timeout,
        }
    }
}
