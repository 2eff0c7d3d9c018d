//! Measured latency readings from the metrics backend.

use std::fmt;

/// The kind of tracing span a latency reading was aggregated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpanKind {
    /// Covers an incoming request inclusive of all downstream work.
    Server,
    /// Covers a single outgoing call to a downstream tier.
    Client,
}

impl SpanKind {
    /// The label value this span kind is emitted under by the tracing pipeline.
    pub fn metric_label(&self) -> &'static str {
        match self {
            SpanKind::Server => "SPAN_KIND_SERVER",
            SpanKind::Client => "SPAN_KIND_CLIENT",
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metric_label())
    }
}

/// The outcome of a single average-latency (or rate) query.
///
/// `NoData` and a bare `0.0` are the same thing by the time this reaches
/// callers — the metrics client folds a zero-denominator query result into
/// `Ok(0.0)` rather than a distinct variant: a query whose denominator
/// is zero or whose result set is empty returns zero, not a special
/// marker. The
/// only failure mode that survives to this type is `Error`, for a query
/// that could not be evaluated at all.
pub type LatencyReading = Result<f64, ReadingError>;

/// Why a latency/rate reading could not be produced.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReadingError {
    #[error("metrics backend transport error: {0}")]
    Transport(String),
    #[error("metrics backend returned an unparseable or missing scalar: {0}")]
    Shape(String),
    #[error("metrics query timed out")]
    Timeout,
}
