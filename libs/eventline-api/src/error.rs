use std::fmt;

/// Error kind, the pipeline's failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client-supplied event missing/invalid a required field.
    /// Surfaced to the caller, never retried by the pipeline.
    Validation,
    /// Malformed internal payload on the log.
    Decode,
    /// Missing or mistyped attribute in a change-feed image.
    Extraction,
    /// Transient connectivity/throughput failure on publish or write.
    Downstream,
    /// Latency metric could not be emitted. Logged only, never aborts.
    Metric,
}

/// Pipeline error returned by every stage entry point.
#[derive(Debug, Clone)]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Validation, message: msg.into() }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Decode, message: msg.into() }
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Extraction, message: msg.into() }
    }

    pub fn downstream(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Downstream, message: msg.into() }
    }

    pub fn metric(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Metric, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PipelineError {}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        Self::decode(e.to_string())
    }
}
