use thiserror::Error;

/// Failure talking to an external platform. Credential problems are kept
/// separate from transport and API-level failures so callers can surface
/// "not configured" differently from "try later".
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("missing credentials: set {0}")]
    MissingCredentials(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("api error ({status}): {detail}")]
    Api { status: u16, detail: String },
}

/// Outcome taxonomy for one analysis run. The three variants must stay
/// distinguishable: an unreachable platform is not "zero results", and a
/// query that found nothing is not the same as thresholds rejecting
/// everything it found.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("platform unavailable: {0}")]
    UpstreamUnavailable(#[source] PlatformError),
    #[error("no candidates found for query")]
    NoCandidates,
    #[error("no candidates matched the filters")]
    NoneMatchedFilters,
}

impl AnalysisError {
    /// Stable machine-readable code for the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::UpstreamUnavailable(_) => "upstream_unavailable",
            AnalysisError::NoCandidates => "no_candidates",
            AnalysisError::NoneMatchedFilters => "none_matched_filters",
        }
    }
}
