use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the meeting provider.
///
/// The booking coordinator never inspects these beyond "the provider failed";
/// they are propagated unchanged to the request surface.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Zoom API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Zoom API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Zoom authentication failed: {0}")]
    Auth(String),

    #[error("Incorrect response from Zoom API: {0}")]
    MalformedResponse(String),
}

/// The candidate meeting overlaps a meeting that is already booked.
///
/// This is an expected outcome of a booking attempt, not a fault.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Meeting overlaps with existing meetings")]
pub struct ConflictError;

/// Startup configuration problems.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
