//! Error types and handling for the Location Explorer

use serde::Serialize;
use thiserror::Error;

/// Maximum number of characters of a remote error body kept in messages
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Coarse classification of every failure a search can end in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The query was empty after trimming
    EmptyQuery,
    /// The narrative payload did not match the requested schema
    MalformedResponse,
    /// The image service answered without any image
    GenerationEmpty,
    /// Network, HTTP status or payload decoding failure
    TransportFailure,
    /// Invalid or incomplete configuration
    Config,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyQuery => "empty_query",
            ErrorCode::MalformedResponse => "malformed_response",
            ErrorCode::GenerationEmpty => "generation_empty",
            ErrorCode::TransportFailure => "transport_failure",
            ErrorCode::Config => "config",
        }
    }
}

/// Main error type for the Location Explorer
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// The user submitted nothing to search for
    #[error("Please enter a location to search.")]
    EmptyQuery,

    /// The narrative response could not be parsed as the requested schema
    #[error("The API returned an invalid data format.")]
    MalformedResponse { payload: String },

    /// The image service produced no image
    #[error("Image generation failed to produce an image.")]
    GenerationEmpty,

    /// Non-success HTTP status from the generation service
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Returned image bytes were not valid base64
    #[error("Failed to decode image payload: {0}")]
    Decode(String),

    /// A generation task ended without producing a result
    #[error("Generation task did not complete: {0}")]
    Task(String),

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// One of the two generation calls of a search failed
    #[error(
        "Failed to fetch details for \"{query}\". Please check your API key and network connection."
    )]
    Aggregate {
        query: String,
        #[source]
        source: Box<ExplorerError>,
    },
}

impl ExplorerError {
    /// Create a new malformed response error keeping the raw payload
    pub fn malformed<S: Into<String>>(payload: S) -> Self {
        Self::MalformedResponse {
            payload: payload.into(),
        }
    }

    /// Create a new API error, trimming oversized bodies
    pub fn api<S: AsRef<str>>(status: u16, body: S) -> Self {
        Self::Api {
            status,
            message: sanitize_error_message(body.as_ref()),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap a sub-call failure into the aggregate failure for `query`
    pub fn aggregate<S: Into<String>>(query: S, source: ExplorerError) -> Self {
        Self::Aggregate {
            query: query.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through aggregate wrappers
    #[must_use]
    pub fn root(&self) -> &ExplorerError {
        match self {
            ExplorerError::Aggregate { source, .. } => source.root(),
            other => other,
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            ExplorerError::EmptyQuery => ErrorCode::EmptyQuery,
            ExplorerError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            ExplorerError::GenerationEmpty => ErrorCode::GenerationEmpty,
            ExplorerError::Api { .. }
            | ExplorerError::Network(_)
            | ExplorerError::Decode(_)
            | ExplorerError::Task(_) => ErrorCode::TransportFailure,
            ExplorerError::Config { .. } => ErrorCode::Config,
            ExplorerError::Aggregate { source, .. } => source.code(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ExplorerError::Api { .. } | ExplorerError::Network(_) | ExplorerError::Task(_) => {
                "Unable to reach the generation service. Please check your internet connection."
                    .to_string()
            }
            ExplorerError::Decode(_) => "The generated image could not be read.".to_string(),
            ExplorerError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Collapse whitespace and cut remote error bodies down to a loggable size.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = collapsed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{truncated}...")
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExplorerError::EmptyQuery.code(), ErrorCode::EmptyQuery);
        assert_eq!(
            ExplorerError::malformed("{oops").code(),
            ErrorCode::MalformedResponse
        );
        assert_eq!(
            ExplorerError::GenerationEmpty.code(),
            ErrorCode::GenerationEmpty
        );
        assert_eq!(
            ExplorerError::api(503, "unavailable").code(),
            ErrorCode::TransportFailure
        );
        assert_eq!(
            ExplorerError::Decode("bad".into()).code(),
            ErrorCode::TransportFailure
        );
        assert_eq!(
            ExplorerError::Task("task was cancelled".into()).code(),
            ErrorCode::TransportFailure
        );
    }

    #[test]
    fn test_aggregate_keeps_root_cause() {
        let err = ExplorerError::aggregate("Eiffel Tower", ExplorerError::malformed("not json"));
        assert_eq!(err.code(), ErrorCode::MalformedResponse);
        assert!(matches!(
            err.root(),
            ExplorerError::MalformedResponse { payload } if payload == "not json"
        ));
        assert_eq!(
            err.to_string(),
            "Failed to fetch details for \"Eiffel Tower\". Please check your API key and network connection."
        );
    }

    #[test]
    fn test_user_messages() {
        let api_err = ExplorerError::api(500, "boom");
        assert!(api_err.user_message().contains("Unable to reach"));

        let malformed = ExplorerError::malformed("x");
        assert_eq!(
            malformed.user_message(),
            "The API returned an invalid data format."
        );

        let aggregate = ExplorerError::aggregate("Paris", ExplorerError::GenerationEmpty);
        assert!(aggregate.user_message().contains("\"Paris\""));
    }

    #[test]
    fn test_sanitize_error_message() {
        assert_eq!(sanitize_error_message("  a \n b\t c "), "a b c");

        let long = "x".repeat(MAX_ERROR_BODY_CHARS + 50);
        let sanitized = sanitize_error_message(&long);
        assert!(sanitized.ends_with("..."));
        assert_eq!(sanitized.chars().count(), MAX_ERROR_BODY_CHARS + 3);
    }

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::TransportFailure.as_str(), "transport_failure");
        assert_eq!(
            serde_json::to_value(ErrorCode::GenerationEmpty).unwrap(),
            serde_json::json!("generation_empty")
        );
    }
}
