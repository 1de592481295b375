//! Search session state machine
//!
//! `Idle → Loading → {Success, Error} → Loading → …`
//!
//! Every submission takes a new sequence number. A completion is applied only
//! while its sequence is still the latest, so the last submitted search wins
//! and older in-flight results are dropped when they arrive.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregator::generate_location_details;
use crate::generation::GenerationClient;
use crate::models::LocationData;
use crate::{ExplorerError, Result};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a location to search.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred. Please try again.";

/// What the UI should currently show
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SearchState {
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Error {
        message: String,
    },
    Success {
        query: String,
        data: LocationData,
        completed_at: DateTime<Utc>,
    },
}

impl SearchState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading { .. })
    }

    #[must_use]
    pub fn data(&self) -> Option<&LocationData> {
        match self {
            SearchState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            SearchState::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Handle for one accepted submission
#[derive(Debug)]
pub struct SearchTicket {
    sequence: u64,
    query: String,
}

impl SearchTicket {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Default)]
struct Session {
    sequence: u64,
    state: SearchState,
}

/// Owns the search session and drives the aggregator
pub struct SearchController {
    client: Arc<dyn GenerationClient>,
    session: Mutex<Session>,
}

impl SearchController {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            session: Mutex::new(Session::default()),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.lock().state.clone()
    }

    /// Run a full search for `query` and return the state it settled in.
    ///
    /// The returned state is the session's current state, which may belong
    /// to a newer submission if this one was overtaken.
    pub async fn submit(&self, query: &str) -> SearchState {
        let ticket = match self.begin(query) {
            Ok(ticket) => ticket,
            Err(state) => return state,
        };

        let result = generate_location_details(Arc::clone(&self.client), ticket.query()).await;
        self.complete(ticket, result)
    }

    /// Validate `query` and move to `Loading`.
    ///
    /// A blank query moves straight to `Error` and is returned as `Err`.
    pub fn begin(&self, query: &str) -> std::result::Result<SearchTicket, SearchState> {
        let mut session = self.lock();
        session.sequence += 1;

        let query = query.trim();
        if query.is_empty() {
            debug!("Rejected empty search");
            session.state = SearchState::Error {
                message: ExplorerError::EmptyQuery.to_string(),
            };
            return Err(session.state.clone());
        }

        info!(sequence = session.sequence, "Searching for \"{}\"", query);
        session.state = SearchState::Loading {
            query: query.to_string(),
        };
        Ok(SearchTicket {
            sequence: session.sequence,
            query: query.to_string(),
        })
    }

    /// Apply the outcome of `ticket` unless a newer submission exists.
    pub fn complete(&self, ticket: SearchTicket, result: Result<LocationData>) -> SearchState {
        let mut session = self.lock();

        if ticket.sequence != session.sequence {
            debug!(
                stale = ticket.sequence,
                current = session.sequence,
                "Discarding result of superseded search"
            );
            return session.state.clone();
        }

        session.state = match result {
            Ok(data) => SearchState::Success {
                query: ticket.query,
                data,
                completed_at: Utc::now(),
            },
            Err(err) => {
                warn!(code = err.code().as_str(), "Search failed: {}", err);
                SearchState::Error {
                    message: display_message(err.to_string()),
                }
            }
        };
        session.state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn display_message(message: String) -> String {
    if message.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EIFFEL_IMAGE, MockClient, eiffel_narrative};
    use rstest::rstest;

    fn controller(client: &Arc<MockClient>) -> SearchController {
        SearchController::new(client.clone())
    }

    #[test]
    fn test_starts_idle() {
        let client = Arc::new(MockClient::succeeding());
        assert_eq!(controller(&client).state(), SearchState::Idle);
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaces("   ")]
    #[case::tabs_and_newlines("\t\n ")]
    #[tokio::test]
    async fn test_blank_query_makes_no_calls(#[case] query: &str) {
        let client = Arc::new(MockClient::succeeding());
        let controller = controller(&client);

        let state = controller.submit(query).await;

        assert_eq!(
            state,
            SearchState::Error {
                message: EMPTY_QUERY_MESSAGE.to_string()
            }
        );
        assert_eq!(client.narrative_calls(), 0);
        assert_eq!(client.image_calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_search() {
        let client = Arc::new(MockClient::succeeding());
        let controller = controller(&client);

        let state = controller.submit("  Eiffel Tower ").await;

        match &state {
            SearchState::Success { query, data, .. } => {
                assert_eq!(query, "Eiffel Tower");
                assert_eq!(data.description, eiffel_narrative().description);
                assert_eq!(data.facts, eiffel_narrative().facts);
                assert_eq!(data.image_url, EIFFEL_IMAGE);
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert!(!state.is_loading());
        assert_eq!(controller.state(), state);
    }

    #[tokio::test]
    async fn test_failed_search_shows_aggregate_message() {
        let client = Arc::new(MockClient::new(
            Ok(eiffel_narrative()),
            Err(ExplorerError::GenerationEmpty),
        ));
        let controller = controller(&client);

        let state = controller.submit("Eiffel Tower").await;

        assert_eq!(
            state.error_message(),
            Some(
                "Failed to fetch details for \"Eiffel Tower\". Please check your API key and network connection."
            )
        );
        assert!(state.data().is_none());
    }

    #[tokio::test]
    async fn test_new_search_clears_previous_result() {
        let client = Arc::new(MockClient::succeeding());
        let controller = controller(&client);
        controller.submit("Eiffel Tower").await;

        let ticket = controller.begin("Grand Canyon").unwrap();

        assert_eq!(
            controller.state(),
            SearchState::Loading {
                query: "Grand Canyon".to_string()
            }
        );
        assert_eq!(ticket.query(), "Grand Canyon");
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_while_in_flight() {
        let client = Arc::new(
            MockClient::succeeding().with_delay(std::time::Duration::from_secs(1)),
        );
        let controller = Arc::new(controller(&client));

        let running = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("Eiffel Tower").await })
        };
        tokio::task::yield_now().await;

        assert!(controller.state().is_loading());
        let state = running.await.unwrap();
        assert!(state.data().is_some());
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let client = Arc::new(MockClient::succeeding());
        let controller = controller(&client);

        let first = controller.begin("Paris").unwrap();
        let second = controller.begin("Rome").unwrap();
        assert!(second.sequence() > first.sequence());

        let data = LocationData::new(eiffel_narrative(), EIFFEL_IMAGE.to_string());
        let state = controller.complete(first, Ok(data.clone()));
        assert_eq!(
            state,
            SearchState::Loading {
                query: "Rome".to_string()
            }
        );

        let state = controller.complete(second, Ok(data));
        assert!(matches!(state, SearchState::Success { ref query, .. } if query == "Rome"));
    }

    #[test]
    fn test_empty_submit_supersedes_in_flight_search() {
        let client = Arc::new(MockClient::succeeding());
        let controller = controller(&client);

        let ticket = controller.begin("Paris").unwrap();
        assert!(controller.begin("").is_err());

        let state = controller.complete(ticket, Err(ExplorerError::GenerationEmpty));
        assert_eq!(state.error_message(), Some(EMPTY_QUERY_MESSAGE));
    }

    #[test]
    fn test_unknown_error_fallback() {
        assert_eq!(display_message(String::new()), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(display_message("boom".to_string()), "boom");
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(SearchState::Loading {
            query: "Paris".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "loading", "query": "Paris"}));

        let json = serde_json::to_value(SearchState::Idle).unwrap();
        assert_eq!(json, serde_json::json!({"status": "idle"}));
    }
}
