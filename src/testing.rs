//! Test doubles shared by the unit tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::generation::GenerationClient;
use crate::models::Narrative;
use crate::{ExplorerError, Result};

pub(crate) const EIFFEL_IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

pub(crate) fn eiffel_narrative() -> Narrative {
    Narrative {
        description: "A paragraph...".into(),
        facts: vec!["fact1".into(), "fact2".into(), "fact3".into()],
    }
}

/// Replays fixed outcomes and counts how often each call was made
pub(crate) struct MockClient {
    narrative: Mutex<Result<Narrative>>,
    image: Mutex<Result<String>>,
    narrative_delay: Duration,
    image_delay: Duration,
    narrative_calls: AtomicUsize,
    image_calls: AtomicUsize,
    completed_calls: AtomicUsize,
}

impl MockClient {
    pub(crate) fn new(narrative: Result<Narrative>, image: Result<String>) -> Self {
        Self {
            narrative: Mutex::new(narrative),
            image: Mutex::new(image),
            narrative_delay: Duration::ZERO,
            image_delay: Duration::ZERO,
            narrative_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            completed_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn succeeding() -> Self {
        Self::new(Ok(eiffel_narrative()), Ok(EIFFEL_IMAGE.into()))
    }

    pub(crate) fn with_delay(self, delay: Duration) -> Self {
        self.with_narrative_delay(delay).with_image_delay(delay)
    }

    pub(crate) fn with_narrative_delay(mut self, delay: Duration) -> Self {
        self.narrative_delay = delay;
        self
    }

    pub(crate) fn with_image_delay(mut self, delay: Duration) -> Self {
        self.image_delay = delay;
        self
    }

    pub(crate) fn narrative_calls(&self) -> usize {
        self.narrative_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    /// Calls that got past their delay and produced an outcome
    pub(crate) fn completed_calls(&self) -> usize {
        self.completed_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.completed_calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn replay<T: Clone>(outcome: &Mutex<Result<T>>) -> Result<T> {
    match &*outcome.lock().unwrap() {
        Ok(value) => Ok(value.clone()),
        Err(err) => Err(copy_error(err)),
    }
}

fn copy_error(err: &ExplorerError) -> ExplorerError {
    match err {
        ExplorerError::EmptyQuery => ExplorerError::EmptyQuery,
        ExplorerError::MalformedResponse { payload } => ExplorerError::malformed(payload.clone()),
        ExplorerError::GenerationEmpty => ExplorerError::GenerationEmpty,
        ExplorerError::Api { status, message } => ExplorerError::Api {
            status: *status,
            message: message.clone(),
        },
        ExplorerError::Decode(message) => ExplorerError::Decode(message.clone()),
        ExplorerError::Task(message) => ExplorerError::Task(message.clone()),
        ExplorerError::Config { message } => ExplorerError::config(message.clone()),
        ExplorerError::Aggregate { query, source } => {
            ExplorerError::aggregate(query.clone(), copy_error(source))
        }
        ExplorerError::Network(e) => panic!("network errors cannot be replayed: {e}"),
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    async fn fetch_narrative(&self, _query: &str) -> Result<Narrative> {
        self.narrative_calls.fetch_add(1, Ordering::SeqCst);
        self.pause(self.narrative_delay).await;
        replay(&self.narrative)
    }

    async fn fetch_image(&self, _query: &str) -> Result<String> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.pause(self.image_delay).await;
        replay(&self.image)
    }
}
