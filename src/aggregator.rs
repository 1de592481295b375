//! Fan-out of one search into the narrative and image calls

use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinHandle};
use tracing::{Instrument, debug, error, info, instrument};

use crate::generation::GenerationClient;
use crate::models::{LocationData, Narrative};
use crate::{ExplorerError, Result};

/// Produce the full [`LocationData`] for `query`.
///
/// Both generation calls run as separate tasks. The first failure ends the
/// search at once and is wrapped into [`ExplorerError::Aggregate`] naming the
/// query. The other task is detached, not cancelled, and its result is
/// ignored. A half result is never returned.
#[instrument(skip(client))]
pub async fn generate_location_details(
    client: Arc<dyn GenerationClient>,
    query: &str,
) -> Result<LocationData> {
    let start = Instant::now();

    let narrative = tokio::spawn({
        let client = Arc::clone(&client);
        let query = query.to_string();
        async move { client.fetch_narrative(&query).await }.in_current_span()
    });
    let image = tokio::spawn({
        let query = query.to_string();
        async move { client.fetch_image(&query).await }.in_current_span()
    });

    match first_failure(narrative, image).await {
        Ok((narrative, image_url)) => {
            info!(
                "Generated details for \"{}\" in {:.3}s",
                query,
                start.elapsed().as_secs_f64()
            );
            Ok(LocationData::new(narrative, image_url))
        }
        Err(cause) => {
            error!(code = cause.code().as_str(), "Error generating location details: {}", cause);
            Err(ExplorerError::aggregate(query, cause))
        }
    }
}

/// Wait for both tasks, returning as soon as either of them fails.
///
/// Dropping a [`JoinHandle`] detaches its task, so the unfinished call keeps
/// running in the background.
async fn first_failure(
    mut narrative: JoinHandle<Result<Narrative>>,
    mut image: JoinHandle<Result<String>>,
) -> Result<(Narrative, String)> {
    tokio::select! {
        joined = &mut narrative => {
            let narrative = settled(joined)?;
            debug!("Narrative ready, waiting for the image");
            Ok((narrative, settled((&mut image).await)?))
        }
        joined = &mut image => {
            let image_url = settled(joined)?;
            debug!("Image ready, waiting for the narrative");
            Ok((settled((&mut narrative).await)?, image_url))
        }
    }
}

fn settled<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(ExplorerError::Task(e.to_string())),
    }
}
