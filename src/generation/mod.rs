//! Remote generation client
//!
//! The two generation operations a search needs, behind one trait so the
//! aggregator and controller can run against any backend.

use async_trait::async_trait;

use crate::Result;
use crate::models::Narrative;

pub mod gemini;

pub use gemini::GeminiClient;

/// Backend able to produce both halves of a location search.
///
/// Implementations do not retry; every failure is returned as-is.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate the description and facts for `query`
    async fn fetch_narrative(&self, query: &str) -> Result<Narrative>;

    /// Generate one image of `query`, returned as a `data:` URI
    async fn fetch_image(&self, query: &str) -> Result<String>;
}

/// Prompt for the narrative call
#[must_use]
pub fn narrative_prompt(query: &str) -> String {
    format!(
        "You are a world-class tour guide. For the location \"{query}\", provide a captivating, one-paragraph description and a list of 3-5 interesting facts or must-see spots."
    )
}

/// Prompt for the image call
#[must_use]
pub fn image_prompt(query: &str) -> String {
    format!(
        "A stunning, high-quality, photorealistic image of {query}. Cinematic lighting, vibrant colors, wide-angle shot."
    )
}
