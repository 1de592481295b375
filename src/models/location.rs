//! Location result model produced by a successful search

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

/// Fact counts the narrative prompt asks for
pub const EXPECTED_FACT_RANGE: std::ops::RangeInclusive<usize> = 3..=5;

/// Description and facts returned by the narrative call
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Narrative {
    /// One captivating paragraph about the place
    pub description: String,
    /// Interesting facts or must-see spots
    pub facts: Vec<String>,
}

impl Narrative {
    /// Parse and validate a narrative payload.
    ///
    /// The payload is kept in the error on failure so it can be logged.
    pub fn parse(payload: &str) -> Result<Self, ExplorerError> {
        let narrative: Narrative = serde_json::from_str(payload.trim())
            .map_err(|_| ExplorerError::malformed(payload))?;

        if narrative.description.trim().is_empty()
            || narrative.facts.iter().any(|fact| fact.trim().is_empty())
        {
            return Err(ExplorerError::malformed(payload));
        }

        Ok(narrative)
    }

    #[must_use]
    pub fn has_expected_fact_count(&self) -> bool {
        EXPECTED_FACT_RANGE.contains(&self.facts.len())
    }
}

/// Everything shown for one searched location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    /// Single paragraph of text
    pub description: String,
    /// Ordered short facts
    pub facts: Vec<String>,
    /// Inline `data:` URI of the generated image
    pub image_url: String,
}

impl LocationData {
    /// Merge the two halves of a search. Only called once both succeeded.
    #[must_use]
    pub fn new(narrative: Narrative, image_url: String) -> Self {
        Self {
            description: narrative.description,
            facts: narrative.facts,
            image_url,
        }
    }
}
