//! Location Explorer - discover the world, one search at a time
//!
//! This library turns a place name into a generated description, a list of
//! facts and a photorealistic image by calling a generative content API,
//! and exposes the search session to a terminal or single-page UI.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod generation;
pub mod logging;
pub mod models;
pub mod render;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export core types for public API
pub use aggregator::generate_location_details;
pub use config::ExplorerConfig;
pub use controller::{SearchController, SearchState};
pub use error::{ErrorCode, ExplorerError};
pub use generation::{GeminiClient, GenerationClient};
pub use models::{LocationData, Narrative};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ExplorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
