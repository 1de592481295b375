//! Data models for the Location Explorer
//!
//! This module contains the domain models organized by concern:
//! - Location: the search result record and the narrative half of it
//! - Image: image generation parameters and data URI helpers

pub mod image;
pub mod location;

// Re-export all public types for convenient access
pub use image::{AspectRatio, ImageFormat, ImageOptions, data_uri, decode_data_uri, split_data_uri};
pub use location::{LocationData, Narrative};
