//! Terminal rendering of the search session

use std::fmt::{self, Display};

use crate::controller::SearchState;
use crate::models::{LocationData, image::split_data_uri};

pub const WELCOME_TITLE: &str = "Welcome to the Explorer";
pub const WELCOME_HINT: &str = "Enter a landmark, city, or natural wonder to begin your journey. Try \"Eiffel Tower\" or \"Grand Canyon\".";

/// Description and facts panel
pub struct LocationInfo<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub facts: &'a [String],
}

impl Display for LocationInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📍 {}", self.name)?;
        writeln!(f)?;
        writeln!(f, "{}", self.description)?;
        if !self.facts.is_empty() {
            writeln!(f)?;
            writeln!(f, "Interesting Facts")?;
            for fact in self.facts {
                writeln!(f, "   • {fact}")?;
            }
        }
        Ok(())
    }
}

/// Image panel; the payload itself is summarized, not printed
pub struct ImagePanel<'a> {
    pub location_name: &'a str,
    pub image_url: &'a str,
}

impl Display for ImagePanel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match split_data_uri(self.image_url) {
            Some((mime, payload)) => writeln!(
                f,
                "🖼️ Generated image of {} ({}, {} base64 chars)",
                self.location_name,
                mime,
                payload.len()
            ),
            None => writeln!(f, "🖼️ Generated image of {}", self.location_name),
        }
    }
}

/// Render both result panels for `name`
pub fn render_location(name: &str, data: &LocationData) -> String {
    let info = LocationInfo {
        name,
        description: &data.description,
        facts: &data.facts,
    };
    let image = ImagePanel {
        location_name: name,
        image_url: &data.image_url,
    };
    format!("{info}\n{image}")
}

impl Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchState::Idle => {
                writeln!(f, "🗺️ {WELCOME_TITLE}")?;
                writeln!(f, "   {WELCOME_HINT}")
            }
            SearchState::Loading { query } => writeln!(f, "⏳ Exploring {query}..."),
            SearchState::Error { message } => writeln!(f, "❌ {message}"),
            SearchState::Success { query, data, .. } => {
                write!(f, "{}", render_location(query, data))
            }
        }
    }
}
