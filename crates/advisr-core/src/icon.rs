//! Marker icon and list emoji selection.
//!
//! Both functions evaluate the same rule table in fixed precedence: the first
//! group whose category-name substring or type tag matches wins.

use serde::Serialize;

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    Lodging,
    Food,
    Education,
    Park,
    Shopping,
    Health,
    ExternalPlace,
    CurrentLocation,
    /// Renderer's built-in pin.
    Default,
}

impl MarkerIcon {
    /// Image URL for the icon, `None` for the renderer default pin.
    #[must_use]
    pub const fn url(self) -> Option<&'static str> {
        match self {
            MarkerIcon::Lodging => Some("http://maps.google.com/mapfiles/ms/icons/red-dot.png"),
            MarkerIcon::Food => Some("http://maps.google.com/mapfiles/ms/icons/orange-dot.png"),
            MarkerIcon::Education => {
                Some("http://maps.google.com/mapfiles/ms/icons/yellow-dot.png")
            }
            MarkerIcon::Park => Some("http://maps.google.com/mapfiles/ms/icons/green-dot.png"),
            MarkerIcon::Shopping => {
                Some("http://maps.google.com/mapfiles/ms/icons/purple-dot.png")
            }
            MarkerIcon::Health => Some("http://maps.google.com/mapfiles/ms/icons/hospitals.png"),
            MarkerIcon::ExternalPlace | MarkerIcon::CurrentLocation => {
                Some("http://maps.google.com/mapfiles/ms/icons/blue-dot.png")
            }
            MarkerIcon::Default => None,
        }
    }

    /// Rendered icon edge length in pixels.
    #[must_use]
    pub const fn size_px(self) -> u32 {
        match self {
            MarkerIcon::CurrentLocation => 40,
            _ => 32,
        }
    }
}

struct Rule {
    icon: MarkerIcon,
    emoji: &'static str,
    name_needles: &'static [&'static str],
    types: &'static [&'static str],
    /// Type tags that pick the marker icon but not the list emoji.
    icon_only_types: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        icon: MarkerIcon::Lodging,
        emoji: "🏨",
        name_needles: &["hotel", "resort"],
        types: &["lodging"],
        icon_only_types: &[],
    },
    Rule {
        icon: MarkerIcon::Food,
        emoji: "🍽",
        name_needles: &["restaurant", "food", "cafe"],
        types: &["restaurant", "cafe"],
        icon_only_types: &["food"],
    },
    Rule {
        icon: MarkerIcon::Education,
        emoji: "🎓",
        name_needles: &["school", "college", "university", "academy"],
        types: &["school", "university"],
        icon_only_types: &[],
    },
    Rule {
        icon: MarkerIcon::Park,
        emoji: "🌳",
        name_needles: &["park"],
        types: &["park"],
        icon_only_types: &[],
    },
    Rule {
        icon: MarkerIcon::Shopping,
        emoji: "🛍",
        name_needles: &["mall", "market", "shop"],
        types: &["shopping_mall", "store"],
        icon_only_types: &[],
    },
    Rule {
        icon: MarkerIcon::Health,
        emoji: "🏥",
        name_needles: &["hospital", "clinic"],
        types: &["hospital"],
        icon_only_types: &[],
    },
];

fn matching_rule(location: &Location, for_icon: bool) -> Option<&'static Rule> {
    let category = location
        .category_name
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    RULES.iter().find(|rule| {
        rule.name_needles.iter().any(|n| category.contains(n))
            || rule.types.iter().any(|t| location.has_type(t))
            || (for_icon && rule.icon_only_types.iter().any(|t| location.has_type(t)))
    })
}

/// Pick the marker icon for a location.
#[must_use]
pub fn select_icon(location: &Location) -> MarkerIcon {
    match matching_rule(location, true) {
        Some(rule) => rule.icon,
        None if location.is_google_place => MarkerIcon::ExternalPlace,
        None => MarkerIcon::Default,
    }
}

/// Small emoji shown next to a location in the list panel.
#[must_use]
pub fn category_emoji(location: &Location) -> &'static str {
    matching_rule(location, false).map_or("📍", |rule| rule.emoji)
}
