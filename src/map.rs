//! Map selection state machine
//!
//! Clicking a city marker narrows every chart to that city until the map
//! selection is cleared or another city is clicked. The map selection lives
//! beside the dropdown filters: resetting the dropdowns leaves it alone.

use serde::{Deserialize, Serialize};

use crate::selection::FilterSelection;

/// Whether a map click currently narrows the view
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapSelection {
    #[default]
    Unselected,
    Selected(String),
}

/// One point reported by the map renderer for a click
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickPoint {
    /// City label attached to the marker, if the click hit one
    pub label: Option<String>,
}

/// A click on the map, as reported by the renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapClick {
    pub points: Vec<ClickPoint>,
}

impl MapClick {
    /// A click that hit the marker labelled `city`
    #[must_use]
    pub fn on(city: impl Into<String>) -> Self {
        Self {
            points: vec![ClickPoint {
                label: Some(city.into()),
            }],
        }
    }

    /// A click that hit nothing
    #[must_use]
    pub const fn missed() -> Self {
        Self { points: Vec::new() }
    }

    /// The city this click resolves to: the first non-blank point label
    #[must_use]
    pub fn resolve(&self) -> Option<&str> {
        self.points
            .iter()
            .filter_map(|p| p.label.as_deref())
            .map(str::trim)
            .find(|label| !label.is_empty())
    }
}

/// Map inputs that fired within one update cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEvent {
    pub click: Option<MapClick>,
    pub clear: bool,
}

impl MapEvent {
    #[must_use]
    pub const fn click(click: MapClick) -> Self {
        Self {
            click: Some(click),
            clear: false,
        }
    }

    #[must_use]
    pub const fn clear() -> Self {
        Self {
            click: None,
            clear: true,
        }
    }
}

impl MapSelection {
    /// State after one update cycle
    ///
    /// Clear takes precedence over a click in the same cycle. A click that
    /// resolves to no city leaves the state unchanged.
    #[must_use]
    pub fn next(self, event: &MapEvent) -> Self {
        if event.clear {
            return Self::Unselected;
        }
        match event.click.as_ref().and_then(MapClick::resolve) {
            Some(city) => Self::Selected(city.to_string()),
            None => self,
        }
    }

    /// Apply one update cycle in place
    pub fn apply(&mut self, event: &MapEvent) {
        *self = std::mem::take(self).next(event);
    }

    /// The selected city, if any
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Selected(city) => Some(city),
        }
    }

    /// Copy this state into the map field of a selection
    pub fn constrain(&self, selection: &mut FilterSelection) {
        selection.map_city = self.city().map(str::to_string);
    }
}
