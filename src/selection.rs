//! Filter selection model
//!
//! A [`FilterSelection`] holds the current value set of every dropdown
//! dimension plus the single map-selected city. Empty sets mean "no
//! constraint". Sets are ordered, so two selections holding the same values
//! compare equal and canonicalize identically regardless of input order.
//!
//! UI input is loosely typed (a dropdown can send nothing, one string or a
//! list); [`SelectionInput`] normalizes it at the boundary so nothing past
//! this module sees blank or duplicate values.

use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::filter::Column;

/// A dropdown filter dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    Country,
    City,
    Hospital,
    Diagnosis,
    Outcome,
    Year,
}

impl Dimension {
    /// Every dimension in canonical order
    pub const ALL: [Self; 6] = [
        Self::Country,
        Self::City,
        Self::Hospital,
        Self::Diagnosis,
        Self::Outcome,
        Self::Year,
    ];

    /// Record column this dimension constrains
    #[must_use]
    pub const fn column(self) -> Column {
        match self {
            Self::Country => Column::Country,
            Self::City => Column::City,
            Self::Hospital => Column::Hospital,
            Self::Diagnosis => Column::Diagnosis,
            Self::Outcome => Column::Outcome,
            Self::Year => Column::Year,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Country => "country",
            Self::City => "city",
            Self::Hospital => "hospital",
            Self::Diagnosis => "diagnosis",
            Self::Outcome => "outcome",
            Self::Year => "year",
        };
        f.write_str(name)
    }
}

/// The user's current filter choices
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    pub country: BTreeSet<String>,
    pub city: BTreeSet<String>,
    pub hospital: BTreeSet<String>,
    pub diagnosis: BTreeSet<String>,
    pub outcome: BTreeSet<String>,
    pub year: BTreeSet<String>,
    /// Set only through map interaction; independent of `city`
    pub map_city: Option<String>,
}

impl FilterSelection {
    /// A selection with no constraints
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the values of one dimension, builder style
    #[must_use]
    pub fn with<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set(dimension, values);
        self
    }

    /// Set the map-selected city, builder style
    #[must_use]
    pub fn with_map_city(mut self, city: Option<impl Into<String>>) -> Self {
        self.map_city = city.map(Into::into);
        self
    }

    /// Replace the values of one dimension; blank values are dropped
    pub fn set<I, S>(&mut self, dimension: Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        *self.values_mut(dimension) = normalize(values);
    }

    /// Values selected for a dimension
    #[must_use]
    pub const fn values(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Country => &self.country,
            Dimension::City => &self.city,
            Dimension::Hospital => &self.hospital,
            Dimension::Diagnosis => &self.diagnosis,
            Dimension::Outcome => &self.outcome,
            Dimension::Year => &self.year,
        }
    }

    fn values_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Country => &mut self.country,
            Dimension::City => &mut self.city,
            Dimension::Hospital => &mut self.hospital,
            Dimension::Diagnosis => &mut self.diagnosis,
            Dimension::Outcome => &mut self.outcome,
            Dimension::Year => &mut self.year,
        }
    }

    /// Dimensions carrying at least one value, in canonical order
    pub fn active_dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        Dimension::ALL
            .into_iter()
            .filter(|d| !self.values(*d).is_empty())
    }

    /// True when any dropdown dimension is constrained
    #[must_use]
    pub fn has_dropdown_filters(&self) -> bool {
        self.active_dimensions().next().is_some()
    }

    /// True when nothing at all constrains the result
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        !self.has_dropdown_filters() && self.map_city.is_none()
    }

    /// Whether charts should facet by hospital
    #[must_use]
    pub fn facet_by_hospital(&self) -> bool {
        !self.hospital.is_empty()
    }

    /// Clear every dropdown dimension; the map selection is kept
    pub fn reset_dropdowns(&mut self) {
        for dimension in Dimension::ALL {
            self.values_mut(dimension).clear();
        }
    }

    /// Chart title suffix describing the active dropdown filters
    ///
    /// Empty when no dropdown filter is active.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.country.is_empty() {
            parts.push(format!("country: {}", self.country.iter().join(", ")));
        }
        if !self.city.is_empty() {
            parts.push(format!("city: {}", self.city.iter().join(", ")));
        }
        if !self.hospital.is_empty() {
            parts.push(format!("at {}", self.hospital.iter().join(", ")));
        }
        if !self.outcome.is_empty() {
            parts.push(format!("with outcome(s): {}", self.outcome.iter().join(", ")));
        }
        if !self.diagnosis.is_empty() {
            parts.push(format!("diagnosed as: {}", self.diagnosis.iter().join(", ")));
        }
        if !self.year.is_empty() {
            parts.push(format!("in {}", self.year.iter().join(", ")));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(" - {}", parts.join(", "))
        }
    }
}

fn normalize<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// A raw dropdown value as sent by a UI: absent, a single value or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UiValue {
    One(String),
    Many(Vec<String>),
}

impl UiValue {
    fn into_values(self) -> Vec<String> {
        match self {
            Self::One(v) => vec![v],
            Self::Many(vs) => vs,
        }
    }
}

/// Loosely typed dropdown state as received from the UI layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionInput {
    pub country: Option<UiValue>,
    pub city: Option<UiValue>,
    pub hospital: Option<UiValue>,
    pub diagnosis: Option<UiValue>,
    pub outcome: Option<UiValue>,
    pub year: Option<UiValue>,
}

impl SelectionInput {
    /// Normalize into a selection without a map constraint
    #[must_use]
    pub fn into_selection(self) -> FilterSelection {
        let mut selection = FilterSelection::new();
        for (dimension, value) in [
            (Dimension::Country, self.country),
            (Dimension::City, self.city),
            (Dimension::Hospital, self.hospital),
            (Dimension::Diagnosis, self.diagnosis),
            (Dimension::Outcome, self.outcome),
            (Dimension::Year, self.year),
        ] {
            if let Some(value) = value {
                selection.set(dimension, value.into_values());
            }
        }
        selection
    }
}
