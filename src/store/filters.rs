//! Filter and sort state for the property list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Property, PropertyStatus};

/// Sort order requested from the search endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Newest first
    #[default]
    Recent,
    Oldest,
    PriceLow,
    PriceHigh,
}

/// Current filter selection. Every field defaults to "no constraint"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search_query: String,
    /// OR-combined; empty matches every status
    pub statuses: BTreeSet<PropertyStatus>,
    /// OR-combined; empty matches every type
    pub property_types: BTreeSet<String>,
    /// Inclusive
    pub min_price: Option<i64>,
    /// Inclusive
    pub max_price: Option<i64>,
    pub sort_by: SortBy,
}

impl FilterState {
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn toggle_status(&mut self, status: PropertyStatus) {
        if !self.statuses.remove(&status) {
            self.statuses.insert(status);
        }
    }

    pub fn toggle_property_type(&mut self, property_type: impl Into<String>) {
        let property_type = property_type.into();
        if !self.property_types.remove(&property_type) {
            self.property_types.insert(property_type);
        }
    }

    /// `None` leaves that side unbounded. `min > max` is accepted as given
    pub fn set_price_range(&mut self, min: Option<i64>, max: Option<i64>) {
        self.min_price = min;
        self.max_price = max;
    }

    /// Reset every constraint; the sort order is a preference and survives
    pub fn clear(&mut self) {
        *self = Self {
            sort_by: self.sort_by,
            ..Self::default()
        };
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search_query.trim().is_empty()
            && self.statuses.is_empty()
            && self.property_types.is_empty()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Evaluate the filter locally against one record
    pub fn matches(&self, property: &Property) -> bool {
        let query = self.search_query.trim().to_lowercase();
        if !query.is_empty() {
            let hit = property.owner.name.to_lowercase().contains(&query)
                || property.location.address.to_lowercase().contains(&query)
                || property.property_type.to_lowercase().contains(&query);
            if !hit {
                return false;
            }
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&property.status) {
            return false;
        }
        if !self.property_types.is_empty() && !self.property_types.contains(&property.property_type) {
            return false;
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }

        true
    }

    /// Filter and sort a complete list client-side, as done for legacy responses
    pub fn apply(&self, properties: &[Property]) -> Vec<Property> {
        let mut result: Vec<Property> = properties
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        match self.sort_by {
            SortBy::Recent => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Oldest => result.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortBy::PriceLow => result.sort_by_key(|p| p.price),
            SortBy::PriceHigh => result.sort_by(|a, b| b.price.cmp(&a.price)),
        }

        result
    }
}
