use serde::Serialize;

use crate::models::{Property, PropertyStatus};

/// Number of listings shown in the most-viewed ranking
pub const TOP_VIEWED: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub available: usize,
    pub booked: usize,
    pub unavailable: usize,
}

/// Portfolio figures shown on the analytics page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_properties: usize,
    pub by_status: StatusBreakdown,
    pub total_price: i64,
    /// Zero for an empty portfolio
    pub average_price: f64,
    pub most_viewed: Vec<Property>,
}

impl PortfolioSummary {
    pub fn from_properties(properties: &[Property]) -> Self {
        let mut by_status = StatusBreakdown::default();
        for property in properties {
            match property.status {
                PropertyStatus::Available => by_status.available += 1,
                PropertyStatus::Booked => by_status.booked += 1,
                PropertyStatus::Unavailable => by_status.unavailable += 1,
            }
        }

        let total_price: i64 = properties.iter().map(|p| p.price).sum();
        let average_price = if properties.is_empty() {
            0.0
        } else {
            total_price as f64 / properties.len() as f64
        };

        let mut most_viewed = properties.to_vec();
        most_viewed.sort_by(|a, b| b.meta.views.cmp(&a.meta.views));
        most_viewed.truncate(TOP_VIEWED);

        Self {
            total_properties: properties.len(),
            by_status,
            total_price,
            average_price,
            most_viewed,
        }
    }
}
